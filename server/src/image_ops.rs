use crate::errors::AvatarError;
use identity::{ImageFormat, Photo};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

fn decode_err(e: impl std::fmt::Display) -> AvatarError {
    AvatarError::ImageDecode(e.to_string())
}

fn encode_err(e: impl std::fmt::Display) -> AvatarError {
    AvatarError::ImageEncode(e.to_string())
}

/// Confirm a remote payload really is an image and report its format.
/// Anything that does not fully decode is rejected.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageFormat> {
    let format = match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => ImageFormat::Jpg,
        image::ImageFormat::Png => ImageFormat::Png,
        image::ImageFormat::Gif => ImageFormat::Gif,
        image::ImageFormat::WebP => ImageFormat::Webp,
        _ => return None,
    };
    image::load_from_memory(bytes).ok()?;
    Some(format)
}

/// Transcode a stored photo to the requested square size.
///
/// Still images smaller than the target in either dimension are upscaled
/// with an exact resize; everything else goes through an aspect-preserving
/// thumbnail fit. The asymmetry is intentional: the thumbnail path guards
/// non-square stored photos against distortion on the way down.
pub fn transcode_photo(
    photo: &Photo,
    size: u32,
    jpeg_quality: u8,
) -> Result<(Vec<u8>, &'static str), AvatarError> {
    if photo.format == ImageFormat::Gif && is_animated_gif(&photo.data) {
        let bytes = resize_animated_gif(&photo.data, size)?;
        return Ok((bytes, ImageFormat::Gif.content_type()));
    }

    let decoded = image::load_from_memory(&photo.data).map_err(decode_err)?;
    let resized = if decoded.width() < size || decoded.height() < size {
        decoded.resize_exact(size, size, FilterType::Lanczos3)
    } else {
        decoded.resize(size, size, FilterType::Lanczos3)
    };

    let bytes = encode(&resized, photo.format, jpeg_quality)?;
    Ok((bytes, photo.format.content_type()))
}

/// Downscale-only fit used by the external-handle proxy. Images at or
/// below the requested size pass through at their original resolution,
/// re-encoded in their source format.
pub fn downscale_to_fit(
    data: &[u8],
    size: u32,
    jpeg_quality: u8,
) -> Result<(Vec<u8>, &'static str), AvatarError> {
    let format = sniff_image(data).ok_or_else(|| decode_err("unrecognized image payload"))?;
    let decoded = image::load_from_memory(data).map_err(decode_err)?;

    let resized = if decoded.width().max(decoded.height()) > size {
        decoded.resize(size, size, FilterType::Lanczos3)
    } else {
        decoded
    };

    let bytes = encode(&resized, format, jpeg_quality)?;
    Ok((bytes, format.content_type()))
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, AvatarError> {
    let mut cursor = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpg => {
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut cursor, jpeg_quality)
                .encode_image(&rgb)
                .map_err(encode_err)?;
        }
        ImageFormat::Png => image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(encode_err)?,
        ImageFormat::Gif => image
            .write_to(&mut cursor, image::ImageFormat::Gif)
            .map_err(encode_err)?,
        ImageFormat::Webp => image
            .write_to(&mut cursor, image::ImageFormat::WebP)
            .map_err(encode_err)?,
    }
    Ok(cursor.into_inner())
}

pub fn is_animated_gif(data: &[u8]) -> bool {
    frame_count(data).map(|count| count > 1).unwrap_or(false)
}

fn frame_count(data: &[u8]) -> Result<usize, AvatarError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(Cursor::new(data)).map_err(decode_err)?;

    let mut count = 0;
    while decoder.read_next_frame().map_err(decode_err)?.is_some() {
        count += 1;
    }
    Ok(count)
}

/// Resize an animated GIF by scaling every frame independently. Frame
/// geometry, timing and disposal survive the resize, so partial-frame
/// animations keep working at the new size.
pub fn resize_animated_gif(data: &[u8], size: u32) -> Result<Vec<u8>, AvatarError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(Cursor::new(data)).map_err(decode_err)?;

    let scale_x = size as f32 / decoder.width().max(1) as f32;
    let scale_y = size as f32 / decoder.height().max(1) as f32;

    let mut out = Vec::new();
    {
        let mut encoder =
            gif::Encoder::new(&mut out, size as u16, size as u16, &[]).map_err(encode_err)?;
        encoder.set_repeat(gif::Repeat::Infinite).map_err(encode_err)?;

        while let Some(frame) = decoder.read_next_frame().map_err(decode_err)? {
            let width = frame.width as u32;
            let height = frame.height as u32;
            let buffer = image::RgbaImage::from_raw(width, height, frame.buffer.to_vec())
                .ok_or_else(|| decode_err("gif frame buffer size mismatch"))?;

            let new_width = ((width as f32 * scale_x).round() as u32).clamp(1, size);
            let new_height = ((height as f32 * scale_y).round() as u32).clamp(1, size);
            let mut resized =
                image::imageops::resize(&buffer, new_width, new_height, FilterType::Lanczos3)
                    .into_raw();

            let mut new_frame =
                gif::Frame::from_rgba_speed(new_width as u16, new_height as u16, &mut resized, 10);
            new_frame.left = (frame.left as f32 * scale_x) as u16;
            new_frame.top = (frame.top as f32 * scale_y) as u16;
            new_frame.delay = frame.delay;
            new_frame.dispose = frame.dispose;
            encoder.write_frame(&new_frame).map_err(encode_err)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_photo(width: u32, height: u32) -> Photo {
        let mut image = RgbaImage::new(width, height);
        for pixel in image.pixels_mut() {
            *pixel = image::Rgba([10, 120, 200, 255]);
        }
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        Photo {
            id: 0,
            data: cursor.into_inner(),
            format: ImageFormat::Png,
            access_count: 0,
        }
    }

    fn animated_gif(frames: usize, width: u16, height: u16) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
            for i in 0..frames {
                let mut pixels = vec![(i * 40) as u8; width as usize * height as usize * 4];
                let mut frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, 10);
                frame.delay = 10 * (i as u16 + 1);
                frame.dispose = gif::DisposalMethod::Background;
                encoder.write_frame(&frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_smaller_photo_is_upscaled_exactly() {
        let photo = png_photo(10, 20);
        let (bytes, content_type) = transcode_photo(&photo, 80, 85).unwrap();
        assert_eq!(content_type, "image/png");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 80));
    }

    #[test]
    fn test_larger_photo_downscales_preserving_aspect() {
        let photo = png_photo(200, 100);
        let (bytes, _) = transcode_photo(&photo, 80, 85).unwrap();

        // Thumbnail fit, not a stretch to the full square
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 40));
    }

    #[test]
    fn test_jpg_content_type_is_jpeg() {
        let mut photo = png_photo(100, 100);
        // re-encode the same pixels as JPEG
        let decoded = image::load_from_memory(&photo.data).unwrap();
        photo.data = encode(&decoded, ImageFormat::Jpg, 85).unwrap();
        photo.format = ImageFormat::Jpg;

        let (bytes, content_type) = transcode_photo(&photo, 80, 85).unwrap();
        assert_eq!(content_type, "image/jpeg");
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_animated_gif_detection() {
        assert!(is_animated_gif(&animated_gif(3, 16, 16)));
        assert!(!is_animated_gif(&animated_gif(1, 16, 16)));
        assert!(!is_animated_gif(b"not a gif"));
    }

    #[test]
    fn test_animated_gif_resize_preserves_frames_and_timing() {
        let data = animated_gif(3, 40, 40);
        let resized = resize_animated_gif(&data, 20).unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(Cursor::new(&resized[..])).unwrap();
        assert_eq!(decoder.width(), 20);
        assert_eq!(decoder.height(), 20);

        let mut delays = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            delays.push(frame.delay);
            assert_eq!(frame.dispose, gif::DisposalMethod::Background);
            assert!(frame.width <= 20 && frame.height <= 20);
        }
        assert_eq!(delays, vec![10, 20, 30]);
    }

    #[test]
    fn test_animated_photo_stays_gif() {
        let photo = Photo {
            id: 0,
            data: animated_gif(2, 32, 32),
            format: ImageFormat::Gif,
            access_count: 0,
        };
        let (bytes, content_type) = transcode_photo(&photo, 16, 85).unwrap();
        assert_eq!(content_type, "image/gif");
        assert!(is_animated_gif(&bytes));
    }

    #[test]
    fn test_downscale_to_fit_never_upscales() {
        let photo = png_photo(40, 40);
        let (bytes, _) = downscale_to_fit(&photo.data, 80, 85).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 40));

        let photo = png_photo(120, 60);
        let (bytes, _) = downscale_to_fit(&photo.data, 60, 85).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (60, 30));
    }

    #[test]
    fn test_sniff_rejects_garbage() {
        assert_eq!(sniff_image(b"garbage"), None);
        assert!(sniff_image(&png_photo(4, 4).data).is_some());
    }
}

use crate::{identicon, monster, mystery_man, pagan, retro, robot};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbaImage};
use indexmap::IndexMap;

/// A procedural avatar backend.
///
/// Implementations must be deterministic: the same fingerprint and size
/// always produce the same pixels, otherwise response caching and the
/// exact-byte test properties fall apart.
pub trait Generator: Send + Sync {
    fn generate(&self, fingerprint: &str, size: u32) -> RgbaImage;
}

/// Keyed registry over the avatar backends. The pipeline dispatches on the
/// `default` keyword through this map; new backends are added by
/// registering, never by branching in the request path.
pub struct GeneratorRegistry {
    backends: IndexMap<&'static str, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = GeneratorRegistry {
            backends: IndexMap::new(),
        };
        registry.register("retro", Box::new(retro::Retro));
        registry.register("identicon", Box::new(identicon::Identicon));
        registry.register("pagan", Box::new(pagan::Pagan));
        registry.register("monsterid", Box::new(monster::MonsterId));
        registry.register("robohash", Box::new(robot::Robohash));
        registry.register("mmng", Box::new(mystery_man::MysteryMan::default()));
        registry
    }

    pub fn register(&mut self, key: &'static str, backend: Box<dyn Generator>) {
        self.backends.insert(key, backend);
    }

    pub fn get(&self, key: &str) -> Option<&dyn Generator> {
        self.backends.get(key).map(|backend| backend.as_ref())
    }

    /// Backend keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.backends.keys().copied()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        GeneratorRegistry::with_builtins()
    }
}

/// PNG-encode a generated image. Writing into a Vec cannot fail, but the
/// encoder API is fallible, so the error is propagated rather than hidden.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

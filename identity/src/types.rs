use serde::Serialize;

pub type IdentityId = u64;
pub type PhotoId = u64;

/// Stored photo formats. The short code "jpg" is what the upload side
/// records; it normalizes to the "jpeg" MIME subtype when served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn short_code(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

/// The digest columns of a confirmed identity.
///
/// Email identities carry both hash algorithms over the same address.
/// OpenID identities carry the SHA-256 of the canonical URL variant plus
/// the three alternates (scheme x trailing-slash), because users may have
/// registered any of the four forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityDigests {
    Email { md5: String, sha256: String },
    OpenId { sha256: String, alternates: [String; 3] },
}

#[derive(Clone, Debug)]
pub struct Identity {
    pub id: IdentityId,
    pub digests: IdentityDigests,
    /// Invariant: at most one of `photo` and `federated_handle` is set.
    pub photo: Option<PhotoId>,
    pub federated_handle: Option<String>,
    pub access_count: u64,
}

#[derive(Clone, Debug)]
pub struct Photo {
    pub id: PhotoId,
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub access_count: u64,
}

/// Snapshot served by the stats endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsCounts {
    pub users: u64,
    pub mails: u64,
    pub openids: u64,
    pub unconfirmed_mails: u64,
    pub unconfirmed_openids: u64,
    pub avatars: u64,
}

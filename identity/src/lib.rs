pub mod fingerprint;
pub mod openid;
pub mod store;
pub mod types;

pub use fingerprint::{Fingerprint, md5_hex, sha256_hex};
pub use openid::openid_variations;
pub use store::{IdentityStore, MemoryStore, StoreError, resolve};
pub use types::{Identity, IdentityDigests, IdentityId, ImageFormat, Photo, PhotoId, StatsCounts};

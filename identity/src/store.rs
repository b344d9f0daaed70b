use crate::fingerprint::{Fingerprint, md5_hex, sha256_hex};
use crate::openid::openid_variations;
use crate::types::{
    Identity, IdentityDigests, IdentityId, ImageFormat, Photo, PhotoId, StatsCounts,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}

/// Query contract against the confirmed-identity tables.
///
/// The persistence side lives elsewhere; this core only needs the digest
/// lookups, photo reads, counter bumps, and the stats snapshot.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn email_by_md5(&self, digest: &str) -> Result<Option<Identity>, StoreError>;
    async fn email_by_sha256(&self, digest: &str) -> Result<Option<Identity>, StoreError>;
    /// Matches the primary digest or any of the three alternates.
    async fn openid_by_digest(&self, digest: &str) -> Result<Option<Identity>, StoreError>;

    async fn photo(&self, id: PhotoId) -> Result<Option<Photo>, StoreError>;

    /// Bump the access counters of a served identity and its photo.
    async fn record_access(
        &self,
        identity: IdentityId,
        photo: PhotoId,
    ) -> Result<(), StoreError>;

    async fn counts(&self) -> Result<StatsCounts, StoreError>;
}

/// Resolve a fingerprint via the ordered lookup strategies: email primary
/// MD5, email primary SHA-256, then OpenID primary-or-alternate. The first
/// hit wins.
pub async fn resolve(
    store: &dyn IdentityStore,
    fingerprint: &Fingerprint,
) -> Result<Option<Identity>, StoreError> {
    let digest = fingerprint.as_str();

    if let Some(identity) = store.email_by_md5(digest).await? {
        return Ok(Some(identity));
    }
    if let Some(identity) = store.email_by_sha256(digest).await? {
        return Ok(Some(identity));
    }
    store.openid_by_digest(digest).await
}

#[derive(Default)]
struct MemoryStoreInner {
    identities: Vec<Identity>,
    photos: HashMap<PhotoId, Photo>,
    next_photo_id: PhotoId,
    users: u64,
    unconfirmed_mails: u64,
    unconfirmed_openids: u64,
}

/// In-process reference store. Digest computation mirrors what the account
/// side does at confirmation time, so lookups against it behave exactly
/// like lookups against the production tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn add_user(&self) {
        self.inner.write().users += 1;
    }

    pub fn add_unconfirmed_email(&self) {
        self.inner.write().unconfirmed_mails += 1;
    }

    pub fn add_unconfirmed_openid(&self) {
        self.inner.write().unconfirmed_openids += 1;
    }

    pub fn add_photo(&self, data: Vec<u8>, format: ImageFormat) -> PhotoId {
        let mut inner = self.inner.write();
        let id = inner.next_photo_id;
        inner.next_photo_id += 1;
        inner.photos.insert(
            id,
            Photo {
                id,
                data,
                format,
                access_count: 0,
            },
        );
        id
    }

    /// Confirm an email address: both digests are computed over the
    /// trimmed, lowercased form.
    pub fn add_email(&self, address: &str) -> IdentityId {
        let canonical = address.trim().to_ascii_lowercase();
        let digests = IdentityDigests::Email {
            md5: md5_hex(&canonical),
            sha256: sha256_hex(&canonical),
        };
        self.push_identity(digests)
    }

    /// Confirm an OpenID: scheme and host are lowercased by URL parsing,
    /// then all four variant digests are recorded.
    pub fn add_openid(&self, openid: &str) -> IdentityId {
        let canonical = Url::parse(openid)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| openid.to_string());
        let variations = openid_variations(&canonical);
        let digests = IdentityDigests::OpenId {
            sha256: sha256_hex(&variations[0]),
            alternates: [
                sha256_hex(&variations[1]),
                sha256_hex(&variations[2]),
                sha256_hex(&variations[3]),
            ],
        };
        self.push_identity(digests)
    }

    fn push_identity(&self, digests: IdentityDigests) -> IdentityId {
        let mut inner = self.inner.write();
        let id = inner.identities.len() as IdentityId;
        inner.identities.push(Identity {
            id,
            digests,
            photo: None,
            federated_handle: None,
            access_count: 0,
        });
        id
    }

    /// Assigning a photo clears any federated handle; the two are mutually
    /// exclusive.
    pub fn set_photo(&self, id: IdentityId, photo: PhotoId) {
        let mut inner = self.inner.write();
        if let Some(identity) = inner.identities.get_mut(id as usize) {
            identity.photo = Some(photo);
            identity.federated_handle = None;
        }
    }

    /// Assigning a federated handle clears any photo.
    pub fn set_federated_handle(&self, id: IdentityId, handle: &str) {
        let mut inner = self.inner.write();
        if let Some(identity) = inner.identities.get_mut(id as usize) {
            identity.federated_handle = Some(handle.to_string());
            identity.photo = None;
        }
    }

    pub fn identity(&self, id: IdentityId) -> Option<Identity> {
        self.inner.read().identities.get(id as usize).cloned()
    }

    fn find<F>(&self, predicate: F) -> Option<Identity>
    where
        F: Fn(&Identity) -> bool,
    {
        self.inner
            .read()
            .identities
            .iter()
            .find(|identity| predicate(identity))
            .cloned()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn email_by_md5(&self, digest: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.find(|identity| {
            matches!(&identity.digests, IdentityDigests::Email { md5, .. } if md5.as_str() == digest)
        }))
    }

    async fn email_by_sha256(&self, digest: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.find(|identity| {
            matches!(&identity.digests, IdentityDigests::Email { sha256, .. } if sha256.as_str() == digest)
        }))
    }

    async fn openid_by_digest(&self, digest: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.find(|identity| match &identity.digests {
            IdentityDigests::OpenId { sha256, alternates } => {
                sha256.as_str() == digest || alternates.iter().any(|alt| alt.as_str() == digest)
            }
            IdentityDigests::Email { .. } => false,
        }))
    }

    async fn photo(&self, id: PhotoId) -> Result<Option<Photo>, StoreError> {
        Ok(self.inner.read().photos.get(&id).cloned())
    }

    async fn record_access(
        &self,
        identity: IdentityId,
        photo: PhotoId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if let Some(record) = inner.identities.get_mut(identity as usize) {
            record.access_count += 1;
        }
        if let Some(record) = inner.photos.get_mut(&photo) {
            record.access_count += 1;
        }
        Ok(())
    }

    async fn counts(&self) -> Result<StatsCounts, StoreError> {
        let inner = self.inner.read();
        let mails = inner
            .identities
            .iter()
            .filter(|i| matches!(i.digests, IdentityDigests::Email { .. }))
            .count() as u64;
        let openids = inner.identities.len() as u64 - mails;

        Ok(StatsCounts {
            users: inner.users,
            mails,
            openids,
            unconfirmed_mails: inner.unconfirmed_mails,
            unconfirmed_openids: inner.unconfirmed_openids,
            avatars: inner.photos.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_email_lookup_both_digests() {
        let store = MemoryStore::new();
        store.add_email("Somebody@Example.ORG");

        let md5 = md5_hex("somebody@example.org");
        let sha256 = sha256_hex("somebody@example.org");

        let by_md5 = resolve(&store, &Fingerprint::parse(&md5).unwrap())
            .await
            .unwrap();
        assert!(by_md5.is_some());

        let by_sha256 = resolve(&store, &Fingerprint::parse(&sha256).unwrap())
            .await
            .unwrap();
        assert!(by_sha256.is_some());
        assert_eq!(by_md5.unwrap().id, by_sha256.unwrap().id);
    }

    #[tokio::test]
    async fn test_openid_lookup_any_variant() {
        let store = MemoryStore::new();
        let id = store.add_openid("https://User.URL");

        for variant in openid_variations("http://user.url/") {
            let digest = sha256_hex(&variant);
            let found = resolve(&store, &Fingerprint::parse(&digest).unwrap())
                .await
                .unwrap()
                .expect("variant digest should match");
            assert_eq!(found.id, id);
        }
    }

    #[tokio::test]
    async fn test_unknown_digest_misses() {
        let store = MemoryStore::new();
        store.add_email("somebody@example.org");

        let unknown = Fingerprint::parse(&"0".repeat(64)).unwrap();
        assert!(resolve(&store, &unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_access_increments_both() {
        let store = MemoryStore::new();
        let identity = store.add_email("somebody@example.org");
        let photo = store.add_photo(vec![1, 2, 3], ImageFormat::Png);
        store.set_photo(identity, photo);

        store.record_access(identity, photo).await.unwrap();

        assert_eq!(store.identity(identity).unwrap().access_count, 1);
        assert_eq!(store.photo(photo).await.unwrap().unwrap().access_count, 1);
    }

    #[tokio::test]
    async fn test_photo_and_handle_are_exclusive() {
        let store = MemoryStore::new();
        let identity = store.add_email("somebody@example.org");
        let photo = store.add_photo(vec![1], ImageFormat::Png);

        store.set_photo(identity, photo);
        store.set_federated_handle(identity, "somebody.example.org");
        let record = store.identity(identity).unwrap();
        assert!(record.photo.is_none());
        assert_eq!(
            record.federated_handle.as_deref(),
            Some("somebody.example.org")
        );

        store.set_photo(identity, photo);
        let record = store.identity(identity).unwrap();
        assert_eq!(record.photo, Some(photo));
        assert!(record.federated_handle.is_none());
    }

    #[tokio::test]
    async fn test_counts() {
        let store = MemoryStore::new();
        store.add_user();
        store.add_email("somebody@example.org");
        store.add_openid("http://user.url/");
        store.add_unconfirmed_email();
        store.add_photo(vec![1], ImageFormat::Png);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.mails, 1);
        assert_eq!(counts.openids, 1);
        assert_eq!(counts.unconfirmed_mails, 1);
        assert_eq!(counts.unconfirmed_openids, 0);
        assert_eq!(counts.avatars, 1);
    }
}

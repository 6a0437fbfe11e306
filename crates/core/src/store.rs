//! Object-store abstraction and its S3 implementation
//!
//! The sync engine talks to storage only through [`ObjectStore`], so it can
//! be exercised against [`MemoryStore`] without network access.

use crate::config::Policy;
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::{primitives::ByteStream, Client};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_types::error::display::DisplayErrorContext;

/// Metadata for one remote object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
    pub size: u64,
}

/// Operations the sync engine needs from a storage backend
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch metadata for `key`. `Ok(None)` means no such object exists.
    async fn head(&self, key: &str) -> Result<Option<RemoteObject>>;

    /// Create or fully overwrite the object at `key`.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str, policy: Policy)
        -> Result<()>;

    /// Probe bucket reachability and credentials before any upload.
    async fn verify_access(&self) -> Result<()>;
}

/// S3-backed store using the AWS SDK
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a store from ambient AWS configuration (environment variables,
    /// shared credentials file, instance profile). An explicit endpoint
    /// enables S3-compatible services.
    pub async fn from_env(bucket: String, endpoint: Option<String>) -> Self {
        let base = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);
        if let Some(url) = endpoint {
            builder = builder.endpoint_url(url).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        Self { client, bucket }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn response_status<E>(e: &SdkError<E, HttpResponse>) -> Option<u16> {
    e.raw_response().map(|r| r.status().as_u16())
}

/// Not-found comes back modeled on head_object; some S3-compatible services
/// leave it unmodeled with a bare 404.
fn head_not_found(e: &SdkError<HeadObjectError, HttpResponse>) -> bool {
    e.as_service_error()
        .map(HeadObjectError::is_not_found)
        .unwrap_or(false)
        || response_status(e) == Some(404)
}

fn is_access_denied<E>(e: &SdkError<E, HttpResponse>) -> bool {
    matches!(response_status(e), Some(401) | Some(403))
}

/// Full error chain, not the SDK's one-line `Display` output
fn render_sdk_error<E>(e: &SdkError<E, HttpResponse>) -> String
where
    E: std::error::Error + Send + Sync + 'static,
{
    DisplayErrorContext(e).to_string()
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head(&self, key: &str) -> Result<Option<RemoteObject>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => Ok(Some(RemoteObject {
                key: key.to_string(),
                size: response.content_length().unwrap_or(0).max(0) as u64,
            })),
            Err(e) => {
                if head_not_found(&e) {
                    Ok(None)
                } else if is_access_denied(&e) {
                    Err(Error::RemoteAuth(render_sdk_error(&e)))
                } else {
                    Err(Error::Head {
                        key: key.to_string(),
                        message: render_sdk_error(&e),
                    })
                }
            }
        }
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        policy: Policy,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(policy.into())
            .send()
            .await
            .map_err(|e| Error::Transfer {
                key: key.to_string(),
                message: render_sdk_error(&e),
            })?;

        Ok(())
    }

    async fn verify_access(&self) -> Result<()> {
        match self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let message = render_sdk_error(&e);
                if is_access_denied(&e) {
                    Err(Error::RemoteAuth(message))
                } else {
                    Err(Error::RemoteConnection(message))
                }
            }
        }
    }
}

pub mod memory {
    //! In-memory store for tests

    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Stored object: body bytes plus the policy it was uploaded with
    #[derive(Debug, Clone)]
    pub struct StoredObject {
        pub body: Vec<u8>,
        pub content_type: String,
        pub policy: Policy,
    }

    #[derive(Default)]
    struct Inner {
        objects: HashMap<String, StoredObject>,
        fail_puts: HashSet<String>,
        deny_access: Option<String>,
        head_count: u64,
        put_count: u64,
    }

    /// Map-backed [`ObjectStore`] with failure injection and call counters
    #[derive(Default)]
    pub struct MemoryStore {
        inner: Mutex<Inner>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-seed a remote object of the given size
        pub fn seed(&self, key: &str, size: usize) {
            let mut inner = self.inner.lock().unwrap();
            inner.objects.insert(
                key.to_string(),
                StoredObject {
                    body: vec![0u8; size],
                    content_type: "application/octet-stream".to_string(),
                    policy: Policy::Private,
                },
            );
        }

        /// Make every future put of `key` fail with a transfer error
        pub fn fail_put(&self, key: &str) {
            self.inner.lock().unwrap().fail_puts.insert(key.to_string());
        }

        /// Make `verify_access` fail as if credentials were rejected
        pub fn deny_access(&self, message: &str) {
            self.inner.lock().unwrap().deny_access = Some(message.to_string());
        }

        pub fn get(&self, key: &str) -> Option<StoredObject> {
            self.inner.lock().unwrap().objects.get(key).cloned()
        }

        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> =
                self.inner.lock().unwrap().objects.keys().cloned().collect();
            keys.sort();
            keys
        }

        pub fn head_count(&self) -> u64 {
            self.inner.lock().unwrap().head_count
        }

        pub fn put_count(&self) -> u64 {
            self.inner.lock().unwrap().put_count
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn head(&self, key: &str) -> Result<Option<RemoteObject>> {
            let mut inner = self.inner.lock().unwrap();
            inner.head_count += 1;
            Ok(inner.objects.get(key).map(|o| RemoteObject {
                key: key.to_string(),
                size: o.body.len() as u64,
            }))
        }

        async fn put(
            &self,
            key: &str,
            body: Vec<u8>,
            content_type: &str,
            policy: Policy,
        ) -> Result<()> {
            let mut inner = self.inner.lock().unwrap();
            inner.put_count += 1;
            if inner.fail_puts.contains(key) {
                return Err(Error::Transfer {
                    key: key.to_string(),
                    message: "injected failure".to_string(),
                });
            }
            inner.objects.insert(
                key.to_string(),
                StoredObject {
                    body,
                    content_type: content_type.to_string(),
                    policy,
                },
            );
            Ok(())
        }

        async fn verify_access(&self) -> Result<()> {
            match &self.inner.lock().unwrap().deny_access {
                Some(message) => Err(Error::RemoteAuth(message.clone())),
                None => Ok(()),
            }
        }
    }
}

pub use memory::MemoryStore;

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_s3::operation::head_bucket::HeadBucketError;
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;
    use aws_smithy_types::error::ErrorMetadata;

    fn response(status: u16) -> HttpResponse {
        HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::empty())
    }

    #[test]
    fn test_modeled_not_found_is_absent_object() {
        let err = SdkError::service_error(
            HeadObjectError::NotFound(NotFound::builder().build()),
            response(404),
        );
        assert!(head_not_found(&err));
        assert!(!is_access_denied(&err));
    }

    #[test]
    fn test_unmodeled_404_is_absent_object() {
        let err = SdkError::service_error(
            HeadObjectError::generic(ErrorMetadata::builder().code("NoSuchKey").build()),
            response(404),
        );
        assert!(head_not_found(&err));
    }

    #[test]
    fn test_403_is_auth_failure_not_absence() {
        let err = SdkError::service_error(
            HeadObjectError::generic(ErrorMetadata::builder().code("AccessDenied").build()),
            response(403),
        );
        assert!(!head_not_found(&err));
        assert!(is_access_denied(&err));
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err: SdkError<HeadBucketError, HttpResponse> =
            SdkError::timeout_error("no route to host");
        assert_eq!(response_status(&err), None);
        assert!(!is_access_denied(&err));
    }

    #[tokio::test]
    async fn test_memory_store_head_and_put() {
        let store = MemoryStore::new();
        assert!(store.head("a.jpg").await.unwrap().is_none());

        store
            .put("a.jpg", vec![1, 2, 3], "image/jpeg", Policy::PublicRead)
            .await
            .unwrap();

        let meta = store.head("a.jpg").await.unwrap().unwrap();
        assert_eq!(meta.size, 3);
        assert_eq!(store.get("a.jpg").unwrap().policy, Policy::PublicRead);
    }

    #[tokio::test]
    async fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        store.fail_put("bad.jpg");

        let err = store
            .put("bad.jpg", vec![0], "image/jpeg", Policy::Private)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transfer { .. }));
    }
}

//! Object storage client for lesson media
//!
//! Thin pass-through over an S3-style HTTP API: put, delete, public URL.
//! Keys are namespaced `lessons/<lesson-id>/<filename>`.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{check_status, Result};

pub struct MediaStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MediaStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Object key for a lesson's media file
    pub fn lesson_key(lesson_id: Uuid, filename: &str) -> String {
        format!("lessons/{lesson_id}/{filename}")
    }

    /// Upload an object; overwrites any existing object under the key
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let response = self
            .client
            .put(format!("{}/objects/{key}", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        check_status(response).await?;
        info!(key, "Uploaded media object");
        Ok(())
    }

    /// Delete an object; deleting a missing key is the service's concern
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/objects/{key}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Public download URL for an object key
    pub fn download_url(&self, key: &str) -> String {
        format!("{}/objects/{key}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_puts_object() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/objects/lessons/abc/video.mp4"))
            .and(header("Content-Type", "video/mp4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = MediaStore::new(server.uri(), "key");
        store
            .upload("lessons/abc/video.mp4", vec![1, 2, 3], "video/mp4")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_failure_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("storage unavailable"))
            .mount(&server)
            .await;

        let store = MediaStore::new(server.uri(), "key");
        let err = store
            .upload("lessons/abc/video.mp4", vec![], "video/mp4")
            .await
            .unwrap_err();

        match err {
            crate::Error::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "storage unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_lesson_key_shape() {
        let id = Uuid::new_v4();
        assert_eq!(
            MediaStore::lesson_key(id, "video.mp4"),
            format!("lessons/{id}/video.mp4")
        );
    }
}

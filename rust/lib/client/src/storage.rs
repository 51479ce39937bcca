//! Object storage (`{project}/storage/v1`).

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use tracing::info;

use crate::auth::TokenSource;
use crate::error::ApiError;
use crate::Project;

pub const AVATARS_BUCKET: &str = "avatars";
pub const POST_COVERS_BUCKET: &str = "post-covers";

#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    storage_url: String,
    api_key: String,
    token_source: Arc<dyn TokenSource>,
}

impl StorageClient {
    pub fn new(project: &Project, token_source: Arc<dyn TokenSource>) -> Self {
        Self::with_http(reqwest::Client::new(), project, token_source)
    }

    pub fn with_http(http: reqwest::Client, project: &Project, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            storage_url: format!("{}/storage/v1", project.url),
            api_key: project.anon_key.clone(),
            token_source,
        }
    }

    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.storage_url, bucket, path)
    }

    pub(crate) fn upload_request(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/object/{}/{}", self.storage_url, bucket, path))
            .header("apikey", &self.api_key)
            .header("x-upsert", "true")
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
    }

    /// Upload, replacing any object already at `path`, and return its public URL.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        let size = bytes.len();
        let token = self.token_source.token().await?;
        let resp = self
            .upload_request(bucket, path, bytes, content_type)
            .bearer_auth(token.as_deref().unwrap_or(&self.api_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_body(status.as_u16(), &body));
        }
        info!(bucket, path, size, "uploaded object");
        Ok(self.public_url(bucket, path))
    }
}

/// Extension of a file name, without the dot. Names without one yield the whole name.
pub fn file_extension(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}

/// MIME type guessed from an image file extension.
pub fn image_content_type(file_name: &str) -> &'static str {
    match file_extension(file_name).to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

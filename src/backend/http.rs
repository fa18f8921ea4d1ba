//! reqwest implementation of the backend traits

use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::response::{parse_generation_body, parse_json_body, parse_upload_body};
use super::{
    BackendConfig, FragmentSource, GenerationBackend, GenerationError, GenerationRequest,
    GenerationResponse, UploadedImage,
};

/// Endpoint accepting multipart image uploads
pub const UPLOAD_IMAGE_PATH: &str = "/image_to_code/upload_image";

/// HTTP client for the console backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    http: Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn read(response: reqwest::Response) -> Result<(u16, String), GenerationError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, GenerationError> {
        let value = parse_json_body(status, body)?;
        serde_json::from_value(value).map_err(|e| GenerationError::Decode(e.to_string()))
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GenerationError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        let (status, body) = Self::read(response).await?;
        Self::decode(status, &body)
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GenerationError> {
        let url = self.config.url(path);
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let (status, body) = Self::read(response).await?;
        Self::decode(status, &body)
    }

    /// DELETE `path/<segment>` with the segment percent-encoded
    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
        segment: &str,
    ) -> Result<T, GenerationError> {
        let url = self.segment_url(path, segment)?;
        debug!("DELETE {}", url);
        let response = self.http.delete(url).send().await?;
        let (status, body) = Self::read(response).await?;
        Self::decode(status, &body)
    }

    /// Build `<base><path>/<segment>`, encoding `/` and other reserved characters in the segment
    pub fn segment_url(&self, path: &str, segment: &str) -> Result<Url, GenerationError> {
        let mut url = Url::parse(&self.config.url(path))
            .map_err(|e| GenerationError::Request(format!("invalid URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GenerationError::Request("base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Upload an image as the multipart field `image`
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<UploadedImage, GenerationError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new().part("image", part);

        let url = self.config.url(UPLOAD_IMAGE_PATH);
        debug!("POST {} ({})", url, filename);
        let response = self.http.post(url).multipart(form).send().await?;
        let (status, body) = Self::read(response).await?;
        parse_upload_body(status, &body)
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let url = self.config.url(&request.path);
        debug!("POST {} ({} fields)", url, request.body.len());
        let response = self.http.post(url).json(&request.body).send().await?;
        let (status, body) = Self::read(response).await?;
        parse_generation_body(status, &body)
    }
}

#[async_trait]
impl FragmentSource for HttpBackend {
    async fn fetch_fragment(&self, path: &str) -> Result<String, GenerationError> {
        let url = self.config.url(path);
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

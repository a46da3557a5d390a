//! HTTP client whose request and response bodies go through a [`JsonConverter`].

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::converter::JsonConverter;
use crate::errors::Result;

const APPLICATION_JSON: &str = "application/json";

/// A reqwest client paired with a converter.
#[derive(Debug, Clone)]
pub struct JsonClient {
    http: Client,
    converter: Arc<JsonConverter>,
}

impl JsonClient {
    pub fn new(converter: Arc<JsonConverter>) -> Self {
        Self::with_client(Client::new(), converter)
    }

    pub fn with_client(http: Client, converter: Arc<JsonConverter>) -> Self {
        Self { http, converter }
    }

    pub fn converter(&self) -> &Arc<JsonConverter> {
        &self.converter
    }

    /// `GET url` and convert the response body to `T`.
    pub async fn get<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned + 'static,
    {
        let request = self.http.get(url).header(ACCEPT, APPLICATION_JSON);
        self.send(request).await
    }

    /// `POST url` with `body` serialized by the converter, converting the
    /// response body to `T`.
    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + 'static,
        T: DeserializeOwned + 'static,
    {
        let request = self.json_body(self.http.post(url), body)?;
        self.send(request).await
    }

    /// Attach `body` to `request` as a JSON entity.
    pub fn json_body<B>(&self, request: RequestBuilder, body: &B) -> Result<RequestBuilder>
    where
        B: Serialize + 'static,
    {
        let bytes = self.converter.write_to_vec(body)?;
        Ok(request
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .body(bytes))
    }

    /// Convert a response body to `T`. Non-success statuses are errors.
    pub async fn read_response<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned + 'static,
    {
        let response = response.error_for_status()?;
        let bytes = response.bytes().await?;
        self.converter.read_slice(&bytes)
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned + 'static,
    {
        let response = request.send().await?;
        tracing::debug!(status = %response.status(), url = %response.url(), "JSON response received");
        self.read_response(response).await
    }
}

use std::time::Duration;

use anyhow::{Error, Result, bail};
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde_json::json;

/// Response body as a lazy sequence of byte chunks.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, Error>>;

/// Opens a streaming request for one user message.
///
/// An error returned from `open` or yielded by the stream is a
/// transport failure. Cancellation is not an error: the caller drops
/// the pending future instead.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, message: &str) -> Result<ByteStream, Error>;
}

/// Sends `{"message": ...}` as JSON to a chat endpoint and streams
/// the response body.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, message: &str) -> Result<ByteStream, Error> {
        let payload = json!({ "message": message });
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP Error: {}", status);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(Error::from))
            .boxed();
        Ok(stream)
    }
}

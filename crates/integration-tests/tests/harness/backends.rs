//! Mock collaborators: the audio host and the inference server

use serde_json::Value;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Bytes served as the source recording
pub const SOURCE_AUDIO: &[u8] = b"RIFF";

/// `SOURCE_AUDIO` as the model backend receives it
pub const SOURCE_AUDIO_BASE64: &str = "UklGRg==";

/// Serves `SOURCE_AUDIO` at `/source.wav`
pub struct AudioHost {
    server: MockServer,
}

impl AudioHost {
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/source.wav"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(SOURCE_AUDIO))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn url(&self) -> String {
        format!("{}/source.wav", self.server.uri())
    }

    pub fn missing_url(&self) -> String {
        format!("{}/missing.wav", self.server.uri())
    }

    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}

/// Inference server answering both endpoints with a canned result
pub struct MockModel {
    server: MockServer,
}

impl MockModel {
    pub async fn returning(output: Value) -> Self {
        let server = MockServer::start().await;

        for endpoint in ["/inpaint", "/synthesize"] {
            Mock::given(method("POST"))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(200).set_body_json(output.clone()))
                .mount(&server)
                .await;
        }

        Self { server }
    }

    pub async fn failing(status: u16, message: &str) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Path and JSON body of every request received so far
    pub async fn requests(&self) -> Vec<(String, Value)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|request| {
                let body = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
                (request.url.path().to_owned(), body)
            })
            .collect()
    }
}

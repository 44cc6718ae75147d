//! Client for the document service: generation, upload extraction, and
//! export to downloadable formats.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::ClientError;
use crate::types::{
    ExportFormat, ExportRequest, ExtractResponse, GenerateRequest, GenerateResponse,
};

/// Client for the document-service endpoints.
#[derive(Debug, Clone)]
pub struct DocumentsClient {
    generate_url: Url,
    extract_url: Url,
    export_base_url: Url,
    client: Client,
    timeout: Option<Duration>,
}

impl DocumentsClient {
    /// Constructs a client from the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if an endpoint URL cannot be
    /// joined onto the base.
    pub fn try_new(base_url: Url) -> Result<Self, ClientError> {
        let generate_url =
            base_url
                .join("./api/documents/generate")
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct generate URL",
                    source: e,
                })?;
        let extract_url =
            base_url
                .join("./api/documents/extract-text")
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct extract-text URL",
                    source: e,
                })?;
        // Trailing slash so the format's endpoint joins as a path segment.
        let export_base_url =
            base_url
                .join("./api/documents/")
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct documents URL",
                    source: e,
                })?;
        Ok(Self {
            generate_url,
            extract_url,
            export_base_url,
            client: Client::new(),
            timeout: None,
        })
    }

    /// Sets a timeout for each individual request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Generates a cover letter tailored to a job description.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request fails, the server answers
    /// with a non-200 status, or the body cannot be deserialized.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, ClientError> {
        let context = "POST generate";
        let mut req = self.client.post(self.generate_url.clone()).json(request);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::HttpStatus {
                context,
                status: response.status(),
            });
        }
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClientError::JsonDeserialization { context, source: e })?;
        Ok(body.cover_letter)
    }

    /// Uploads a resume file and returns its extracted text.
    ///
    /// The file travels as the `file` part of a multipart form.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request fails, the server answers
    /// with a non-200 status, or the body cannot be deserialized.
    pub async fn extract_text(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let context = "POST extract-text";
        let part = Part::bytes(bytes).file_name(file_name.to_owned());
        let form = Form::new().part("file", part);
        let mut req = self.client.post(self.extract_url.clone()).multipart(form);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::HttpStatus {
                context,
                status: response.status(),
            });
        }
        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ClientError::JsonDeserialization { context, source: e })?;
        Ok(body.extracted_text)
    }

    /// Exports text to the given format and returns the document bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request fails, the server answers
    /// with a non-200 status, or the body cannot be read.
    pub async fn export(&self, text: &str, format: ExportFormat) -> Result<Vec<u8>, ClientError> {
        let context = "POST export";
        let url = self
            .export_base_url
            .join(format.endpoint())
            .map_err(|e| ClientError::UrlParse {
                context: "Failed to construct export URL",
                source: e,
            })?;
        let request = ExportRequest {
            text: text.to_owned(),
        };
        let mut req = self.client.post(url).json(&request);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::HttpStatus {
                context,
                status: response.status(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::ResponseBodyRead { context, source: e })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> DocumentsClient {
        DocumentsClient::try_new(server.uri().parse::<Url>().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn generate_returns_the_cover_letter_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/generate"))
            .and(body_partial_json(
                serde_json::json!({"jobDescription": "Rust engineer"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"coverLetter": "Dear Hiring Manager,\n\nI write..."}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let request = GenerateRequest {
            job_description: "Rust engineer".to_owned(),
        };
        let text = client(&server).await.generate(&request).await.unwrap();
        assert!(text.starts_with("Dear Hiring Manager,"));
    }

    #[tokio::test]
    async fn extract_text_uploads_the_file_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/extract-text"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"extractedText": "resume body"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .await
            .extract_text("resume.pdf", b"%PDF-1.7".to_vec())
            .await
            .unwrap();
        assert_eq!(text, "resume body");
    }

    #[tokio::test]
    async fn export_routes_by_format_and_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/generate-pdf"))
            .and(body_partial_json(serde_json::json!({"text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/documents/generate-docx"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let pdf = client.export("hello", ExportFormat::Pdf).await.unwrap();
        assert_eq!(pdf, b"%PDF");
        let docx = client.export("hello", ExportFormat::Docx).await.unwrap();
        assert_eq!(docx, b"PK\x03\x04");
    }

    #[tokio::test]
    async fn non_200_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let request = GenerateRequest {
            job_description: String::new(),
        };
        let err = client(&server).await.generate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::HttpStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                ..
            }
        ));
    }
}

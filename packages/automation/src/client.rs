//! Automation client abstraction and its HTTP implementation.

use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use url::Url;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::operation::{Input, Operation, OperationId, OperationRequest, Output};
use crate::types::{Blob, Document, Documents};

const AUTOMATION_PATH: &str = "api/v1/automation/";

/// Trait for executing automation operations.
///
/// Implementations can talk to a real repository or serve canned answers
/// in tests.
pub trait Automation: Send + Sync {
    fn execute(&self, request: OperationRequest) -> Result<Output, Error>;
}

/// Fluent entry point: `client.operation(OperationId::DocumentFetch)`.
pub trait AutomationExt: Automation {
    fn operation(&self, operation: OperationId) -> Operation<'_, Self> {
        Operation::new(self, operation)
    }
}

impl<T: Automation + ?Sized> AutomationExt for T {}

impl<T: Automation + ?Sized> Automation for &T {
    fn execute(&self, request: OperationRequest) -> Result<Output, Error> {
        (*self).execute(request)
    }
}

impl<T: Automation + ?Sized> Automation for Box<T> {
    fn execute(&self, request: OperationRequest) -> Result<Output, Error> {
        self.as_ref().execute(request)
    }
}

impl<T: Automation + ?Sized> Automation for Arc<T> {
    fn execute(&self, request: OperationRequest) -> Result<Output, Error> {
        self.as_ref().execute(request)
    }
}

/// Blocking HTTP client for the repository's automation endpoint.
///
/// Every operation is a `POST {base}/api/v1/automation/{operation}`.
pub struct HttpAutomationClient {
    client: Client,
    endpoint: Url,
    credentials: Option<(String, Option<String>)>,
}

impl HttpAutomationClient {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::try_from(name.as_str()).map_err(|e| Error::InvalidHeader {
                message: e.to_string(),
            })?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|e| Error::InvalidHeader {
                message: e.to_string(),
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Self::with_client(client, config)
    }

    /// Create a client around a preconfigured reqwest client.
    pub fn with_client(client: Client, config: &ClientConfig) -> Result<Self, Error> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?.join(AUTOMATION_PATH)?;

        let credentials = config
            .username
            .clone()
            .map(|user| (user, config.password.clone()));

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    /// URL an operation is posted to.
    pub fn operation_url(&self, operation: OperationId) -> Result<Url, Error> {
        self.endpoint.join(operation.as_str()).map_err(Error::from)
    }

    fn build(&self, request: &OperationRequest) -> Result<RequestBuilder, Error> {
        let url = self.operation_url(request.operation)?;
        let mut builder = self
            .client
            .post(url)
            .header("Accept", "application/json, */*");

        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, password.as_ref());
        }

        let body = serde_json::to_string(&request.body())?;

        builder = match &request.input {
            Some(Input::Blob(upload)) => {
                let envelope = Part::text(body).mime_str("application/json")?;
                let content = Part::file(&upload.path)?
                    .file_name(upload.filename.clone())
                    .mime_str(&upload.mime_type)?;
                builder.multipart(Form::new().part("request", envelope).part("input", content))
            }
            _ => builder
                .header(CONTENT_TYPE, "application/json")
                .body(body),
        };

        Ok(builder)
    }

    fn decode(
        operation: OperationId,
        response: reqwest::blocking::Response,
    ) -> Result<Output, Error> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);

        if !status.is_success() {
            let text = response.text()?;
            return Err(Error::Remote {
                operation,
                status: status.as_u16(),
                message: remote_message(&text),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Output::Void);
        }

        let bytes = response.bytes()?;
        let mime_type = content_type
            .as_deref()
            .map(essence)
            .unwrap_or("application/octet-stream")
            .to_string();

        if mime_type.contains("json") {
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
                let entity = value
                    .get("entity-type")
                    .and_then(|t| t.as_str())
                    .map(str::to_owned);
                match entity.as_deref() {
                    Some("document") => {
                        let doc: Document = serde_json::from_value(value)?;
                        return Ok(Output::Document(doc));
                    }
                    Some("documents") => {
                        let docs: Documents = serde_json::from_value(value)?;
                        return Ok(Output::Documents(docs));
                    }
                    // Any other JSON body is the content of a blob.
                    _ => {}
                }
            }
        }

        if bytes.is_empty() && content_type.is_none() {
            return Ok(Output::Void);
        }

        Ok(Output::Blob(Blob::from_bytes(&bytes, mime_type, filename)?))
    }
}

impl Automation for HttpAutomationClient {
    fn execute(&self, request: OperationRequest) -> Result<Output, Error> {
        let operation = request.operation;
        let response = self.build(&request)?.send()?;
        log::debug!("{} answered {}", operation, response.status());
        Self::decode(operation, response)
    }
}

/// Media type without parameters (`text/plain; charset=UTF-8` -> `text/plain`).
fn essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or(content_type).trim()
}

fn filename_from_disposition(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Extract the message of an exception entity, falling back to the raw body.
fn remote_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_url_is_under_automation_endpoint() {
        let client =
            HttpAutomationClient::new(&ClientConfig::new("http://localhost:8080/nuxeo")).unwrap();
        let url = client.operation_url(OperationId::DocumentFetch).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/nuxeo/api/v1/automation/Document.Fetch"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let client =
            HttpAutomationClient::new(&ClientConfig::new("http://localhost:8080/nuxeo/")).unwrap();
        let url = client.operation_url(OperationId::PdfMergeWithDocs).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/nuxeo/api/v1/automation/PDF.MergeWithDocs"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = HttpAutomationClient::new(&ClientConfig::new("not a url"));
        assert!(matches!(result, Err(Error::UrlParse(_))));
    }

    #[test]
    fn invalid_default_header_is_rejected() {
        let config = ClientConfig::new("http://repo").with_header("bad header", "x");
        let result = HttpAutomationClient::new(&config);
        assert!(matches!(result, Err(Error::InvalidHeader { .. })));
    }

    #[test]
    fn disposition_filename_parsing() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"report.pdf\""),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition("inline;filename=a.txt"),
            Some("a.txt".to_string())
        );
        assert_eq!(filename_from_disposition("attachment"), None);
    }

    #[test]
    fn remote_message_prefers_exception_entity() {
        let body = r#"{"entity-type":"exception","status":404,"message":"Failed to get document /x/"}"#;
        assert_eq!(remote_message(body), "Failed to get document /x/");
        assert_eq!(remote_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(essence("text/plain; charset=UTF-8"), "text/plain");
        assert_eq!(essence("application/pdf"), "application/pdf");
    }
}

//! Reqwest-based authenticated transport for the gateway REST API.
//!
//! Every request carries the merchant `userName` and `password` fields: as
//! query parameters for GET, as a form-encoded body for POST.

use crate::config::{Credentials, Endpoints, SberpayConfig};
use crate::SberpayError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Request field carrying the API username.
pub const USERNAME_FIELD: &str = "userName";

/// Request field carrying the API password.
pub const PASSWORD_FIELD: &str = "password";

/// Request parameters or form fields.
pub type Params = BTreeMap<String, String>;

/// HTTP response as received from the gateway.
///
/// The status code is not interpreted; a non-2xx response is returned as-is.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status: u16,

    /// Final request URL, without the query string (it carries credentials).
    pub url: String,

    /// Raw response body.
    pub body: Vec<u8>,
}

impl GatewayResponse {
    fn from_response(response: Response) -> Result<Self, SberpayError> {
        let status = response.status().as_u16();
        let mut url = response.url().clone();
        url.set_query(None);
        let url = url.to_string();

        let body = response
            .bytes()
            .map_err(|e| {
                SberpayError::Transport(format!("Failed to read body: {}", e.without_url()))
            })?
            .to_vec();

        Ok(Self { status, url, body })
    }

    /// Whether the status code is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the body as a UTF-8 string.
    pub fn body_str(&self) -> Result<&str, SberpayError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| SberpayError::ProtocolError(format!("Invalid UTF-8 in body: {}", e)))
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, SberpayError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| SberpayError::ProtocolError(format!("Invalid JSON body: {}", e)))
    }
}

/// HTTP transport that signs every request with the merchant credentials.
pub struct AuthenticatedTransport {
    client: Client,
    credentials: Credentials,
    endpoints: Endpoints,
    user_agent: String,
}

impl AuthenticatedTransport {
    /// Create a transport from config.
    pub fn new(config: &SberpayConfig) -> Result<Self, SberpayError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SberpayError::Transport(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            credentials: config.credentials.clone(),
            endpoints: config.endpoints.clone(),
            user_agent: build_user_agent(),
        })
    }

    /// Set a request timeout.
    pub fn try_with_timeout(mut self, timeout: Duration) -> Result<Self, SberpayError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SberpayError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Add the credential fields to `params`.
    ///
    /// # Errors
    /// `CredentialConflict` if the caller already set `userName` or `password`.
    pub fn authenticate(&self, mut params: Params) -> Result<Params, SberpayError> {
        for field in [USERNAME_FIELD, PASSWORD_FIELD] {
            if params.contains_key(field) {
                return Err(SberpayError::CredentialConflict {
                    field: field.to_string(),
                });
            }
        }

        params.insert(
            USERNAME_FIELD.to_string(),
            self.credentials.username().to_string(),
        );
        params.insert(
            PASSWORD_FIELD.to_string(),
            self.credentials.password().to_string(),
        );
        Ok(params)
    }

    /// Authenticated GET with `params` in the query string.
    pub fn get(&self, url: &str, params: Params) -> Result<GatewayResponse, SberpayError> {
        self.send(Method::GET, url, HeaderMap::new(), params)
    }

    /// Authenticated POST with `data` as a form-encoded body.
    pub fn post(&self, url: &str, data: Params) -> Result<GatewayResponse, SberpayError> {
        self.send(Method::POST, url, HeaderMap::new(), data)
    }

    /// Authenticated GET against a named operation.
    pub fn get_operation(&self, operation: &str, params: Params) -> Result<GatewayResponse, SberpayError> {
        let url = self.endpoints.resolve(operation)?;
        self.get(url, params)
    }

    /// Authenticated POST against a named operation.
    pub fn post_operation(&self, operation: &str, data: Params) -> Result<GatewayResponse, SberpayError> {
        let url = self.endpoints.resolve(operation)?;
        self.post(url, data)
    }

    /// Send an authenticated request with extra headers.
    ///
    /// GET carries the fields as query parameters, every other method as a
    /// form body.
    pub fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        params: Params,
    ) -> Result<GatewayResponse, SberpayError> {
        let params = self.authenticate(params)?;

        tracing::debug!(%method, url, fields = params.len(), "sending gateway request");

        let request: RequestBuilder = self
            .client
            .request(method.clone(), url)
            .header(USER_AGENT, &self.user_agent)
            .headers(headers);

        let request = if method == Method::GET {
            request.query(&params)
        } else {
            request.form(&params)
        };

        let response = request
            .send()
            .map_err(|e| SberpayError::Transport(format!("Request failed: {}", e.without_url())))?;

        GatewayResponse::from_response(response)
    }

    /// The endpoint table this transport resolves operations against.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

/// Build the User-Agent string.
///
/// Format: `sberpay/<version>`
pub fn build_user_agent() -> String {
    format!("sberpay/{}", env!("CARGO_PKG_VERSION"))
}

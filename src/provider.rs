/// VoilaNorbert name search client
///
/// Request building and response parsing are plain functions; the actual
/// HTTP exchange sits behind `Transport` so the background worker can use
/// `fetch` while tests script replies.

use crate::chrome;
use crate::config::{AUTH_USERNAME, SEARCH_ENDPOINT};
use crate::error::ProviderError;
use crate::lookup::{LookupResult, LookupStatus};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use url::form_urlencoded;

/// A form-encoded POST ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct FormPost {
    pub url: String,
    pub authorization: String,
    pub body: String,
}

impl FormPost {
    pub fn name_search(endpoint: &str, name: &str, domain: &str, api_key: &str) -> FormPost {
        FormPost {
            url: endpoint.to_string(),
            authorization: basic_auth(api_key),
            body: form_urlencoded::Serializer::new(String::new())
                .append_pair("name", name)
                .append_pair("domain", domain)
                .finish(),
        }
    }
}

/// `Authorization` header value; the API key is the Basic auth password.
pub fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", AUTH_USERNAME, api_key)))
}

/// Status line and body of an HTTP reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    async fn post_form(&self, request: &FormPost) -> Result<HttpReply, ProviderError>;
}

/// `fetch` through the JS bridge
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn post_form(&self, request: &FormPost) -> Result<HttpReply, ProviderError> {
        let reply = chrome::post_form(&request.url, &request.authorization, &request.body).await?;

        serde_wasm_bindgen::from_value(reply)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse reply: {}", e)))
    }
}

/// Remote source of founder emails
pub trait EmailProvider {
    async fn search(
        &self,
        name: &str,
        domain: &str,
        api_key: &str,
    ) -> Result<LookupResult, ProviderError>;
}

pub struct VoilaNorbert<T> {
    transport: T,
    endpoint: String,
}

impl<T: Transport> VoilaNorbert<T> {
    pub fn new(transport: T) -> Self {
        VoilaNorbert {
            transport,
            endpoint: SEARCH_ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> EmailProvider for VoilaNorbert<T> {
    async fn search(
        &self,
        name: &str,
        domain: &str,
        api_key: &str,
    ) -> Result<LookupResult, ProviderError> {
        let request = FormPost::name_search(&self.endpoint, name, domain, api_key);
        let reply = self.transport.post_form(&request).await?;

        if !reply.is_success() {
            log::error!("API error response ({}): {}", reply.status, reply.body);
            return Err(ProviderError::Status {
                status: reply.status,
                body: reply.body,
            });
        }

        let result = parse_search_response(&reply.body)?;
        log::debug!("Provider result: {:?}", result);
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    email: Option<EmailMatch>,
    #[serde(default)]
    searching: Option<bool>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailMatch {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// Map a name search response body onto a `LookupResult`
///
/// `searching: true` wins over any explicit status. Without a status the
/// result is `found` when it carries an email and `not_found` otherwise.
pub fn parse_search_response(body: &str) -> Result<LookupResult, ProviderError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

    let (email, score) = match response.email {
        Some(found) => (found.email.filter(|e| !e.is_empty()), found.score),
        None => (None, None),
    };

    let status = if response.searching.unwrap_or(false) {
        LookupStatus::Searching
    } else {
        match response.status {
            Some(status) => LookupStatus::from(status),
            None if email.is_some() => LookupStatus::Found,
            None => LookupStatus::NotFound,
        }
    };

    Ok(LookupResult { email, score, status })
}

/// Message relay between the content script and the background worker
///
/// The content script cannot reach the provider itself, so it sends a
/// `FIND_EMAIL` message and awaits exactly one response: a `LookupResult`
/// or an `{error}` envelope. Messages with other tags are left for other
/// listeners.

use crate::chrome;
use crate::config::{CLEAR_CACHE, FIND_EMAIL};
use crate::lookup::LookupResult;
use crate::provider::{EmailProvider, FetchTransport, VoilaNorbert};
use crate::resolver::Resolver;
use crate::storage::{ChromeStore, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeRequest {
    #[serde(rename = "FIND_EMAIL", rename_all = "camelCase")]
    FindEmail {
        founder_name: String,
        company_website: String,
        api_key: String,
    },
    #[serde(rename = "CLEAR_CACHE")]
    ClearCache,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    Error { error: String },
    Cleared { cleared: bool },
    Found(LookupResult),
}

/// Decode a raw message
///
/// Returns `None` for messages this bridge does not own, so no response is
/// sent for them. A message with our tag but a bad payload decodes to `Err`.
pub fn decode_request(message: serde_json::Value) -> Option<Result<BridgeRequest, String>> {
    let tag = message.get("type")?.as_str()?.to_string();
    if tag != FIND_EMAIL && tag != CLEAR_CACHE {
        return None;
    }

    Some(serde_json::from_value(message).map_err(|e| format!("Malformed {} request: {}", tag, e)))
}

/// Run one request to completion; every failure becomes an `{error}` envelope.
pub async fn handle_request<S, P>(resolver: &Resolver<S, P>, request: BridgeRequest) -> BridgeResponse
where
    S: KeyValueStore,
    P: EmailProvider,
{
    match request {
        BridgeRequest::FindEmail {
            founder_name,
            company_website,
            api_key,
        } => {
            log::info!("Looking up email for {} at {}", founder_name, company_website);
            match resolver.resolve(&founder_name, &company_website, &api_key).await {
                Ok(result) => BridgeResponse::Found(result),
                Err(e) => {
                    log::error!("Background lookup error: {}", e);
                    BridgeResponse::Error { error: e.to_string() }
                }
            }
        }
        BridgeRequest::ClearCache => match resolver.clear_cache().await {
            Ok(()) => BridgeResponse::Cleared { cleared: true },
            Err(e) => BridgeResponse::Error { error: e.to_string() },
        },
    }
}

fn to_js(response: &BridgeResponse) -> Result<JsValue, JsValue> {
    response
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Install the message handler in the background worker
pub fn listen() {
    let resolver = Rc::new(Resolver::new(
        ChromeStore::local(),
        VoilaNorbert::new(FetchTransport),
    ));

    let handler = Closure::<dyn FnMut(JsValue) -> JsValue>::new(move |message: JsValue| {
        let decoded = serde_wasm_bindgen::from_value::<serde_json::Value>(message)
            .ok()
            .and_then(decode_request);

        let request = match decoded {
            Some(request) => request,
            None => return JsValue::UNDEFINED,
        };

        let resolver = Rc::clone(&resolver);
        future_to_promise(async move {
            let response = match request {
                Ok(request) => handle_request(&resolver, request).await,
                Err(error) => {
                    log::warn!("{}", error);
                    BridgeResponse::Error { error }
                }
            };
            to_js(&response)
        })
        .into()
    });

    chrome::set_message_handler(handler.as_ref().unchecked_ref());
    // Lives for the whole worker
    handler.forget();
    log::info!("Background message handler installed");
}

/// Send a request from the content script or popup and wait for the response
pub async fn send(request: &BridgeRequest) -> Result<BridgeResponse, JsValue> {
    let message = request
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)?;

    let response = chrome::send_message(message).await?;
    serde_wasm_bindgen::from_value(response).map_err(JsValue::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupStatus;
    use crate::provider::scripted::ScriptedTransport;
    use crate::storage::memory::MemoryStore;
    use futures::executor::block_on;
    use serde_json::json;

    fn find_email(website: &str) -> BridgeRequest {
        BridgeRequest::FindEmail {
            founder_name: "Jane Doe".to_string(),
            company_website: website.to_string(),
            api_key: "key".to_string(),
        }
    }

    #[test]
    fn test_decode_find_email() {
        let message = json!({
            "type": "FIND_EMAIL",
            "founderName": "Jane Doe",
            "companyWebsite": "acme.com",
            "apiKey": "key"
        });

        let decoded = decode_request(message).unwrap().unwrap();

        assert_eq!(decoded, find_email("acme.com"));
    }

    #[test]
    fn test_decode_clear_cache() {
        let decoded = decode_request(json!({"type": "CLEAR_CACHE"})).unwrap().unwrap();

        assert_eq!(decoded, BridgeRequest::ClearCache);
    }

    #[test]
    fn test_decode_ignores_foreign_messages() {
        assert!(decode_request(json!({"type": "PING"})).is_none());
        assert!(decode_request(json!({"hello": "world"})).is_none());
        assert!(decode_request(json!("FIND_EMAIL")).is_none());
    }

    #[test]
    fn test_decode_malformed_payload() {
        let decoded = decode_request(json!({"type": "FIND_EMAIL", "founderName": "Jane"})).unwrap();

        assert!(decoded.unwrap_err().contains("Malformed FIND_EMAIL"));
    }

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(find_email("acme.com")).unwrap();

        assert_eq!(
            json,
            json!({
                "type": "FIND_EMAIL",
                "founderName": "Jane Doe",
                "companyWebsite": "acme.com",
                "apiKey": "key"
            })
        );
    }

    #[test]
    fn test_response_wire_format() {
        let error = BridgeResponse::Error { error: "boom".to_string() };
        assert_eq!(serde_json::to_value(&error).unwrap(), json!({"error": "boom"}));

        let found: BridgeResponse =
            serde_json::from_value(json!({"email": "x@y.com", "score": 0.9, "status": "found"}))
                .unwrap();
        assert_eq!(
            found,
            BridgeResponse::Found(LookupResult {
                email: Some("x@y.com".to_string()),
                score: Some(0.9),
                status: LookupStatus::Found,
            })
        );

        let error: BridgeResponse = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert_eq!(error, BridgeResponse::Error { error: "boom".to_string() });
    }

    #[test]
    fn test_handle_find_email() {
        let resolver = Resolver::new(
            MemoryStore::new(),
            VoilaNorbert::new(
                ScriptedTransport::new().reply(200, r#"{"email": {"email": "x@y.com", "score": 0.9}}"#),
            ),
        );

        let response = block_on(handle_request(&resolver, find_email("acme.com")));

        match response {
            BridgeResponse::Found(result) => assert_eq!(result.email.as_deref(), Some("x@y.com")),
            other => panic!("expected result, got {:?}", other),
        }
    }

    #[test]
    fn test_handle_error_becomes_envelope() {
        let resolver = Resolver::new(
            MemoryStore::new(),
            VoilaNorbert::new(ScriptedTransport::new().reply(500, "internal error")),
        )
        .without_fallback();

        let response = block_on(handle_request(&resolver, find_email("acme.com")));

        assert_eq!(
            response,
            BridgeResponse::Error {
                error: "email lookup failed: API responded with status 500: internal error"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_handle_clear_cache() {
        let resolver = Resolver::new(
            MemoryStore::new(),
            VoilaNorbert::new(
                ScriptedTransport::new().reply(200, r#"{"email": {"email": "x@y.com"}}"#),
            ),
        );
        block_on(handle_request(&resolver, find_email("acme.com")));

        let response = block_on(handle_request(&resolver, BridgeRequest::ClearCache));

        assert_eq!(response, BridgeResponse::Cleared { cleared: true });
        assert_eq!(resolver.cache().len(), 0);
    }
}

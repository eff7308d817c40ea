//! Session creation over HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::cookies::CookieJar;
use super::headers::{browser_headers, random_forwarded_ip};
use super::ConversationNegotiator;
use crate::{ChatHubError, ClientConfig, Conversation};

const ENCRYPTED_SIGNATURE_HEADER: &str = "x-sydney-encryptedconversationsignature";
const SIGNATURE_HEADER: &str = "x-sydney-conversationsignature";

/// Build the reqwest client used for service HTTP calls.
pub(crate) fn build_http_client(
    proxy: Option<&str>,
    timeout: std::time::Duration,
) -> Result<reqwest::Client, ChatHubError> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout);
    if let Some(proxy) = proxy.filter(|p| !p.is_empty()) {
        let proxy =
            reqwest::Proxy::all(proxy).map_err(|e| ChatHubError::Http(format!("proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| ChatHubError::Http(e.to_string()))
}

pub(crate) fn map_reqwest_error(context: &str, e: reqwest::Error) -> ChatHubError {
    if e.is_timeout() {
        ChatHubError::Timeout(context.to_string())
    } else {
        ChatHubError::Http(e.to_string())
    }
}

/// [`ConversationNegotiator`] backed by the service's create endpoint.
pub struct HttpNegotiator {
    http: reqwest::Client,
    url: String,
    cookies: CookieJar,
    forwarded_ip: String,
}

impl HttpNegotiator {
    pub fn new(config: &ClientConfig, cookies: CookieJar) -> Result<Self, ChatHubError> {
        Ok(Self {
            http: build_http_client(config.proxy.as_deref(), config.timeouts.http)?,
            url: config.create_conversation_url.clone(),
            cookies,
            forwarded_ip: random_forwarded_ip(),
        })
    }
}

#[async_trait]
impl ConversationNegotiator for HttpNegotiator {
    async fn create(&self) -> Result<Conversation, ChatHubError> {
        info!(url = %self.url, "Creating conversation");

        let mut request = self.http.get(&self.url);
        for (name, value) in browser_headers(&self.forwarded_ip, &self.cookies.header_value()) {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_reqwest_error("conversation creation", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(ChatHubError::Negotiation(format!("HTTP {status}: {text}")));
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let encrypted = header(ENCRYPTED_SIGNATURE_HEADER);
        let signature = header(SIGNATURE_HEADER);

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error("conversation creation", e))?;

        let conversation =
            parse_create_response(&body, encrypted.as_deref(), signature.as_deref())?;
        debug!(
            conversation_id = %conversation.conversation_id,
            has_access_token = conversation.sec_access_token.is_some(),
            "Conversation created"
        );
        Ok(conversation)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    #[serde(default)]
    conversation_id: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    conversation_signature: Option<String>,
    #[serde(default)]
    result: Option<CreateResult>,
}

#[derive(Debug, Deserialize)]
struct CreateResult {
    #[serde(default)]
    value: String,
    #[serde(default)]
    message: Option<String>,
}

/// Parse the create endpoint's body plus its signature headers.
pub fn parse_create_response(
    body: &str,
    encrypted_signature: Option<&str>,
    signature: Option<&str>,
) -> Result<Conversation, ChatHubError> {
    let parsed: CreateResponse = serde_json::from_str(body).map_err(|e| {
        let snippet = body.chars().take(200).collect::<String>();
        ChatHubError::Negotiation(format!("malformed response ({e}): {snippet}"))
    })?;

    if let Some(result) = &parsed.result {
        if result.value != "Success" {
            let message = result.message.as_deref().unwrap_or_default();
            warn!(value = %result.value, message = %message, "Conversation creation rejected");
            return Err(ChatHubError::Negotiation(format!(
                "{}: {}",
                result.value, message
            )));
        }
    }

    if parsed.conversation_id.is_empty() {
        return Err(ChatHubError::Negotiation(
            "response carries no conversation id".into(),
        ));
    }

    let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
    Ok(Conversation {
        conversation_id: parsed.conversation_id,
        client_id: parsed.client_id,
        conversation_signature: parsed
            .conversation_signature
            .filter(|s| !s.is_empty())
            .or_else(|| non_empty(signature)),
        sec_access_token: non_empty(encrypted_signature),
    })
}

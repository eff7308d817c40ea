//! Challenge handoff to an external bypass service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chathub_common::new_id;

use super::{CaptchaResolver, Challenge};
use crate::negotiator::{build_http_client, map_reqwest_error};
use crate::{ChatHubError, ClientConfig, CookieJar};

#[derive(Debug, Serialize)]
struct BypassRequest<'a> {
    cookies: String,
    iframeid: String,
    #[serde(rename = "convId")]
    conv_id: &'a str,
    rid: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct BypassResponse {
    #[serde(default)]
    result: BypassResult,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct BypassResult {
    #[serde(default)]
    cookies: String,
    #[serde(default)]
    screenshot: String,
}

/// Parse the bypass service's answer into the refreshed cookie header.
pub fn parse_bypass_response(body: &str) -> Result<String, ChatHubError> {
    let parsed: BypassResponse = serde_json::from_str(body)
        .map_err(|e| ChatHubError::Http(format!("malformed bypass response: {e}")))?;
    if !parsed.error.is_empty() {
        return Err(ChatHubError::Http(format!(
            "bypass server error: {}",
            parsed.error
        )));
    }
    if parsed.result.cookies.is_empty() {
        return Err(ChatHubError::Http(
            "bypass server returned no cookies".into(),
        ));
    }
    if !parsed.result.screenshot.is_empty() {
        info!(len = parsed.result.screenshot.len(), "Bypass server attached a screenshot");
    }
    Ok(parsed.result.cookies)
}

/// Posts the challenge to a bypass server and installs the cookies it returns.
pub struct BypassServerResolver {
    http: reqwest::Client,
    url: String,
    cookies: CookieJar,
}

impl BypassServerResolver {
    pub fn new(
        url: impl Into<String>,
        config: &ClientConfig,
        cookies: CookieJar,
    ) -> Result<Self, ChatHubError> {
        Ok(Self {
            http: build_http_client(config.proxy.as_deref(), config.timeouts.http)?,
            url: url.into(),
            cookies,
        })
    }

    async fn exchange(&self, challenge: &Challenge) -> Result<String, ChatHubError> {
        let body = BypassRequest {
            cookies: self.cookies.header_value(),
            iframeid: format!("local-gen-{}", new_id()),
            conv_id: &challenge.conversation_id,
            rid: challenge.turn_id.as_str(),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error("bypass request", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_reqwest_error("bypass request", e))?;
        if !status.is_success() {
            let text = text.chars().take(200).collect::<String>();
            return Err(ChatHubError::Http(format!("HTTP {status}: {text}")));
        }
        parse_bypass_response(&text)
    }
}

#[async_trait]
impl CaptchaResolver for BypassServerResolver {
    async fn resolve(
        &self,
        challenge: &Challenge,
        cancel: &CancellationToken,
    ) -> Result<(), ChatHubError> {
        info!(
            url = %self.url,
            conversation_id = %challenge.conversation_id,
            "Requesting CAPTCHA bypass"
        );
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChatHubError::Cancelled),
            result = self.exchange(challenge) => result,
        };
        let cookies = result.inspect_err(|e| warn!(error = %e, "CAPTCHA bypass failed"))?;

        self.cookies.replace_from_header(&cookies);
        info!(count = self.cookies.len(), "Cookies refreshed by bypass server");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chathub_common::TurnId;

    use super::*;
    use crate::test_support::one_shot_server;

    #[test]
    fn parse_success_returns_cookies() {
        let body = r#"{"result":{"cookies":"_U=new; cct=x","screenshot":"b64"},"error":""}"#;
        assert_eq!(parse_bypass_response(body).unwrap(), "_U=new; cct=x");
    }

    #[test]
    fn parse_error_field_fails() {
        let body = r#"{"result":{"cookies":""},"error":"solver timeout"}"#;
        let err = parse_bypass_response(body).unwrap_err();
        assert_eq!(err, ChatHubError::Http("bypass server error: solver timeout".into()));
    }

    #[test]
    fn parse_rejects_garbage_and_empty_cookies() {
        assert!(parse_bypass_response("oops").is_err());
        assert!(parse_bypass_response(r#"{"result":{}}"#).is_err());
    }

    #[tokio::test]
    async fn resolve_posts_challenge_and_replaces_cookies() {
        let (url, seen) =
            one_shot_server(r#"{"result":{"cookies":"_U=fresh","screenshot":""},"error":""}"#).await;
        let jar = CookieJar::from_header("_U=stale");
        let resolver = BypassServerResolver::new(url, &ClientConfig::default(), jar.clone()).unwrap();

        let challenge = Challenge {
            conversation_id: "conv-9".into(),
            turn_id: TurnId::from("turn-9".to_string()),
        };
        resolver
            .resolve(&challenge, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(jar.header_value(), "_U=fresh");
        let sent: serde_json::Value = serde_json::from_str(&seen.await.unwrap()).unwrap();
        assert_eq!(sent["convId"], "conv-9");
        assert_eq!(sent["rid"], "turn-9");
        assert_eq!(sent["cookies"], "_U=stale");
        assert!(sent["iframeid"].as_str().unwrap().starts_with("local-gen-"));
    }

    #[tokio::test]
    async fn cancelled_resolve_reports_cancelled() {
        let resolver = BypassServerResolver::new(
            "http://127.0.0.1:9/bypass",
            &ClientConfig::default(),
            CookieJar::new(),
        )
        .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let challenge = Challenge {
            conversation_id: "c".into(),
            turn_id: TurnId::new(),
        };
        let err = resolver.resolve(&challenge, &cancel).await.unwrap_err();
        assert_eq!(err, ChatHubError::Cancelled);
    }
}

//! Browser-like request headers shared by negotiation and the socket upgrade.

use rand::Rng;

use chathub_common::new_id;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36 Edg/113.0.1774.50";

/// Header set sent with every request to the service.
///
/// `forwarded_ip` is fixed per client; `cookie` is the rendered jar.
pub fn browser_headers(forwarded_ip: &str, cookie: &str) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("accept", "application/json".to_string()),
        ("accept-language", "en-US,en;q=0.9".to_string()),
        ("content-type", "application/json".to_string()),
        (
            "sec-ch-ua",
            r#""Microsoft Edge";v="113", "Chromium";v="113", "Not-A.Brand";v="24""#.to_string(),
        ),
        ("sec-ch-ua-arch", r#""x86""#.to_string()),
        ("sec-ch-ua-bitness", r#""64""#.to_string()),
        ("sec-ch-ua-full-version", r#""113.0.1774.50""#.to_string()),
        ("sec-ch-ua-mobile", "?0".to_string()),
        ("sec-ch-ua-model", r#""""#.to_string()),
        ("sec-ch-ua-platform", r#""Windows""#.to_string()),
        ("sec-ch-ua-platform-version", r#""15.0.0""#.to_string()),
        ("sec-fetch-dest", "empty".to_string()),
        ("sec-fetch-mode", "cors".to_string()),
        ("sec-fetch-site", "same-origin".to_string()),
        ("x-ms-client-request-id", new_id()),
        (
            "x-ms-useragent",
            "azsdk-js-api-client-factory/1.0.0-beta.1 core-rest-pipeline/1.10.0 OS/Win32"
                .to_string(),
        ),
        ("user-agent", USER_AGENT.to_string()),
        (
            "referer",
            "https://www.bing.com/search?q=Bing+AI&showconv=1".to_string(),
        ),
        ("referrer-policy", "origin-when-cross-origin".to_string()),
        ("x-forwarded-for", forwarded_ip.to_string()),
    ];
    if !cookie.is_empty() {
        headers.push(("cookie", cookie.to_string()));
    }
    headers
}

/// Random `1.0.0.x` address for `x-forwarded-for`.
pub(crate) fn random_forwarded_ip() -> String {
    format!("1.0.0.{}", rand::thread_rng().gen_range(1..=255u8))
}

use crate::logging;
use flagwatch_core::FlagColor;
use regex::Regex;
use reqwest::Client as HTTPClient;
use std::sync::LazyLock;

pub const DEFAULT_FLAG_URL: &str = "https://api.community-boating.org/api/flag";

// Matches `var FLAG_COLOR = "Y"` and the usual variations of it. Opening and
// closing quotes must agree.
static FLAG_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bFLAG_COLOR\s*=\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')"#)
        .expect("flag regex is valid")
});
static SCRIPT_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s:/\*.*?\*/)|//[^\r\n]*").expect("comment regex is valid")
});

/// Fetches the current flag color.
///
/// Every failure (network, status, payload) is logged and reported as
/// `None`: the next tick simply tries again.
pub async fn fetch_flag_status(client: &HTTPClient, url: &str) -> Option<FlagColor> {
    let logger = logging::Logger::new().url(url);

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            logger
                .clone()
                .error_text(err.to_string())
                .warn("flag.request_failed", "Flag endpoint unreachable");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let headers = response.headers().clone();
        logger.status(status.as_u16()).warn(
            "flag.http_status",
            &format!("Unexpected status from flag endpoint, headers: {headers:?}"),
        );
        return None;
    }

    let payload = match response.text().await {
        Ok(payload) => payload,
        Err(err) => {
            logger
                .clone()
                .error_text(err.to_string())
                .warn("flag.body_failed", "Failed to read flag payload");
            return None;
        }
    };
    logger.debug("flag.payload", payload.trim());

    let Some(code) = parse_flag_code(&payload) else {
        logger
            .error_text(payload.trim())
            .warn("flag.unparsable", "No flag color found in payload");
        return None;
    };

    let color = FlagColor::from_code(&code);
    logger.color(color.label()).info("flag.fetched", "Flag color fetched");
    Some(color)
}

/// Extracts the quoted value assigned to `FLAG_COLOR` without evaluating the
/// payload. Commented-out assignments are ignored.
pub fn parse_flag_code(payload: &str) -> Option<String> {
    let live = SCRIPT_COMMENT.replace_all(payload, "");
    FLAG_ASSIGNMENT
        .captures(&live)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|code| code.as_str().to_string())
}

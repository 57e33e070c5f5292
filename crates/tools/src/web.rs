//! Web page reader tool — fetch a URL and return its readable text.

use async_trait::async_trait;
use openpaw_core::error::ToolError;
use openpaw_core::tool::Tool;
use tracing::debug;

const MAX_PAGE_CHARS: usize = 8_000;
const FETCH_TIMEOUT_SECS: u64 = 20;

/// Fetch a web page over HTTP(S), strip the markup, and return the text
/// truncated to a model-friendly size.
pub struct WebPageReaderTool {
    client: reqwest::Client,
}

impl WebPageReaderTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
                .user_agent("openpaw-agent/0.1")
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for WebPageReaderTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebPageReaderTool {
    fn name(&self) -> &str {
        "read_web_page"
    }

    fn description(&self) -> &str {
        "Fetch a web page by URL and return its text content, with HTML markup removed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The http:// or https:// URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let url = arguments["url"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'url' argument".into()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(
                "URL must start with http:// or https://".into(),
            ));
        }

        debug!(url = %url, "fetching web page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_web_page".into(),
                reason: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "read_web_page".into(),
                reason: format!("server returned status {}", response.status().as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_web_page".into(),
                reason: format!("failed to read response body: {e}"),
            })?;

        Ok(truncate(&strip_html(&body), MAX_PAGE_CHARS))
    }
}

/// Strip tags, scripts, and styles from an HTML document, collapsing
/// runs of whitespace left behind.
fn strip_html(html: &str) -> String {
    fn starts_with_ci(haystack: &str, needle: &str) -> bool {
        haystack.len() >= needle.len()
            && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
    }

    let mut text = String::with_capacity(html.len() / 4);
    let mut chars = html.char_indices();
    let mut skip_until: Option<&str> = None;

    while let Some((i, c)) = chars.next() {
        if let Some(closer) = skip_until {
            if starts_with_ci(&html[i..], closer) {
                for _ in 0..closer.len().saturating_sub(1) {
                    chars.next();
                }
                skip_until = None;
            }
            continue;
        }
        if c == '<' {
            if starts_with_ci(&html[i..], "<script") {
                skip_until = Some("</script>");
            } else if starts_with_ci(&html[i..], "<style") {
                skip_until = Some("</style>");
            } else {
                // plain tag, consume through '>'
                for (_, tc) in chars.by_ref() {
                    if tc == '>' {
                        break;
                    }
                }
                text.push(' ');
            }
            continue;
        }
        text.push(c);
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}\n[content truncated]")
}

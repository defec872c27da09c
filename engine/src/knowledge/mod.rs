//! Knowledge Resolver
//!
//! Splits KNOWLEDGE content into the absolute URLs it mentions and, when any
//! other text is left, one inline source holding the *original* content
//! (URLs included) encoded as a `data:` URI.
//!
//! # Example
//!
//! ```
//! use folio_engine::knowledge::{decode_inline_knowledge, resolve_knowledge_content};
//!
//! let resolved = resolve_knowledge_content("Prices: https://shop.example/prices");
//! assert_eq!(resolved.url_knowledge_sources, vec!["https://shop.example/prices"]);
//!
//! let inline = resolved.inline_knowledge_source.unwrap();
//! assert_eq!(
//!     decode_inline_knowledge(&inline).as_deref(),
//!     Some("Prices: https://shop.example/prices")
//! );
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use folio_sdk::{EngineError, KnowledgeUploader};
use regex::Regex;
use serde::Deserialize;
use std::ops::Range;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Prefix of every inline knowledge reference
pub const INLINE_KNOWLEDGE_PREFIX: &str = "data:text/plain;charset=utf-8;base64,";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:https?|ftp)://[^\s<>"'`{}|\\^]+"#).expect("url pattern is valid")
});

/// Characters that end a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']'];

/// Result of splitting knowledge content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedKnowledge {
    /// URLs in order of appearance
    pub url_knowledge_sources: Vec<String>,
    /// Encoded original content, present when prose remains besides the URLs
    pub inline_knowledge_source: Option<String>,
}

/// Byte ranges of absolute URLs in `text`
pub fn find_url_spans(text: &str) -> Vec<Range<usize>> {
    URL_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let trimmed = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            // A bare scheme is not a URL
            if trimmed.ends_with("://") {
                return None;
            }
            Some(m.start()..m.start() + trimmed.len())
        })
        .collect()
}

/// Absolute URLs in `text`, in order of appearance
pub fn extract_urls(text: &str) -> Vec<String> {
    find_url_spans(text)
        .into_iter()
        .map(|span| text[span].to_string())
        .collect()
}

/// Split knowledge content into URL sources and an optional inline source
pub fn resolve_knowledge_content(content: &str) -> ResolvedKnowledge {
    let spans = find_url_spans(content);

    let mut remainder = String::with_capacity(content.len());
    let mut cursor = 0;
    for span in &spans {
        remainder.push_str(&content[cursor..span.start]);
        cursor = span.end;
    }
    remainder.push_str(&content[cursor..]);

    let url_knowledge_sources = spans
        .into_iter()
        .map(|span| content[span].to_string())
        .collect();

    let inline_knowledge_source = if remainder.trim().is_empty() {
        None
    } else {
        Some(encode_inline_knowledge(content))
    };

    ResolvedKnowledge {
        url_knowledge_sources,
        inline_knowledge_source,
    }
}

/// Encode text as a self-contained inline knowledge reference
pub fn encode_inline_knowledge(text: &str) -> String {
    format!("{}{}", INLINE_KNOWLEDGE_PREFIX, STANDARD.encode(text.as_bytes()))
}

/// Decode an inline knowledge reference; `None` for URLs and malformed data
pub fn decode_inline_knowledge(source: &str) -> Option<String> {
    let rest = source.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Whether a knowledge source is inline rather than a URL
pub fn is_inline_knowledge(source: &str) -> bool {
    source.starts_with("data:")
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Uploads inline knowledge to an HTTP endpoint.
///
/// The text is POSTed as `text/plain`; the endpoint answers with
/// `{"url": "<where the knowledge now lives>"}`.
pub struct HttpKnowledgeUploader {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpKnowledgeUploader {
    /// Create an uploader for the given endpoint
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }
}

#[async_trait]
impl KnowledgeUploader for HttpKnowledgeUploader {
    async fn upload_inline_knowledge(&self, text: &str) -> Result<String, EngineError> {
        debug!("Uploading {} bytes of knowledge to {}", text.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(self.timeout_secs)
                } else {
                    EngineError::KnowledgeUpload(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| EngineError::KnowledgeUpload(e.to_string()))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| EngineError::KnowledgeUpload(format!("invalid response: {}", e)))?;

        Ok(body.url)
    }
}

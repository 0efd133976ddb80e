//! Pagination state for result fetching.
//!
//! The service returns a "next link" URL whose query string holds the paging
//! parameters of the following page. A [`ContinuationCursor`] is that query
//! decoded to `{top, skip, show_stats}`; it round-trips through an opaque
//! token string so callers can persist it between fetches.

use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::version::ApiFamily;

/// Paging parameters of one result fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContinuationCursor {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub show_stats: bool,
}

/// Defaults for the first `fetch_page` of a job, before any cursor exists.
pub type PageOptions = ContinuationCursor;

impl ContinuationCursor {
    pub fn new(top: Option<u32>, skip: Option<u32>, show_stats: bool) -> Self {
        Self {
            top,
            skip,
            show_stats,
        }
    }

    /// Encode as an opaque token (`$top=..&$skip=..&showStats=..`).
    pub fn to_token(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(top) = self.top {
            serializer.append_pair("$top", &top.to_string());
        }
        if let Some(skip) = self.skip {
            serializer.append_pair("$skip", &skip.to_string());
        }
        serializer.append_pair("showStats", if self.show_stats { "true" } else { "false" });
        serializer.finish()
    }

    /// Decode a token produced by [`to_token`](Self::to_token) or a full next-link URL.
    ///
    /// Both the legacy `$top`/`$skip` and the Language API `top`/`skip`
    /// spellings are accepted; unrelated parameters (such as `api-version`)
    /// are ignored.
    pub fn from_token(token: &str) -> TextAnalyticsResult<Self> {
        let query = match url::Url::parse(token) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => token.trim_start_matches('?').to_string(),
        };

        let mut cursor = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "$top" | "top" => cursor.top = Some(parse_count(&key, &value)?),
                "$skip" | "skip" => cursor.skip = Some(parse_count(&key, &value)?),
                "showStats" => {
                    cursor.show_stats = value.parse::<bool>().map_err(|_| {
                        TextAnalyticsError::InvalidState(format!(
                            "continuation token has non-boolean showStats '{value}'"
                        ))
                    })?
                }
                _ => {}
            }
        }
        Ok(cursor)
    }

    /// Decode the server's next link, `None` when the link is absent or empty.
    pub fn from_next_link(next_link: Option<&str>) -> TextAnalyticsResult<Option<Self>> {
        match next_link.map(str::trim) {
            Some(link) if !link.is_empty() => Self::from_token(link).map(Some),
            _ => Ok(None),
        }
    }

    /// Render as status-call query parameters, spelled for the given API family.
    pub fn query_pairs(&self, family: ApiFamily) -> Vec<(&'static str, String)> {
        let (top_key, skip_key) = match family {
            ApiFamily::Legacy => ("$top", "$skip"),
            ApiFamily::Language => ("top", "skip"),
        };

        let mut pairs = vec![("showStats", self.show_stats.to_string())];
        if let Some(top) = self.top {
            pairs.push((top_key, top.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push((skip_key, skip.to_string()));
        }
        pairs
    }
}

fn parse_count(key: &str, value: &str) -> TextAnalyticsResult<u32> {
    value.parse().map_err(|_| {
        TextAnalyticsError::InvalidState(format!(
            "continuation token has non-numeric {key} '{value}'"
        ))
    })
}

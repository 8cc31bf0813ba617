use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four matching algorithms exposed under `/search/{strategy}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Prefix,
    Substring,
    Fulltext,
    Fuzzy,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Prefix,
        Strategy::Substring,
        Strategy::Fulltext,
        Strategy::Fuzzy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Prefix => "prefix",
            Strategy::Substring => "substring",
            Strategy::Fulltext => "fulltext",
            Strategy::Fuzzy => "fuzzy",
        }
    }

    /// HTTP path serving this strategy.
    pub fn endpoint(self) -> String {
        format!("/search/{}", self.as_str())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SearchError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == name)
            .ok_or_else(|| SearchError::UnknownStrategy(name.to_string()))
    }
}

/// A validated query: non-empty text and a positive limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub strategy: Strategy,
    pub text: String,
    pub limit: i64,
}

impl SearchRequest {
    pub fn new(
        strategy: Strategy,
        text: impl Into<String>,
        limit: i64,
    ) -> Result<Self, SearchError> {
        let text = text.into();
        if text.is_empty() {
            return Err(SearchError::InvalidArgument(
                "q must contain at least 1 character".to_string(),
            ));
        }
        if limit <= 0 {
            return Err(SearchError::InvalidArgument(format!(
                "limit must be a positive integer, got {}",
                limit
            )));
        }

        Ok(Self {
            strategy,
            text,
            limit,
        })
    }
}

/// Query string of `GET /search/{strategy}`. Both fields are kept as raw
/// strings so that malformed values surface as [`SearchError::InvalidArgument`]
/// with the offending parameter named.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Parses an optional `limit` query parameter, falling back to `default`.
pub fn parse_limit(raw: Option<&str>, default: i64) -> Result<i64, SearchError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let limit: i64 = raw.trim().parse().map_err(|_| {
        SearchError::InvalidArgument(format!("limit must be a positive integer, got `{}`", raw))
    })?;
    if limit <= 0 {
        return Err(SearchError::InvalidArgument(format!(
            "limit must be a positive integer, got {}",
            limit
        )));
    }
    Ok(limit)
}

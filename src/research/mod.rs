//! Data model and error taxonomy for a single search → extract → synthesize run.

pub(crate) mod engine;

use std::fmt;

use serde::Serialize;

use crate::fetch::FetchError;
use crate::llm::GenerationError;
use crate::serp::SearchError;

/// User intent for one run. Immutable once built; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Result<Self, ResearchError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ResearchError::EmptyQuery);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One candidate returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Candidates in provider relevance order, plus the raw provider response
/// for callers that want to persist it.
#[derive(Debug, Clone)]
pub struct SearchResultSet {
    pub results: Vec<SearchResult>,
    pub raw: serde_json::Value,
}

impl SearchResultSet {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// The synthesized answer and the candidate it is grounded in.
///
/// The answer text is whatever the model returned; two runs over the same
/// query and page text may produce different answers.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub answer: String,
    pub source: SearchResult,
}

impl Report {
    /// Link of the page the answer was grounded in.
    pub fn provenance(&self) -> &str {
        &self.source.link
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("search failed: {0}")]
    Transport(#[from] SearchError),

    #[error("search returned no organic results")]
    EmptyResults,

    #[error("page fetch failed: {0}")]
    PageFetch(#[from] FetchError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}

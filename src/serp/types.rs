use serde::Deserialize;

use crate::research::SearchResult;

/// The part of a SerpAPI response the pipeline reads. Everything else in the
/// body is kept only in the raw JSON.
#[derive(Debug, Deserialize)]
pub struct SerpResponse {
    pub organic_results: Option<Vec<OrganicResult>>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl From<OrganicResult> for SearchResult {
    fn from(item: OrganicResult) -> Self {
        SearchResult {
            title: item.title.unwrap_or_default(),
            link: item.link.unwrap_or_default(),
            snippet: item.snippet.unwrap_or_default(),
        }
    }
}

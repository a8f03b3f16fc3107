use tracing::{debug, info};

use super::{Query, Report, ResearchError, SearchResult, SearchResultSet};
use crate::fetch::PageFetcher;
use crate::fetch::extractor::{self, ExtractMode};
use crate::llm::CompletionClient;
use crate::serp::SearchClient;

pub struct ResearchRequest<'a> {
    pub query: &'a Query,
    pub mode: ExtractMode,
}

/// Everything one run produced, kept so the caller can persist it.
#[derive(Debug)]
pub struct ResearchRun {
    pub search: SearchResultSet,
    pub content: String,
    pub report: Report,
    pub used_raw_fallback: bool,
}

/// Candidate selection: always the first result. Later candidates are never
/// tried, even when fetching the first one fails.
pub fn select_candidate(results: &[SearchResult]) -> Option<&SearchResult> {
    results.first()
}

/// Search, fetch the first candidate, extract its text, synthesize.
/// Any stage failure ends the run; there is no partial report.
pub async fn research(
    searcher: &impl SearchClient,
    fetcher: &impl PageFetcher,
    synthesizer: &impl CompletionClient,
    req: &ResearchRequest<'_>,
) -> Result<ResearchRun, ResearchError> {
    let query = req.query.as_str();

    let search = searcher.search(query).await?;
    info!(results = search.results.len(), "search stage complete");

    let source = select_candidate(&search.results)
        .ok_or(ResearchError::EmptyResults)?
        .clone();
    info!(link = %source.link, title = %source.title, "selected first candidate");

    let html = fetcher.fetch(&source.link).await?;

    let extraction = extractor::extract_with(&html, req.mode, Some(source.link.as_str()));
    if extraction.used_raw_fallback {
        debug!(link = %source.link, "full-page text used in place of readability");
    }
    info!(
        html_bytes = html.len(),
        text_bytes = extraction.text.len(),
        "extraction complete"
    );

    let answer = synthesizer.synthesize(query, &extraction.text).await?;
    info!(chars = answer.len(), "synthesis complete");

    Ok(ResearchRun {
        search,
        content: extraction.text,
        report: Report { answer, source },
        used_raw_fallback: extraction.used_raw_fallback,
    })
}

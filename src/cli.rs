use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::artifacts;
use crate::config::{ModelConfig, SerpConfig};
use crate::fetch::extractor::{self, ExtractMode};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::llm::OpenAiClient;
use crate::markdown;
use crate::research::Query;
use crate::research::engine::{self, ResearchRequest, ResearchRun};
use crate::serp::{SearchClient, SerpClient};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request bound on every network call (search, page, completion).
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_REDIRECTS: usize = 5;

/// Search the web, read the top result, and ask a model for a grounded answer.
///
/// Credentials come from the environment or a `.env` file:
/// `SERP_API_KEY`, `OPENAI_API_KEY`, and optionally `OPENAI_MODEL`,
/// `OPENAI_BASE_URL`, `SERP_API_URL`.
#[derive(Parser, Debug)]
#[command(name = "gleaner", version, about)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search, fetch the first result, and synthesize a report from its text
    Research {
        /// Query text; multiple words are joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
        /// Extract only the main article (Readability) instead of the whole page
        #[arg(long)]
        readable: bool,
        /// Write response.json, content.txt and report.txt into this directory
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,
        /// Print the report and its source as JSON
        #[arg(long)]
        json: bool,
    },
    /// List organic search results for a query
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Write the raw provider response to DIR/response.json
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch one page and print its extracted text
    Extract {
        /// Page URL (HTTP or HTTPS)
        url: String,
        #[arg(long)]
        readable: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        let http = http_client()?;
        match self.command {
            Command::Research {
                query,
                readable,
                save,
                json,
            } => run_research(http, &query, extract_mode(readable), save, json).await,
            Command::Search { query, save, json } => run_search(http, &query, save, json).await,
            Command::Extract { url, readable } => {
                run_extract(http, &url, extract_mode(readable)).await
            }
        }
    }
}

fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
}

fn extract_mode(readable: bool) -> ExtractMode {
    if readable {
        ExtractMode::Readable
    } else {
        ExtractMode::FullText
    }
}

async fn run_research(
    http: Client,
    words: &[String],
    mode: ExtractMode,
    save: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let query = Query::new(words.join(" "))?;
    let serp = SerpClient::new(http.clone(), SerpConfig::from_env()?);
    let model = ModelConfig::from_env()?;
    info!(query = %query, model = %model.model, ?mode, "cmd:research");
    let llm = OpenAiClient::new(http.clone(), model);
    let fetcher = HttpFetcher::new(http);

    let req = ResearchRequest {
        query: &query,
        mode,
    };
    let run = engine::research(&serp, &fetcher, &llm, &req).await?;

    if let Some(dir) = save
        && let Err(e) = artifacts::save_run(&dir, &run).await
    {
        error!(%e, "could not save artifacts");
    }

    let output = if json {
        serde_json::to_string_pretty(&report_json(&run, &query))?
    } else {
        markdown::format_report(&run, &query)
    };
    println!("{output}");
    Ok(())
}

async fn run_search(
    http: Client,
    words: &[String],
    save: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let query = Query::new(words.join(" "))?;
    let serp = SerpClient::new(http, SerpConfig::from_env()?);
    info!(query = %query, "cmd:search");

    let set = serp.search(query.as_str()).await?;
    if set.is_empty() {
        warn!("search returned no organic results");
    }
    info!(results = set.results.len(), "search complete");

    if let Some(dir) = save
        && let Err(e) = artifacts::save_search(&dir, &set).await
    {
        error!(%e, "could not save search response");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&set.results)?);
    } else {
        print!("{}", markdown::format_results(&set.results));
    }
    Ok(())
}

async fn run_extract(http: Client, url: &str, mode: ExtractMode) -> Result<(), Box<dyn Error>> {
    info!(url, ?mode, "cmd:extract");
    let html = HttpFetcher::new(http).fetch(url).await?;

    let extraction = extractor::extract_with(&html, mode, Some(url));
    if extraction.used_raw_fallback {
        debug!(url, "full-page text used in place of readability");
    }
    println!("{}", extraction.text);
    Ok(())
}

fn report_json(run: &ResearchRun, query: &Query) -> serde_json::Value {
    serde_json::json!({
        "query": query,
        "answer": run.report.answer,
        "provenance": run.report.provenance(),
        "source": run.report.source,
        "readability_fallback": run.used_raw_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::research::{Report, SearchResult, SearchResultSet};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn research_joins_query_words() {
        let cli = Cli::try_parse_from(["gleaner", "research", "latest", "news", "in", "AI"]).unwrap();
        match cli.command {
            Command::Research {
                query,
                readable,
                save,
                json,
            } => {
                assert_eq!(query.join(" "), "latest news in AI");
                assert!(!readable);
                assert!(save.is_none());
                assert!(!json);
            }
            other => panic!("expected research, got: {other:?}"),
        }
    }

    #[test]
    fn research_accepts_flags() {
        let cli = Cli::try_parse_from([
            "gleaner", "-v", "research", "--readable", "--save", "out", "--json", "q",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Research {
                readable,
                save,
                json,
                ..
            } => {
                assert!(readable);
                assert_eq!(save, Some(PathBuf::from("out")));
                assert!(json);
            }
            other => panic!("expected research, got: {other:?}"),
        }
    }

    #[test]
    fn research_requires_a_query() {
        assert!(Cli::try_parse_from(["gleaner", "research"]).is_err());
    }

    #[test]
    fn extract_takes_url() {
        let cli = Cli::try_parse_from(["gleaner", "extract", "https://example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Extract { ref url, readable: false } if url == "https://example.com"
        ));
    }

    #[test]
    fn readable_flag_maps_to_mode() {
        assert_eq!(extract_mode(true), ExtractMode::Readable);
        assert_eq!(extract_mode(false), ExtractMode::FullText);
    }

    #[tokio::test]
    async fn blank_query_is_rejected_before_any_request() {
        let err = run_research(Client::new(), &["  ".to_string()], ExtractMode::FullText, None, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"), "got: {err}");
    }

    #[test]
    fn report_json_carries_provenance() {
        let source = SearchResult {
            title: "A".into(),
            link: "http://x".into(),
            snippet: "s1".into(),
        };
        let run = ResearchRun {
            search: SearchResultSet {
                results: vec![source.clone()],
                raw: serde_json::Value::Null,
            },
            content: "Hello".into(),
            report: Report {
                answer: "The answer.".into(),
                source,
            },
            used_raw_fallback: false,
        };
        let query = Query::new("q").unwrap();

        let json = report_json(&run, &query);
        assert_eq!(json["query"], "q");
        assert_eq!(json["answer"], "The answer.");
        assert_eq!(json["provenance"], "http://x");
        assert_eq!(json["source"]["title"], "A");
        assert_eq!(json["readability_fallback"], false);
    }
}

//! Optional on-disk copies of a run: raw search response, extracted text,
//! and the report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::research::SearchResultSet;
use crate::research::engine::ResearchRun;

pub const SEARCH_FILE: &str = "response.json";
pub const CONTENT_FILE: &str = "content.txt";
pub const REPORT_FILE: &str = "report.txt";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode search response: {0}")]
    Encode(#[from] serde_json::Error),
}

pub async fn save_search(dir: &Path, search: &SearchResultSet) -> Result<PathBuf, ArtifactError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    search.raw.serialize(&mut serializer)?;
    write(dir, SEARCH_FILE, &String::from_utf8_lossy(&buf)).await
}

pub async fn save_run(dir: &Path, run: &ResearchRun) -> Result<Vec<PathBuf>, ArtifactError> {
    let written = vec![
        save_search(dir, &run.search).await?,
        write(dir, CONTENT_FILE, &run.content).await?,
        write(dir, REPORT_FILE, &run.report.answer).await?,
    ];
    info!(dir = %dir.display(), files = written.len(), "artifacts saved");
    Ok(written)
}

async fn write(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, ArtifactError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(name);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::{Report, SearchResult};

    fn sample_run() -> ResearchRun {
        let source = SearchResult {
            title: "A".into(),
            link: "http://x".into(),
            snippet: "s1".into(),
        };
        ResearchRun {
            search: SearchResultSet {
                results: vec![source.clone()],
                raw: serde_json::json!({
                    "organic_results": [{"title": "A", "link": "http://x", "snippet": "s1"}]
                }),
            },
            content: "Hello".into(),
            report: Report {
                answer: "Grounded answer".into(),
                source,
            },
            used_raw_fallback: false,
        }
    }

    #[tokio::test]
    async fn save_run_writes_three_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");

        let written = save_run(&dir, &sample_run()).await.unwrap();
        assert_eq!(written.len(), 3);

        let raw = std::fs::read_to_string(dir.join(SEARCH_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["organic_results"][0]["link"], "http://x");
        assert!(raw.starts_with("{\n    \"organic_results\""), "got: {raw}");

        assert_eq!(std::fs::read_to_string(dir.join(CONTENT_FILE)).unwrap(), "Hello");
        assert_eq!(
            std::fs::read_to_string(dir.join(REPORT_FILE)).unwrap(),
            "Grounded answer"
        );
    }

    #[tokio::test]
    async fn write_into_a_file_path_fails_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = save_run(&blocker, &sample_run()).await.unwrap_err();
        assert!(err.to_string().contains("not-a-dir"), "got: {err}");
    }
}

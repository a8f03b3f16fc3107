//! Markdown rendering for the terminal: the final report and the plain
//! result listing.

use crate::research::engine::ResearchRun;
use crate::research::{Query, SearchResult};

pub fn format_report(run: &ResearchRun, query: &Query) -> String {
    let source = &run.report.source;
    let label = if source.title.is_empty() {
        &source.link
    } else {
        &source.title
    };

    let mut output = format!("# Research: {}\n\n", sanitize_heading(query.as_str()));
    output.push_str(&run.report.answer);
    output.push_str(&format!(
        "\n\n---\n**Source:** [{}]({})\n",
        escape_md_link(label),
        escape_md_link(run.report.provenance())
    ));
    output
}

pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "(No organic results.)\n".to_string();
    }

    let mut output = String::new();
    for (i, result) in results.iter().enumerate() {
        output.push_str(&format!("Result {}: {}\n", i + 1, result.snippet));
        output.push_str(&format!(
            "  [{}]({})\n",
            escape_md_link(&result.title),
            escape_md_link(&result.link)
        ));
    }
    output
}

/// Backslash-escapes `[`, `]`, `(` and `)`.
fn escape_md_link(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut out, c| {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
        out
    })
}

fn sanitize_heading(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

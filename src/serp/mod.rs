//! Searcher: one SerpAPI request per query, read back as ordered candidates.

pub mod client;
pub mod types;

pub use client::{SearchClient, SearchError, SerpClient};

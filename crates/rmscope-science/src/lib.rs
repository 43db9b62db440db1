//! rmscope science: heuristic field extraction and paginated retrieval for
//! researcher profile records.

pub mod aggregate;
pub mod collect;
pub mod doi;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod lang;
pub mod links;
pub mod scoring;
pub mod text;

pub use aggregate::{DegreeLevel, affiliation_summary, degree_summary};
pub use error::{FetchError, Result};
pub use extract::Extractor;
pub use fetch::{Backoff, FetchController, RunObserver};
pub use http::{PageSource, ResearchmapClient};
pub use lang::LangResolver;
pub use links::LinkResolver;

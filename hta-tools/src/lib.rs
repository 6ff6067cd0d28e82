//! # HTA Tools
//!
//! PubMed literature search, search-string parsing, and the per-project
//! pipelines that connect them to the evidence extractor in `hta-core`.

pub mod error;
pub mod pipeline;
pub mod pubmed;
pub mod search_strings;

pub use error::{Result, ToolsError};
pub use pipeline::{
    ProcessSummary, SearchSummary, find_projects, perform_literature_search,
    process_project_data,
};
pub use pubmed::{LiteratureSource, PubMedClient};
pub use search_strings::extract_pubmed_query;

//! tabletalk - ask natural-language questions about a CSV dataset.
//!
//! Questions are translated into SQL by an LLM, executed against a
//! single-table SQLite store, and the results summarized into a direct
//! answer.

pub mod assistant;
pub mod config;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod store;

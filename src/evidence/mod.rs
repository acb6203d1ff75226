//! Evidence Module
//!
//! Literature retrieval and pharmacokinetic parameter estimation feeding
//! the sample-size engine.

mod extractor;
mod fallback;
mod literature;
mod params;

pub use extractor::{parse_reply, ParameterExtractor, MAX_CONTEXT_CHARS};
pub use fallback::FallbackTable;
pub use literature::{LiteratureSource, PubMedSource};
pub use params::{ParameterSource, PkParameters, SourcedParameters};

//! Advisor IN: signals derived from the raw user message
//!
//! Everything here is a pure function of the message text:
//!
//! ```text
//! message → normalize → { query type, complexity, urgency, child age }
//! ```
//!
//! # Example
//!
//! ```
//! use advisor_in::QueryAnalyzer;
//! use advisor_core::{QueryType, Urgency};
//!
//! let analysis = QueryAnalyzer::new().analyze("My 3 year old won't sleep, what routine helps?");
//! assert_eq!(analysis.query_type, QueryType::Routine);
//! assert_eq!(analysis.child_age.as_deref(), Some("3"));
//! assert_eq!(analysis.urgency, Urgency::Normal);
//! ```

pub mod analyzer;
pub mod normalizer;

pub use analyzer::QueryAnalyzer;
pub use normalizer::{normalize, word_count, word_set};

use advisor_core::QueryAnalysis;

/// Quick analysis with the default keyword tables
pub fn analyze(message: &str) -> QueryAnalysis {
    QueryAnalyzer::new().analyze(message)
}

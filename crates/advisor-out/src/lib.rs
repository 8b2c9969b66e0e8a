//! Advisor OUT: prompt assembly and fixed replies
//!
//! Renders the system message handed to the generator (advisor instructions,
//! plan guidance, ranked context) from Handlebars templates, and holds the
//! fixed replies used when the pipeline short-circuits.
//!
//! # Example
//!
//! ```
//! use advisor_core::ContextDocument;
//! use advisor_out::PromptRenderer;
//!
//! let renderer = PromptRenderer::builtin().unwrap();
//! let docs = vec![ContextDocument::new("Keep naps before 4pm.", "Sleep Handbook")];
//! let system = renderer.system_context("You are a parenting advisor.", &docs, None, None).unwrap();
//! assert!(system.contains("(Source: Sleep Handbook)"));
//! ```

pub mod messages;
pub mod renderer;
pub mod templates;

pub use renderer::PromptRenderer;
pub use templates::{Template, TemplatesFile};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutError {
    #[error("failed to read templates: {0}")]
    Io(String),

    #[error("invalid templates file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("required template `{0}` is missing")]
    MissingTemplate(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("render error: {0}")]
    Render(String),
}

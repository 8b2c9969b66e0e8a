//! Advisor Policy: moderation and safety screening
//!
//! ```text
//! user text ──► classifier ──flagged──► UNSAFE (0.9)
//!                   │
//!                   └─clean──► contextual judgment ──► SAFE / UNSAFE (0.8)
//!
//! model text ─► classifier ──► SAFE / UNSAFE (0.9)
//!
//! provider failure anywhere ──► SAFE, fail-open (0.0), logged
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use advisor_core::mock::{ScriptedClassifier, ScriptedGenerator};
//! use advisor_policy::ModerationGate;
//!
//! let gate = ModerationGate::new(
//!     Arc::new(ScriptedClassifier::clean()),
//!     Arc::new(ScriptedGenerator::replying("SAFE")),
//! );
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let verdict = rt.block_on(gate.check_input("How do I stop my toddler biting?"));
//! assert!(verdict.is_safe);
//! ```

pub mod gate;
pub mod safety;
pub mod verdict;

pub use gate::{parse_judgment, ModerationConfig, ModerationError, ModerationGate};
pub use safety::{sensitive_topics, SENSITIVE_KEYWORDS};
pub use verdict::{Direction, ModerationResult};

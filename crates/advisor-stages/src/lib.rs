//! Advisor Stages: ranking, planning and the pipeline orchestrator
//!
//! # Pipeline Flow
//!
//! ```text
//! message → moderation → retrieval → analyze → rank → plan → safety → generate → moderation
//!              ↓                                                          ↓           ↓
//!           refusal                                                   fallback    rephrase
//! ```
//!
//! The pure steps (analyze, rank, plan, safety) are [`advisor_core::Stage`]s
//! chained by a [`advisor_core::StageRunner`]; the orchestrator owns the
//! provider calls around them.

pub mod analysis;
pub mod config;
pub mod orchestrator;
pub mod planner;
pub mod ranker;
pub mod safety_pass;

pub use analysis::AnalyzeStage;
pub use config::PipelineConfig;
pub use orchestrator::PipelineOrchestrator;
pub use planner::{PlanResponseStage, ResponsePlanner};
pub use ranker::{ContextRanker, RankContextStage};
pub use safety_pass::{escalate_for_sensitive_topics, SafetyValidationStage};

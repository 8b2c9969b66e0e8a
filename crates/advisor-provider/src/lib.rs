//! Advisor Provider: HTTP access to an OpenAI-compatible model API
//!
//! Failures are mapped onto [`advisor_core::ProviderError`]:
//!
//! | response | error |
//! |---|---|
//! | no response (connect, timeout) | `Unavailable` |
//! | 401 / 403 | `Auth` |
//! | 429, or any quota error | `RateLimited` |
//! | other non-2xx | `Api` |
//! | 2xx with an unreadable body | `Malformed` |

pub mod openai;
mod wire;

pub use openai::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use wire::classify_status;

//! Unified Error Model
use crate::data_model::FailureKind;
use crate::stage::StageError;
use thiserror::Error;

/// Failure reported by a remote model provider (generation or classification)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Credentials missing, malformed or rejected
    #[error("AUTH/{0}")]
    Auth(String),

    /// Rate limit or quota exhausted
    #[error("RATE/{0}")]
    RateLimited(String),

    /// Network failure or timeout before a response arrived
    #[error("UNAVAILABLE/{0}")]
    Unavailable(String),

    /// A response arrived but could not be understood
    #[error("MALFORMED/{0}")]
    Malformed(String),

    /// Any other non-success answer
    #[error("API/{status}: {message}")]
    Api { status: u16, message: String },
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Auth(_) => FailureKind::Auth,
            ProviderError::RateLimited(_) => FailureKind::RateLimited,
            ProviderError::Unavailable(_) => FailureKind::Unavailable,
            ProviderError::Malformed(_) | ProviderError::Api { .. } => FailureKind::Other,
        }
    }
}

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("PROVIDER/{0}")]
    Provider(#[from] ProviderError),

    #[error("STAGE/{stage}: {source}")]
    Stage {
        stage: String,
        #[source]
        source: StageError,
    },

    #[error("HISTORY/{0}")]
    History(String),

    #[error("RETRIEVAL/{0}")]
    Retrieval(String),

    #[error("CONFIG/{0}")]
    Config(String),

    /// A stage or collaborator panicked
    #[error("PANIC/{0}")]
    Panic(String),
}

impl AdvisorError {
    pub fn stage(stage: impl Into<String>, source: StageError) -> Self {
        AdvisorError::Stage {
            stage: stage.into(),
            source,
        }
    }

    /// Message of a caught panic payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        AdvisorError::Panic(message)
    }

    /// Coarse classification used by the transport layer to pick a reply
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            AdvisorError::Provider(e) => e.kind(),
            _ => FailureKind::Other,
        }
    }
}

//! Pipeline-level error taxonomy.

use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::repository::DieselError;
use crate::upstream::UpstreamError;

/// Outcome classes the orchestrating stages distinguish.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Credential exchange failed; the stage cannot continue.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    /// Expected absence, e.g. an unknown hotel ID.
    #[error("not found: {0}")]
    NotFound(String),
    /// The provider does not support this hotel for search detail.
    #[error("unsupported by provider: {0}")]
    PermanentUnsupported(String),
    #[error("analysis failed: {0}")]
    Analysis(String),
    #[error("database error: {0}")]
    Database(#[from] DieselError),
    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<UpstreamError> for PipelineError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Auth(msg) => Self::Auth(msg),
            UpstreamError::Transport(msg) => Self::Transport(msg),
            UpstreamError::Status { status, body } => {
                Self::Transport(format!("HTTP {}: {}", status, body))
            }
            UpstreamError::Decode(msg) => Self::Decode(msg),
            UpstreamError::Empty(id) => Self::PermanentUnsupported(id),
            UpstreamError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<AnalysisError> for PipelineError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Cancelled => Self::Cancelled,
            other => Self::Analysis(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_upstream_mapping() {
        let err: PipelineError = UpstreamError::Auth("bad secret".into()).into();
        assert!(matches!(err, PipelineError::Auth(_)));

        let err: PipelineError = UpstreamError::Status {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::Transport(ref m) if m.contains("500")));

        let err: PipelineError = UpstreamError::Cancelled.into();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_analysis_cancel_stays_distinct() {
        let err: PipelineError = AnalysisError::Cancelled.into();
        assert!(err.is_cancelled());

        let err: PipelineError =
            AnalysisError::Quality(LlmError::Parse("not json".into())).into();
        assert!(matches!(err, PipelineError::Analysis(_)));
    }
}

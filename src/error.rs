//! Failure taxonomy for infrastructure queries
//!
//! Every failure a tool can hit lands in one of four variants. The display
//! text shown to callers is produced by [`crate::response::translate_failure`].

use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
use std::error::Error as StdError;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InfraError {
    /// Credential, profile or region resolution failed before any service call.
    #[error("could not create AWS session: {0}")]
    SessionCreation(String),

    /// The service received the call and rejected it.
    #[error("{raw}")]
    Service {
        code: Option<String>,
        message: Option<String>,
        raw: String,
    },

    /// Network or client-library fault (dispatch, timeout, unreadable response).
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("{0}")]
    Unknown(String),
}

impl InfraError {
    pub fn session(message: impl Into<String>) -> Self {
        InfraError::SessionCreation(message.into())
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            InfraError::SessionCreation(_) => "session",
            InfraError::Service { .. } => "service",
            InfraError::Transport(_) => "transport",
            InfraError::Unknown(_) => "unknown",
        }
    }
}

// SdkError and ProvideErrorMetadata are shared smithy types re-exported by every
// service crate, so this one impl covers EC2, S3 and RDS alike.
impl<E, R> From<SdkError<E, R>> for InfraError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        let raw = error_chain(&err);
        match &err {
            SdkError::ServiceError(context) => {
                let service_err = context.err();
                InfraError::Service {
                    code: service_err.code().map(str::to_string),
                    message: service_err.message().map(str::to_string),
                    raw,
                }
            }
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) | SdkError::ResponseError(_) => {
                InfraError::Transport(raw)
            }
            _ => InfraError::Unknown(raw),
        }
    }
}

/// Render an error together with its `source()` chain, outermost first.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

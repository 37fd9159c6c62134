//! Fan-out port for ordering changes.

use crate::ordering::domain::OrderedView;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Receives the ordering produced by a completed mutation.
///
/// Delivery is best-effort. Callers log failures and never roll back the
/// mutation that produced the view.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Publishes the final ordering of every touched container.
    async fn publish(&self, view: &OrderedView) -> NotifierResult<()>;
}

/// Errors returned by notifier implementations.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The transport rejected or dropped the message.
    #[error("notification transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

use derive_more::{Display, Error};

use crate::model::site::SiteId;
use crate::model::worker::WorkerId;

/// Failures the presence core can produce. Everything is returned as an
/// explicit value; nothing is retried internally. A conflict means the
/// caller must re-read state and decide again.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CoreError {
    #[display(fmt = "invalid input: {}", reason)]
    InvalidInput { reason: String },

    #[display(fmt = "worker {} already has an open shift", worker_id)]
    ShiftAlreadyOpen { worker_id: WorkerId },

    #[display(fmt = "worker {} has no open shift", worker_id)]
    NoOpenShift { worker_id: WorkerId },

    #[display(fmt = "unknown site {}", site_id)]
    UnknownSite { site_id: SiteId },
}

impl CoreError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

use crate::model::BannerId;

/// Failures of the scoring engine. Both are fatal to the current request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BanditError {
    /// No banner is eligible, nothing to pick from.
    #[error("empty candidate set")]
    EmptyCandidateSet,
    /// A candidate reached ranked scoring without a single recorded view.
    #[error("banner {0} has no recorded views")]
    CandidateWithoutHistory(BannerId),
}

use crate::model::ModelError;
use crate::planner::SearchError;

/// Error from calibration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("invalid calibration config: {0}")]
    InvalidConfig(&'static str),

    #[error("failed to route training sample: {0}")]
    Search(#[from] SearchError),

    #[error("failed to evaluate travel time: {0}")]
    Model(#[from] ModelError),
}

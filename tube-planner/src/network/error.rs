//! Network error types.

/// Errors from building or querying the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// No station matches the given name, even case-insensitively
    #[error("station not found: {0}")]
    StationNotFound(String),

    /// An edge references a raw station id that was never declared
    #[error("edge references unknown station id {0}")]
    UnknownStationId(u32),

    /// Two raw station records share an id
    #[error("duplicate station id {0}")]
    DuplicateStationId(u32),
}

//! Flight loop error types.

/// Errors surfaced by the flight session.
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    /// The frame ran before the drone body was constructed.
    #[error("flight update ran without a drone body (frame {frame})")]
    MissingBody { frame: u64 },
}

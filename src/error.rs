use std::fmt;

// -------------------------------------------------------------------------------------------------

/// Which of the two engines a stream wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Tension analysis (Speedy).
    Analysis,
    /// Time-scale modification (Sonic).
    Transform,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Analysis => f.write_str("Speedy"),
            StreamKind::Transform => f.write_str("Sonic"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Errors raised by the stream wrappers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The engine's factory returned no handle.
    #[error("Failed to create {0} stream: out of memory")]
    StreamAllocation(StreamKind),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(usize),

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    /// An analysis ingestion call got no samples at all.
    #[error("Input array is empty")]
    EmptyInput,

    /// An analysis ingestion call got fewer samples than one input frame.
    #[error("Input array holds {actual} samples, but a frame needs {expected}")]
    ShortFrame { expected: usize, actual: usize },

    /// Not enough frames were added to compute the tension at `at_time`.
    #[error("Insufficient data to compute tension at time {at_time}")]
    InsufficientData { at_time: i64 },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

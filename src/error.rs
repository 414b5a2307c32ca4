//! Error types for tree construction, ray creation and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected BVH build requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BvhError {
    /// The requested range selects no primitives.
    #[error("cannot build a BVH over an empty range {start}..{end}")]
    EmptyRange {
        /// First index of the requested range
        start: usize,
        /// One past the last index of the requested range
        end: usize,
    },

    /// The requested range reaches past the end of the collection.
    #[error("range {start}..{end} is out of bounds for {len} primitives")]
    RangeOutOfBounds {
        /// First index of the requested range
        start: usize,
        /// One past the last index of the requested range
        end: usize,
        /// Number of primitives in the collection
        len: usize,
    },
}

/// Rays that cannot be intersected meaningfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RayError {
    /// Direction is the zero vector.
    #[error("ray direction is the zero vector")]
    DegenerateDirection,

    /// Origin, direction or time contains NaN or an infinity.
    #[error("ray origin, direction or time is not finite")]
    NonFinite,
}

/// Failures while loading the command line configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File that failed to load
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::Config`].
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A value is outside its accepted range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

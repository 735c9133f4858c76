//! Input loading for the indexing pipeline.
//!
//! Covers the two base inputs: WAV audio decoded to mono f64 samples
//! and the optional JSON metadata object.

pub mod audio;
pub mod metadata;

use std::path::PathBuf;

use thiserror::Error;

pub use audio::load_wav;
pub use metadata::load_metadata;

/// Errors that can occur while loading base inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// WAV file could not be opened or decoded.
    #[error("failed to decode WAV '{path}': {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// WAV file declares a channel count the loader cannot mix down.
    #[error("unsupported channel count {channels} in '{path}'")]
    UnsupportedChannels { path: PathBuf, channels: u16 },

    /// Metadata file parsed but is not a JSON object.
    #[error("metadata in '{path}' is not a JSON object")]
    MetadataNotObject { path: PathBuf },

    /// Metadata file is not valid JSON.
    #[error("failed to parse metadata '{path}': {source}")]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for input loading.
pub type LoadResult<T> = Result<T, LoadError>;

//! WAV audio loading.
//!
//! Decodes integer and float WAV files to f64 samples in [-1, 1] and
//! mixes multi-channel audio down to mono by averaging.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::{LoadError, LoadResult};
use crate::models::AudioBuffer;

/// Load a WAV file as a mono audio buffer.
///
/// Integer samples are scaled by the file's bit depth, float samples
/// are taken as-is. Multi-channel files are mixed down by averaging
/// each frame across channels.
pub fn load_wav(path: impl AsRef<Path>) -> LoadResult<AudioBuffer> {
    let path = path.as_ref();

    let mut reader = WavReader::open(path).map_err(|source| LoadError::Wav {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(LoadError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels: 0,
        });
    }

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<hound::Result<_>>()
            .map_err(|source| LoadError::Wav {
                path: path.to_path_buf(),
                source,
            })?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<hound::Result<_>>()
                .map_err(|source| LoadError::Wav {
                    path: path.to_path_buf(),
                    source,
                })?
        }
    };

    let mono = if spec.channels == 1 {
        samples
    } else {
        let channels = spec.channels as usize;
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
            .collect()
    };

    Ok(AudioBuffer::new(mono, spec.sample_rate))
}

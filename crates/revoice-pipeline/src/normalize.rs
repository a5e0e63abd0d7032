//! Coerces a checked model result into [`CanonicalAudio`]

use thiserror::Error;

use crate::invoke::ModelOutput;

/// Interleaved 16-bit PCM frames with their layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalAudio {
    /// `frames * channels` samples, frame-major
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl CanonicalAudio {
    /// Build from interleaved samples
    ///
    /// # Errors
    ///
    /// Fails when the layout is not 1 or 2 channels, the rate is zero, the
    /// buffer is empty or does not hold whole frames.
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Result<Self, NormalizationError> {
        if samples.is_empty() {
            return Err(NormalizationError::Empty);
        }
        if !matches!(channels, 1 | 2) {
            return Err(NormalizationError::Channels(usize::from(channels)));
        }
        if sample_rate == 0 {
            return Err(NormalizationError::SampleRate(0));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(NormalizationError::PartialFrame {
                samples: samples.len(),
                channels,
            });
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// One frame: a sample per channel
    pub fn frame(&self, index: usize) -> Option<&[i16]> {
        let width = usize::from(self.channels);
        self.samples.get(index * width..(index + 1) * width)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("model returned no samples")]
    Empty,

    #[error("expected a 1-D or 2-D sample array, got {0} dimensions")]
    Rank(usize),

    #[error("expected 1 or 2 channels, got {0}")]
    Channels(usize),

    #[error("sample rate {0} is not a positive 32-bit integer")]
    SampleRate(i64),

    #[error("sample {index} is not finite")]
    NonFinite { index: usize },

    #[error("{samples} samples do not divide into {channels}-channel frames")]
    PartialFrame { samples: usize, channels: u16 },
}

/// Apply the shape and content rules to a model result
///
/// Rank-1 arrays are mono. Rank-2 arrays are `frames x channels`.
pub fn normalize(output: &ModelOutput) -> Result<CanonicalAudio, NormalizationError> {
    let samples = &output.samples;

    if samples.is_empty() {
        return Err(NormalizationError::Empty);
    }

    let channels = match samples.shape.as_slice() {
        [_] => 1,
        [_, channels] => *channels,
        other => return Err(NormalizationError::Rank(other.len())),
    };
    let channels = match u16::try_from(channels) {
        Ok(channels @ (1 | 2)) => channels,
        _ => return Err(NormalizationError::Channels(channels)),
    };

    let sample_rate = u32::try_from(output.sample_rate)
        .ok()
        .filter(|rate| *rate > 0)
        .ok_or(NormalizationError::SampleRate(output.sample_rate))?;

    let pcm = samples
        .data
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            if sample.is_finite() {
                Ok(quantize(*sample))
            } else {
                Err(NormalizationError::NonFinite { index })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let audio = CanonicalAudio::new(pcm, channels, sample_rate)?;

    tracing::debug!(
        frames = audio.frames(),
        channels = audio.channels(),
        sample_rate = audio.sample_rate(),
        "normalized model output"
    );

    Ok(audio)
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(sample: f64) -> i16 {
    // Clamped first, so the product always fits
    (sample.clamp(-1.0, 1.0) * f64::from(i16::MAX)).round() as i16
}

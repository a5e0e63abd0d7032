//! PCM WAV serialization of canonical audio

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;

use crate::normalize::{CanonicalAudio, NormalizationError};

pub const WAV_EXTENSION: &str = ".wav";

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error(transparent)]
    Wav(#[from] hound::Error),

    #[error("decoded audio is not canonical: {0}")]
    Layout(#[from] NormalizationError),
}

/// Encode as 16-bit PCM WAV at the audio's own rate and channel count
pub fn encode_wav(audio: &CanonicalAudio) -> Result<Vec<u8>, EncodingError> {
    let spec = WavSpec {
        channels: audio.channels(),
        sample_rate: audio.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + audio.samples().len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in audio.samples() {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Decode a 16-bit PCM WAV buffer
pub fn decode_wav(bytes: &[u8]) -> Result<CanonicalAudio, EncodingError> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(EncodingError::Wav(hound::Error::Unsupported));
    }

    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;

    Ok(CanonicalAudio::new(samples, spec.channels, spec.sample_rate)?)
}

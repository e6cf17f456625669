use std::path::Path;

use anyhow::{Context, Result};
use hound::WavReader;

use crate::convert::TARGET_SAMPLE_RATE;

/// Load a decoded WAV file and return normalized mono audio samples.
///
/// Returns `f32` samples normalized to `[-1.0, 1.0]`, which is what ASR
/// backends expect.
///
/// Format requirements (what [`crate::convert::convert_to_wav`] produces):
/// - Mono (1 channel)
/// - The recognizer's target sample rate
///
/// Enforcing the constraints here keeps the recognizer simple and makes
/// misuse (feeding an unconverted file) fail loudly instead of transcribing
/// garbage.
pub fn load_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to read WAV file '{}'", path.display()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        anyhow::bail!(
            "expected mono WAV (1 channel), got {} channels",
            spec.channels
        );
    }

    if spec.sample_rate != TARGET_SAMPLE_RATE {
        anyhow::bail!(
            "expected {} Hz sample rate, got {} Hz",
            TARGET_SAMPLE_RATE,
            spec.sample_rate
        );
    }

    let mut samples = Vec::with_capacity(reader.len() as usize);
    for sample in reader.samples::<i16>() {
        let pcm = sample?;
        samples.push(pcm as f32 / i16::MAX as f32);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, data: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in data {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_and_normalizes_mono_16k() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        write_wav(&path, TARGET_SAMPLE_RATE, 1, &[0, i16::MAX, -i16::MAX]);

        let samples = load_samples(&path)?;
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 1.0);
        assert_eq!(samples[2], -1.0);
        Ok(())
    }

    #[test]
    fn rejects_stereo_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, TARGET_SAMPLE_RATE, 2, &[0, 0, 1, 1]);

        let err = load_samples(&path).unwrap_err();
        assert!(err.to_string().contains("mono"));
    }

    #[test]
    fn rejects_wrong_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.wav");
        write_wav(&path, 8_000, 1, &[0, 0]);

        let err = load_samples(&path).unwrap_err();
        assert!(err.to_string().contains("sample rate"));
    }
}

//! Audio decoding for the pipeline's front end.
//!
//! Converts a source recording (any container/codec Symphonia can probe) into
//! the WAV file the recognizer expects: mono, 16 kHz, 16-bit PCM, written next
//! to the input (see `decoded_wav_path` for the naming rule).
//!
//! Error handling policy mirrors what works well for batch decoding:
//! - corrupted frames are skipped (common with some codecs)
//! - IO errors mid-stream are treated as end-of-stream
//! - probe/codec failures are fatal and surface as [`Error::Decode`]

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use rubato::{Resampler, SincFixedIn, WindowFunction};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::info;

use crate::error::{Error, Result};

/// The sample rate the recognizer expects (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decode `input` and write a mono 16 kHz WAV beside it.
///
/// Returns the path of the written WAV file. The input file itself is never
/// modified. A missing input is [`Error::InputNotFound`]; any probe, decode,
/// resample, or write failure is [`Error::Decode`] — both abort the pipeline.
pub fn convert_to_wav(input: &Path) -> Result<PathBuf> {
    if !input.exists() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }

    let wav_path = decoded_wav_path(input);

    decode_and_write(input, &wav_path).map_err(|err| Error::Decode(format!("{err:#}")))?;

    info!(
        input = %input.display(),
        output = %wav_path.display(),
        "decoded audio to recognizer format"
    );
    Ok(wav_path)
}

/// Pick the output path for the decoded WAV.
///
/// Normally the input's extension is swapped for `.wav`. When the input is
/// itself a `.wav` file that swap would point back at the source recording —
/// which would get overwritten here and deleted by the pipeline's temp-file
/// guard — so the decoded copy gets a distinct `.decoded.wav` name instead.
fn decoded_wav_path(input: &Path) -> PathBuf {
    let wav_path = input.with_extension("wav");
    if wav_path == input {
        input.with_extension("decoded.wav")
    } else {
        wav_path
    }
}

fn decode_and_write(input: &Path, wav_path: &Path) -> anyhow::Result<()> {
    let (mono, src_rate) = decode_to_mono(input)?;
    let samples = resample_to_target(mono, src_rate)?;
    write_wav(wav_path, &samples)
        .with_context(|| format!("failed to write WAV to '{}'", wav_path.display()))
}

/// Decode the whole input into mono `f32` samples at the source sample rate.
fn decode_to_mono(input: &Path) -> anyhow::Result<(Vec<f32>, u32)> {
    let file = File::open(input)
        .with_context(|| format!("failed to open input file '{}'", input.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // An extension hint can improve probe accuracy for ambiguous containers.
    let mut hint = Hint::new();
    if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let format_opts: FormatOptions = Default::default();
    let metadata_opts: MetadataOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| anyhow!(e))
        .context("failed to probe media stream")?;

    let mut format = probed.format;

    // Track selection policy: first track that looks decodable and has a
    // known sample rate (required for the resampling decision below).
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")?;

    let mut mono: Vec<f32> = Vec::new();
    let mut src_rate: Option<u32> = None;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            // Treat IO errors as end-of-stream.
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("failed reading packet"),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            // Recoverable: corrupted frame, but decoding can continue.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("decoder failure"),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            bail!("decoded audio had zero channels");
        }
        src_rate.get_or_insert(spec.rate);

        let buf = sample_buf
            .get_or_insert_with(|| SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded.clone());

        downmix_into(&mut mono, buf.samples(), channels);
    }

    let src_rate = src_rate.ok_or_else(|| anyhow!("input contained no decodable audio"))?;
    Ok((mono, src_rate))
}

/// Downmix interleaved samples into mono by averaging channels.
///
/// Policy: equal-weight average across channels (simple, predictable).
fn downmix_into(mono: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    if channels == 1 {
        mono.extend_from_slice(interleaved);
        return;
    }

    for frame in interleaved.chunks_exact(channels) {
        mono.push(frame.iter().sum::<f32>() / channels as f32);
    }
}

/// Resample mono samples from `src_rate` to [`TARGET_SAMPLE_RATE`].
///
/// No-op when the source is already at the target rate. The final partial
/// block is zero-padded because rubato expects exact block sizes.
fn resample_to_target(mut mono: Vec<f32>, src_rate: u32) -> anyhow::Result<Vec<f32>> {
    if src_rate == TARGET_SAMPLE_RATE {
        return Ok(mono);
    }

    let block_frames = 2048;
    let mut resampler = SincFixedIn::<f32>::new(
        TARGET_SAMPLE_RATE as f64 / src_rate as f64,
        2.0,
        rubato::SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: rubato::SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        block_frames,
        1, // mono
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let rem = mono.len() % block_frames;
    if rem != 0 {
        mono.resize(mono.len() + (block_frames - rem), 0.0);
    }

    let mut out = Vec::with_capacity(
        (mono.len() as f64 * TARGET_SAMPLE_RATE as f64 / src_rate as f64) as usize,
    );

    for block in mono.chunks(block_frames) {
        let input = vec![block.to_vec()];
        let resampled = resampler
            .process(&input, None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;

        if resampled.len() != 1 {
            bail!("expected mono output from resampler");
        }
        out.extend_from_slice(&resampled[0]);
    }

    Ok(out)
}

/// Write mono 16 kHz samples as 16-bit PCM WAV.
fn write_wav(path: &Path, samples: &[f32]) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(pcm)?;
    }
    writer.finalize()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write a mono WAV fixture with a short ramp signal.
    fn write_fixture(path: &Path, sample_rate: u32, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(((i % 128) * 200) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn missing_input_is_input_not_found() {
        let err = convert_to_wav(Path::new("no/such/file.mp3")).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn converts_a_16k_source_without_resampling() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        // Unknown extension so the output path differs from the input path;
        // Symphonia probes WAV content regardless of the name.
        let input = dir.path().join("clip.rec");
        write_fixture(&input, TARGET_SAMPLE_RATE, 1600);

        let wav = convert_to_wav(&input)?;
        assert_eq!(wav, dir.path().join("clip.wav"));

        let reader = hound::WavReader::open(&wav).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(reader.len(), 1600);
        Ok(())
    }

    #[test]
    fn resamples_when_the_source_rate_differs() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.rec");
        write_fixture(&input, 8_000, 8_000);

        let wav = convert_to_wav(&input)?;

        let reader = hound::WavReader::open(&wav).unwrap();
        assert_eq!(reader.spec().sample_rate, TARGET_SAMPLE_RATE);
        // One second of 8 kHz audio should come out near one second of 16 kHz
        // audio (block padding makes the count inexact).
        let len = reader.len();
        assert!(
            (15_000..=18_000).contains(&len),
            "unexpected resampled length: {len}"
        );
        Ok(())
    }

    #[test]
    fn wav_input_is_decoded_to_a_distinct_path() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_fixture(&input, 8_000, 800);
        let original = std::fs::read(&input).unwrap();

        let wav = convert_to_wav(&input)?;
        assert_eq!(wav, dir.path().join("clip.decoded.wav"));
        assert!(wav.exists());

        // The source recording is untouched.
        assert_eq!(std::fs::read(&input).unwrap(), original);
        Ok(())
    }

    #[test]
    fn unreadable_input_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("noise.bin");
        std::fs::write(&input, b"definitely not audio").unwrap();

        let err = convert_to_wav(&input).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn downmix_averages_channels() {
        let mut mono = Vec::new();
        // Two frames of stereo: (1, 3), (-1, 1) => mono: 2, 0
        downmix_into(&mut mono, &[1.0, 3.0, -1.0, 1.0], 2);
        assert_eq!(mono, vec![2.0, 0.0]);
    }

    #[test]
    fn downmix_single_channel_is_identity() {
        let mut mono = Vec::new();
        downmix_into(&mut mono, &[0.25, -0.5], 1);
        assert_eq!(mono, vec![0.25, -0.5]);
    }
}

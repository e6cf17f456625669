//! Built-in recognizer powered by `whisper-rs` / `whisper.cpp`.
//!
//! Whisper emits sub-word tokens with centisecond timestamps. This module
//! loads a model once, runs inference with token timestamps enabled, and
//! groups tokens back into whole words: a token whose text begins with
//! whitespace starts a new word, anything else extends the current one.
//! The resulting words keep whatever whitespace whisper attached — trimming
//! is batch normalization's job, not ours.

use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::sync::Once;

use anyhow::Context;
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::recognize::Recognizer;
use crate::wav;
use crate::words::RawWord;
use crate::{Error, Result};

/// Recognizer backed by a whisper.cpp model.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    language: Option<String>,
    translate: bool,
}

impl WhisperRecognizer {
    /// Load a whisper.cpp model from disk.
    ///
    /// `language` is an optional hint (e.g. `"en"`); `None` lets whisper
    /// auto-detect. `translate` requests translation to English instead of
    /// verbatim transcription.
    pub fn new(model_path: &str, language: Option<String>, translate: bool) -> Result<Self> {
        // whisper.cpp logs are very noisy; keep stdout/stderr under the
        // caller's control. Safe to call more than once.
        init_whisper_logging();

        if model_path.trim().is_empty() {
            return Err(Error::msg("model path must be provided"));
        }

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model_path, ctx_params)
            .with_context(|| format!("failed to load model from path: {model_path}"))
            .map_err(Error::from)?;

        Ok(Self {
            ctx,
            language,
            translate,
        })
    }

    fn run_full(&self, samples: &[f32]) -> anyhow::Result<WhisperState> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: 5,
            patience: 1.0,
        });

        params.set_n_threads(num_cpus::get() as i32);
        params.set_translate(self.translate);
        params.set_language(self.language.as_deref());
        params.set_no_context(true);
        params.set_single_segment(false);

        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        // Word-level timing needs per-token timestamps.
        params.set_token_timestamps(true);

        let mut state = self
            .ctx
            .create_state()
            .context("failed to create whisper state")?;

        state
            .full(params, samples)
            .context("failed to run whisper full()")?;

        Ok(state)
    }
}

impl Recognizer for WhisperRecognizer {
    fn recognize(&mut self, wav_path: &Path) -> Result<Vec<RawWord>> {
        let samples = wav::load_samples(wav_path)?;
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.run_full(&samples)?;
        Ok(words_from_state(&state)?)
    }
}

/// Collect timed tokens from every segment and group them into words.
fn words_from_state(state: &WhisperState) -> anyhow::Result<Vec<RawWord>> {
    let mut tokens: Vec<(String, f64, f64)> = Vec::new();

    for segment in state.as_iter() {
        let token_count = segment.n_tokens();
        let token_count = usize::try_from(token_count)
            .with_context(|| format!("segment reported negative token count: {token_count}"))?;

        for token_idx in 0..token_count {
            let token = segment
                .get_token(token_idx as i32)
                .context("failed to get token from segment")?;

            let text = token
                .to_str()
                .with_context(|| format!("failed to get token text at index {token_idx}"))?
                .to_owned();

            let data = token.token_data();
            tokens.push((
                text,
                centiseconds_to_seconds(data.t0),
                centiseconds_to_seconds(data.t1),
            ));
        }
    }

    Ok(group_tokens(tokens))
}

/// Group sub-word tokens into whole words.
///
/// A token whose text begins with whitespace starts a new word; any other
/// token extends the current word and pushes its end time out. Whisper
/// special/control tokens (formatted like `[_BEG_]`, `[_TT_50]`) are skipped.
fn group_tokens(tokens: impl IntoIterator<Item = (String, f64, f64)>) -> Vec<RawWord> {
    let mut words: Vec<RawWord> = Vec::new();

    for (text, start, end) in tokens {
        if is_special_token(&text) {
            continue;
        }

        let starts_new_word = text.starts_with(char::is_whitespace) || words.is_empty();
        if starts_new_word {
            words.push(RawWord {
                word: text,
                start,
                end,
            });
        } else if let Some(current) = words.last_mut() {
            current.word.push_str(&text);
            current.end = end;
        }
    }

    words
}

fn is_special_token(text: &str) -> bool {
    text.starts_with("[_") && text.ends_with("]")
}

/// Whisper uses -1 centiseconds for unknown timestamps; clamp to 0 so
/// consumers don't see negative offsets.
fn centiseconds_to_seconds(value: i64) -> f64 {
    if value < 0 { 0.0 } else { value as f64 / 100.0 }
}

/// A no-op log callback used to silence logs emitted by whisper.cpp.
unsafe extern "C" fn whisper_log_callback(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    // Intentionally left empty.
}

/// Ensure whisper logging is configured exactly once for the lifetime of the process.
fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}

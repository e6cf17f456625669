use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use verbatim::pipeline::Pipeline;
use verbatim::whisper::WhisperRecognizer;

#[derive(Parser, Debug)]
#[command(name = "verbatim")]
#[command(about = "Transcribe an audio file into a word store and text/SRT/JSON reports")]
struct Params {
    /// Path to the input audio file.
    input: PathBuf,

    /// Path to the whisper model file (.bin).
    #[arg(short = 'm', long = "model")]
    model_path: String,

    /// Directory the store and reports are written to.
    #[arg(short = 'o', long = "output-dir", default_value = "data/output")]
    output_dir: PathBuf,

    /// Optional language hint (e.g. "en"); omit for auto-detection.
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    /// Translate speech to English instead of transcribing verbatim.
    #[arg(long = "translate", default_value_t = false)]
    translate: bool,
}

fn main() -> ExitCode {
    verbatim::logging::init();
    let params = Params::parse();

    match run(params) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(params: Params) -> anyhow::Result<()> {
    let recognizer =
        WhisperRecognizer::new(&params.model_path, params.language.clone(), params.translate)?;

    let mut pipeline = Pipeline::new(recognizer, &params.output_dir);
    let summary = pipeline.run(&params.input)?;

    println!(
        "transcribed {} words from {}",
        summary.words,
        params.input.display()
    );
    if summary.store_saved {
        println!("saved results to {}", summary.store_path.display());
    } else {
        println!(
            "warning: results were not saved to {}",
            summary.store_path.display()
        );
    }
    for (format, result) in &summary.reports {
        match result {
            Ok(path) => println!("wrote {format} report to {}", path.display()),
            Err(err) => println!("warning: {format} report failed: {err}"),
        }
    }

    Ok(())
}

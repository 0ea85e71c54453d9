//! tictactoe CLI: read the board state from a photograph.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use tictactoe::detect::{load_gray, DetectError};
use tictactoe::{debug, BoardState, DetectConfig, DetectReport};

#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Detect a tic-tac-toe board in an image and print its cells")]
#[command(version)]
struct Cli {
    /// Input image; prompted for on stdin when omitted.
    image: Option<PathBuf>,

    /// JSON detection config (`DetectConfig`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of the run.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write blob_mask.png, lines.png and rectified.png into this directory.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit tracing output as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_log: bool,
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn prompt_image_path() -> Result<PathBuf, DetectError> {
    let mut stdout = io::stdout();
    write!(stdout, "Enter the image name: ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let name = line.trim();
    if name.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no image name given").into());
    }
    Ok(PathBuf::from(name))
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(cli)))]
fn run(cli: &Cli) -> Result<BoardState, DetectError> {
    let config = match &cli.config {
        Some(path) => DetectConfig::load_json(path)?,
        None => DetectConfig::default(),
    };

    let image_path = match (&cli.image, &config.image_path) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => prompt_image_path()?,
    };
    let gray = load_gray(&image_path)?;
    log::info!(
        "loaded {} ({}x{})",
        image_path.display(),
        gray.width(),
        gray.height()
    );

    let detector = config.build_detector();
    let result = detector.detect(&gray);

    if let Some(report_path) = cli.report.clone().or_else(|| config.output_path()) {
        let mut report = DetectReport::new(
            image_path.to_string_lossy(),
            cli.config.as_deref(),
            gray.width(),
            gray.height(),
        );
        match &result {
            Ok(det) => report.set_detection(det),
            Err(err) => report.set_error(err),
        }
        report.write_json(&report_path)?;
        log::info!("report written to {}", report_path.display());
    }

    let detection = result?;
    if let Some(dir) = cli.debug_dir.clone().or_else(|| config.debug_dir()) {
        debug::write_debug_images(Path::new(&dir), &gray, &detection)?;
    }
    Ok(detection.state)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    if let Err(err) = tictactoe::core::init_with_level(level_for(cli.verbose)) {
        eprintln!("warning: logger not installed: {err}");
    }
    #[cfg(feature = "tracing")]
    {
        tictactoe::core::init_tracing(cli.json_log);
        if tracing_log::LogTracer::init().is_err() {
            log::debug!("log records already forwarded to tracing");
        }
        log::set_max_level(level_for(cli.verbose));
    }

    match run(&cli) {
        Ok(state) => {
            println!("{state}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

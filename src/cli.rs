use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Formats: JPEG, PNG (image crate)\n",
    "Target: ",
    std::env::consts::ARCH,
    "-",
    std::env::consts::OS
);

/// Scroll-driven image sequence scrubber
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Directory containing the numbered frame sequence
    #[arg(value_name = "DIR")]
    pub sequence_dir: Option<PathBuf>,

    /// Frame manifest JSON ([{index, filename}]); overrides directory scanning
    #[arg(short = 'm', long = "manifest", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Station table JSON (named frame ranges for the HUD)
    #[arg(short = 's', long = "stations", value_name = "FILE")]
    pub stations: Option<PathBuf>,

    /// Intro auto-play frame rate
    #[arg(long = "fps", value_name = "N", default_value = "24")]
    pub fps: f32,

    /// Last intro frame (auto-play runs 0..=N, scroll takes over after)
    #[arg(long = "intro-end", value_name = "N", default_value = "187")]
    pub intro_end: i32,

    /// Skip the intro entirely (scroll control from the first frame)
    #[arg(long = "no-intro")]
    pub no_intro: bool,

    /// First scroll-controlled frame (default: intro end + 1)
    #[arg(long = "scroll-start", value_name = "N")]
    pub scroll_start: Option<i32>,

    /// Last scroll-controlled frame (default: last catalog frame)
    #[arg(long = "scroll-end", value_name = "N")]
    pub scroll_end: Option<i32>,

    /// Concurrent decodes per preload batch (10-30 useful)
    #[arg(short = 'b', long = "batch-size", value_name = "N", default_value = "20")]
    pub batch_size: usize,

    /// Virtual page length in viewport heights (scroll travel for the full
    /// sequence)
    #[arg(long = "page-screens", value_name = "N", default_value = "8.0")]
    pub page_screens: f32,

    /// Cap scroll frame emissions at N Hz (0 disables throttling)
    #[arg(long = "max-rate", value_name = "HZ", default_value = "30")]
    pub max_rate: f32,

    /// Worker threads for frame decoding (default: 3/4 of cores)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Start in fullscreen mode
    #[arg(short = 'F', long = "fullscreen")]
    pub fullscreen: bool,

    /// Enable debug logging to file (default: scrolla.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

//! Command-line configuration.
//!
//! [`Cli`] is the raw clap surface; [`Config`] is what the rest of the
//! program reads. `source_url` and the four display toggles can also be
//! changed at runtime from the app.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::slideshow::DEFAULT_SWIPE_THRESHOLD;

pub const DEFAULT_SOURCE_URL: &str = "https://wptavern.com/wp-json/wp/v2/posts";

const APP_DIR: &str = "post-slideshow";

#[derive(Parser, Debug)]
#[command(name = "post-slideshow", version)]
#[command(about = "Step through the latest posts of a WordPress site, one slide at a time")]
pub struct Cli {
    /// Posts endpoint to fetch
    #[arg(default_value = DEFAULT_SOURCE_URL)]
    pub url: String,

    /// Number of posts to show
    #[arg(short = 'n', long = "count", default_value_t = NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN))]
    pub count: NonZeroUsize,

    /// Do not advance slides automatically
    #[arg(long = "no-auto-scroll", action = ArgAction::SetFalse)]
    pub auto_scroll: bool,

    /// Seconds between automatic advances
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Hide post titles
    #[arg(long = "no-title", action = ArgAction::SetFalse)]
    pub show_title: bool,

    /// Hide featured images
    #[arg(long = "no-image", action = ArgAction::SetFalse)]
    pub show_image: bool,

    /// Hide publication dates
    #[arg(long = "no-date", action = ArgAction::SetFalse)]
    pub show_date: bool,

    /// Horizontal drag distance (in columns) that counts as a swipe
    #[arg(long, default_value_t = DEFAULT_SWIPE_THRESHOLD, value_parser = parse_threshold)]
    pub swipe_threshold: f64,

    /// Request timeout in seconds (0 disables the timeout)
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Directory for cached posts
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Runtime configuration of the slideshow.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source_url: String,
    /// Fetched sequences are cut down to this many posts.
    pub desired_count: NonZeroUsize,
    pub auto_scroll: bool,
    pub scroll_interval: Duration,
    pub show_title: bool,
    pub show_image: bool,
    pub show_date: bool,
    pub swipe_threshold: f64,
    pub timeout: Option<Duration>,
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            desired_count: NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN),
            auto_scroll: true,
            scroll_interval: Duration::from_secs(5),
            show_title: true,
            show_image: true,
            show_date: true,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            timeout: Some(Duration::from_secs(30)),
            cache_dir: cache_directory(),
        }
    }
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            source_url: cli.url.clone(),
            desired_count: cli.count,
            auto_scroll: cli.auto_scroll,
            scroll_interval: Duration::from_secs(cli.interval.max(1)),
            show_title: cli.show_title,
            show_image: cli.show_image,
            show_date: cli.show_date,
            swipe_threshold: cli.swipe_threshold,
            timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
            cache_dir: cli.cache_dir.clone().unwrap_or_else(cache_directory),
        }
    }
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("`{s}` is not a finite, non-negative distance"))
    }
}

/// Platform cache directory for this program.
pub fn cache_directory() -> PathBuf {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".cache")),
        _ => dirs::cache_dir().unwrap_or_default(),
    };
    base.join(APP_DIR)
}

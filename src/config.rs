// Command-line flags and the analysis parameters derived from them.
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_TOP_N: usize = 15;
pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_HORIZON: usize = 5;
pub const DEFAULT_THRESHOLD: f64 = 1_500_000.0;

/// How timestamps of a series are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimestampOrder {
    /// Plain string comparison. Only chronological for zero-padded, year-first text.
    #[default]
    Lexical,
    /// Parse date and time first; unparseable timestamps sort last.
    Parsed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub top_n: usize,
    pub window: usize,
    pub horizon: usize,
    pub threshold: f64,
    pub order: TimestampOrder,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
            threshold: DEFAULT_THRESHOLD,
            order: TimestampOrder::default(),
        }
    }
}

/// Rank busy places in a crowd-count CSV and forecast congestion.
#[derive(Debug, Parser)]
#[command(name = "crowd_report", version)]
pub struct Cli {
    /// CSV file with `date`, `time`, `place` and `crowd_count (in thousands)` columns.
    pub file: PathBuf,

    /// Place to forecast. Defaults to the busiest place.
    #[arg(short, long)]
    pub place: Option<String>,

    /// Number of places kept in the busiest-places ranking.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Number of most recent observations used for the trend fit.
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Number of future intervals to predict.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,

    /// Crowd count above which a prediction raises the congestion warning.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    #[arg(long, value_enum, default_value_t = TimestampOrder::Lexical)]
    pub order: TimestampOrder,

    /// Choose places from a menu instead of printing a single report.
    #[arg(short, long)]
    pub interactive: bool,

    /// Directory to write `place_ranking.csv`, `place_forecast.csv` and `summary.json` into.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl Cli {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            top_n: self.top_n,
            window: self.window,
            horizon: self.horizon,
            threshold: self.threshold,
            order: self.order,
        }
    }
}

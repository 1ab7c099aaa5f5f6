use std::path::PathBuf;

use clap::Parser;

/// JHU CSSE 美国日报，2021-01-01
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_daily_reports_us/01-01-2021.csv";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Explore a COVID-19 daily report and chart it", long_about = None)]
pub struct Config {
    /// http(s):// or file:// location of the daily report CSV
    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Directory the SVG charts are written to
    #[arg(long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Rows shown by the head/tail preview
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// Divisor applied to Confirmed, Deaths, Recovered and Active
    #[arg(long, default_value_t = 1000.0)]
    pub scale: f64,

    /// Confirmed threshold (after scaling) for the high-cases filter
    #[arg(long, default_value_t = 10_000.0)]
    pub threshold: f64,

    /// Rows in the New_Cases moving-average window
    #[arg(long, default_value_t = 3)]
    pub window: usize,

    /// Skip writing the charts
    #[arg(long)]
    pub no_charts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from([env!("CARGO_PKG_NAME")])
    }
}

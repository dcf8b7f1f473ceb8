use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use campground_scan::{
    CampsiteFilter, DateWindow, PollerConfig, SearchRequest, SourceKind, load_exclusions,
    parse_input_date,
};
use clap::{Parser, ValueEnum};

/// Command line options
#[derive(Parser, Debug)]
#[command(name = "campquest")]
#[command(about = "Find campsites with enough open consecutive nights", long_about = None)]
pub struct Args {
    /// First night of the stay (YYYY-MM-DD)
    #[arg(long, required_unless_present = "search")]
    pub start_date: Option<String>,

    /// Checkout day (YYYY-MM-DD)
    #[arg(long, required_unless_present = "search")]
    pub end_date: Option<String>,

    /// List ReserveCalifornia facility ids for a campground name, then exit
    #[arg(long, value_name = "NAME", conflicts_with_all = ["parks", "stdin", "poll"])]
    pub search: Option<String>,

    /// Minimum number of consecutive nights; defaults to the whole window
    #[arg(long, allow_negative_numbers = true)]
    pub nights: Option<i64>,

    /// Only report these campsites (requires a single park)
    #[arg(long, num_args = 1..)]
    pub campsite_ids: Vec<u64>,

    /// List every open site and date range
    #[arg(long)]
    pub show_campsite_info: bool,

    /// Only consider this campsite type, e.g. "STANDARD NONELECTRIC"
    #[arg(long)]
    pub campsite_type: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json_output: bool,

    /// Only count Saturday and Sunday nights
    #[arg(long)]
    pub weekends_only: bool,

    /// File of site ids to ignore, one per line, `#` comments allowed
    #[arg(long)]
    pub exclusion_file: Option<PathBuf>,

    /// Park ids to check
    #[arg(long, num_args = 1..)]
    pub parks: Vec<u64>,

    /// Read whitespace-separated park ids from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Reservation system to query
    #[arg(long, value_enum, default_value_t = SourceArg::Recreation)]
    pub source: SourceArg,

    /// Send a Pushover notification when a park opens up
    #[arg(long)]
    pub notify: bool,

    /// Keep checking until every park has availability
    #[arg(long)]
    pub poll: bool,

    /// Seconds between polls
    #[arg(long, default_value_t = 60)]
    pub retry_interval: u64,

    /// Verbose logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Reservation system names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// recreation.gov
    Recreation,
    /// ReserveCalifornia
    ReserveCalifornia,
}

impl From<SourceArg> for SourceKind {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Recreation => SourceKind::Recreation,
            SourceArg::ReserveCalifornia => SourceKind::ReserveCalifornia,
        }
    }
}

impl Args {
    /// Turn the options into a validated request. Nothing is fetched here.
    pub fn search_request(&self) -> anyhow::Result<SearchRequest> {
        let (Some(start_date), Some(end_date)) = (&self.start_date, &self.end_date) else {
            bail!("--start-date and --end-date are required to check availability.");
        };
        let window = DateWindow::new(parse_input_date(start_date)?, parse_input_date(end_date)?)?;

        let park_ids = self.park_ids()?;

        let excluded_site_ids = match &self.exclusion_file {
            Some(path) => load_exclusions(path)
                .with_context(|| format!("Could not read exclusion file {}", path.display()))?,
            None => BTreeSet::new(),
        };

        let request = SearchRequest {
            park_ids,
            window,
            nights: self.nights,
            filter: CampsiteFilter {
                campsite_type: self.campsite_type.clone(),
                campsite_ids: self.campsite_ids.iter().map(u64::to_string).collect(),
                excluded_site_ids,
            },
            weekends_only: self.weekends_only,
            source: self.source.into(),
        };

        Ok(request.validated()?)
    }

    /// Poller settings from `--retry-interval`
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            retry_interval: Duration::from_secs(self.retry_interval),
            ..Default::default()
        }
    }

    fn park_ids(&self) -> anyhow::Result<Vec<u64>> {
        if self.stdin && !self.parks.is_empty() {
            bail!("--parks and --stdin cannot be used together.");
        }

        let parks = if self.stdin {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Could not read park ids from stdin")?;
            parse_park_ids(&input)?
        } else {
            self.parks.clone()
        };

        let mut seen = BTreeSet::new();
        Ok(parks.into_iter().filter(|id| seen.insert(*id)).collect())
    }
}

fn parse_park_ids(input: &str) -> anyhow::Result<Vec<u64>> {
    input
        .split_whitespace()
        .map(|id| {
            id.parse()
                .with_context(|| format!("Not a valid park id: '{}'.", id))
        })
        .collect()
}

use chrono::{Datelike, NaiveDate};

use crate::scan_types::NightRange;

/// Every window of exactly `nights` consecutive available nights.
///
/// Dates may arrive unsorted and with duplicates. Windows slide one night at a
/// time inside each run, so a run of length `L` yields `L - nights + 1` ranges,
/// ordered by start date. Each range ends on the checkout day.
pub fn consecutive_nights(available: &[NaiveDate], nights: usize) -> Vec<NightRange> {
    if nights == 0 {
        return Vec::new();
    }

    let mut dates = available.to_vec();
    dates.sort_unstable();
    dates.dedup();

    dates
        .chunk_by(|a, b| b.num_days_from_ce() - a.num_days_from_ce() == 1)
        .filter(|run| run.len() >= nights)
        .flat_map(|run| {
            run.windows(nights).filter_map(|window| {
                let start = *window.first()?;
                let end = window.last()?.succ_opt()?;
                Some(NightRange { start, end })
            })
        })
        .collect()
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::calendar::{DateWindow, candidate_nights};
use crate::compactor::consecutive_nights;
use crate::normalizer::SiteAvailability;
use crate::scan_types::{NightRange, SiteId};

/// Availability of one park against one window
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Evaluation {
    /// Sites with at least one qualifying range
    pub available_count: usize,
    /// Every site key in the normalized availability
    pub total_count: usize,
    /// Qualifying ranges, only for sites that have some
    pub ranges_by_site: BTreeMap<SiteId, Vec<NightRange>>,
}

/// Number of consecutive nights to search for.
///
/// Falls back to `candidate_count` when nothing usable was requested.
pub fn effective_nights(requested: Option<i64>, candidate_count: usize) -> usize {
    match requested {
        Some(nights) if nights > 0 && (nights as u64) <= candidate_count as u64 => nights as usize,
        _ => candidate_count,
    }
}

/// Count the sites that can host a stay of the requested length inside `window`
pub fn evaluate(
    site_availability: &SiteAvailability,
    window: &DateWindow,
    nights: Option<i64>,
    weekends_only: bool,
) -> Evaluation {
    let candidates = candidate_nights(window, weekends_only);
    let nights = effective_nights(nights, candidates.len());
    debug!(
        "Searching {} candidate night(s) for {} consecutive night(s)",
        candidates.len(),
        nights
    );

    let mut evaluation = Evaluation {
        total_count: site_availability.len(),
        ..Default::default()
    };

    for (site_id, dates) in site_availability {
        let eligible: Vec<NaiveDate> = dates
            .iter()
            .copied()
            .filter(|date| candidates.contains(date))
            .collect();
        if eligible.is_empty() {
            continue;
        }

        let ranges = consecutive_nights(&eligible, nights);
        if ranges.is_empty() {
            continue;
        }

        debug!("Site {} has {} qualifying range(s)", site_id, ranges.len());
        evaluation.available_count += 1;
        evaluation.ranges_by_site.insert(site_id.clone(), ranges);
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    fn availability(sites: &[(&str, Vec<NaiveDate>)]) -> SiteAvailability {
        sites
            .iter()
            .map(|(id, dates)| (SiteId::new(*id), dates.clone()))
            .collect()
    }

    #[test]
    fn test_whole_window_when_nights_unset() {
        let sites = availability(&[("18621", vec![date(2022, 6, 22), date(2022, 6, 23)])]);
        let evaluation = evaluate(&sites, &window(date(2022, 6, 22), date(2022, 6, 24)), None, false);

        assert_eq!(evaluation.available_count, 1);
        assert_eq!(evaluation.total_count, 1);
        assert_eq!(
            evaluation.ranges_by_site[&SiteId::new("18621")],
            vec![NightRange {
                start: date(2022, 6, 22),
                end: date(2022, 6, 24)
            }]
        );
    }

    #[test]
    fn test_too_few_nights_for_request() {
        let sites = availability(&[("18621", vec![date(2022, 6, 22), date(2022, 6, 23)])]);
        let evaluation = evaluate(
            &sites,
            &window(date(2022, 6, 22), date(2022, 6, 30)),
            Some(3),
            false,
        );

        assert_eq!(evaluation.available_count, 0);
        assert_eq!(evaluation.total_count, 1);
        assert!(evaluation.ranges_by_site.is_empty());
    }

    #[test]
    fn test_nights_beyond_window_fall_back_to_window_length() {
        assert_eq!(effective_nights(Some(5), 2), 2);
        assert_eq!(effective_nights(Some(0), 4), 4);
        assert_eq!(effective_nights(Some(-1), 4), 4);
        assert_eq!(effective_nights(None, 4), 4);
        assert_eq!(effective_nights(Some(2), 4), 2);
    }

    #[test]
    fn test_dates_outside_window_are_ignored() {
        let sites = availability(&[
            ("1", vec![date(2022, 6, 20), date(2022, 6, 21)]),
            ("2", vec![date(2022, 6, 24)]),
            ("3", vec![]),
        ]);
        let evaluation = evaluate(
            &sites,
            &window(date(2022, 6, 22), date(2022, 6, 24)),
            Some(1),
            false,
        );

        // the checkout day is not a night
        assert_eq!(evaluation.available_count, 0);
        assert_eq!(evaluation.total_count, 3);
        assert!(evaluation.ranges_by_site.is_empty());
    }

    #[test]
    fn test_weekends_only() {
        // Monday 2022-06-20 .. Monday 2022-06-27, every night free
        let all_week: Vec<NaiveDate> = (20..=26).map(|d| date(2022, 6, d)).collect();
        let sites = availability(&[("5", all_week)]);
        let evaluation = evaluate(
            &sites,
            &window(date(2022, 6, 20), date(2022, 6, 27)),
            None,
            true,
        );

        assert_eq!(
            evaluation.ranges_by_site[&SiteId::new("5")],
            vec![NightRange {
                start: date(2022, 6, 25),
                end: date(2022, 6, 27)
            }]
        );
    }

    #[test]
    fn test_counts_and_membership_invariants() {
        let sites = availability(&[
            ("1", vec![date(2022, 7, 1), date(2022, 7, 2), date(2022, 7, 3)]),
            ("2", vec![date(2022, 7, 1), date(2022, 7, 3)]),
            ("3", vec![]),
            ("4", vec![date(2022, 7, 2), date(2022, 7, 3)]),
        ]);
        let w = window(date(2022, 7, 1), date(2022, 7, 5));
        let evaluation = evaluate(&sites, &w, Some(2), false);

        assert!(evaluation.available_count <= evaluation.total_count);
        assert_eq!(evaluation.available_count, evaluation.ranges_by_site.len());
        assert_eq!(
            evaluation.ranges_by_site.keys().map(SiteId::as_str).collect::<Vec<_>>(),
            vec!["1", "4"]
        );
        assert_eq!(evaluation.ranges_by_site[&SiteId::new("1")].len(), 2);

        // same input, same answer
        assert_eq!(evaluate(&sites, &w, Some(2), false), evaluation);
    }
}

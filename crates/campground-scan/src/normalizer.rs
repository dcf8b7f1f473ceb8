use std::collections::BTreeMap;

use chrono::NaiveDate;
use rec_gov::{AvailabilitySlice, CampsiteMonth, RecGovMonth};

use crate::calendar::parse_upstream_date;
use crate::scan_types::{CampsiteFilter, ScanError, SiteId};

/// Status string recreation.gov uses for a bookable night
pub const AVAILABLE_STATUS: &str = "Available";

/// Available nights per site, keyed for every non-excluded site seen upstream
pub type SiteAvailability = BTreeMap<SiteId, Vec<NaiveDate>>;

/// Raw upstream data for one park, tagged by the source it came from
#[derive(Debug, Clone)]
pub enum SourcePayload {
    /// One entry per month fetched from recreation.gov
    Recreation(Vec<RecGovMonth>),
    /// Flattened unit slices from ReserveCalifornia
    ReserveCalifornia(Vec<AvailabilitySlice>),
}

/// Reduce a raw payload to available nights per site.
///
/// Excluded sites never get a key. Other sites always get one, even when no
/// night survives the status, type and allow-list filters. The type filter and
/// allow-list only apply to recreation.gov data.
pub fn normalize(
    payload: &SourcePayload,
    filter: &CampsiteFilter,
) -> Result<SiteAvailability, ScanError> {
    match payload {
        SourcePayload::Recreation(months) => normalize_recreation(months, filter),
        SourcePayload::ReserveCalifornia(slices) => normalize_reserve_california(slices, filter),
    }
}

fn normalize_recreation(
    months: &[RecGovMonth],
    filter: &CampsiteFilter,
) -> Result<SiteAvailability, ScanError> {
    let mut availability = SiteAvailability::new();

    for month in months {
        for (site_id, site) in &month.campsites {
            if filter.excluded_site_ids.contains(site_id) {
                continue;
            }

            let dates = availability.entry(SiteId::new(site_id.as_str())).or_default();
            if !site_passes_filter(site_id, site, filter) {
                continue;
            }

            for (date, status) in &site.availabilities {
                if status == AVAILABLE_STATUS {
                    dates.push(parse_upstream_date(date)?);
                }
            }
        }
    }

    Ok(availability)
}

fn site_passes_filter(site_id: &str, site: &CampsiteMonth, filter: &CampsiteFilter) -> bool {
    if let Some(wanted) = &filter.campsite_type {
        if site.campsite_type.as_deref() != Some(wanted.as_str()) {
            return false;
        }
    }

    if filter.campsite_ids.is_empty() {
        return true;
    }
    let campsite_id = site.campsite_id.as_deref().unwrap_or(site_id);
    filter.campsite_ids.contains(campsite_id)
}

fn normalize_reserve_california(
    slices: &[AvailabilitySlice],
    filter: &CampsiteFilter,
) -> Result<SiteAvailability, ScanError> {
    let mut availability = SiteAvailability::new();

    for slice in slices {
        if filter.excluded_site_ids.contains(&slice.site_key) {
            continue;
        }

        let dates = availability.entry(SiteId::new(slice.site_key.as_str())).or_default();
        if slice.is_free {
            dates.push(slice.date);
        }
    }

    Ok(availability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn site(campsite_type: &str, availabilities: &[(&str, &str)]) -> CampsiteMonth {
        CampsiteMonth {
            availabilities: availabilities
                .iter()
                .map(|(d, s)| (d.to_string(), s.to_string()))
                .collect(),
            campsite_id: None,
            campsite_type: Some(campsite_type.to_string()),
            campsite_loop: None,
        }
    }

    fn month(sites: Vec<(&str, CampsiteMonth)>) -> RecGovMonth {
        RecGovMonth {
            campsites: sites
                .into_iter()
                .map(|(id, site)| (id.to_string(), site))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn sorted(mut dates: Vec<NaiveDate>) -> Vec<NaiveDate> {
        dates.sort();
        dates
    }

    #[test]
    fn test_keeps_only_available_nights() {
        let payload = SourcePayload::Recreation(vec![month(vec![(
            "18621",
            site(
                "STANDARD NONELECTRIC",
                &[
                    ("2022-06-22T00:00:00Z", "Available"),
                    ("2022-06-23T00:00:00Z", "Available"),
                    ("2022-06-24T00:00:00Z", "Reserved"),
                    ("2022-06-25T00:00:00Z", "Not Available"),
                ],
            ),
        )])]);

        let availability = normalize(&payload, &CampsiteFilter::default()).unwrap();
        assert_eq!(
            sorted(availability[&SiteId::new("18621")].clone()),
            vec![date(2022, 6, 22), date(2022, 6, 23)]
        );
    }

    #[test]
    fn test_excluded_site_is_absent() {
        let payload = SourcePayload::Recreation(vec![month(vec![
            ("18621", site("STANDARD", &[("2022-06-22T00:00:00Z", "Available")])),
            ("18622", site("STANDARD", &[("2022-06-22T00:00:00Z", "Available")])),
        ])]);
        let filter = CampsiteFilter {
            excluded_site_ids: ["18621".to_string()].into(),
            ..Default::default()
        };

        let availability = normalize(&payload, &filter).unwrap();
        assert!(!availability.contains_key(&SiteId::new("18621")));
        assert!(availability.contains_key(&SiteId::new("18622")));
    }

    #[test]
    fn test_type_filter_keeps_key_with_no_dates() {
        let payload = SourcePayload::Recreation(vec![month(vec![
            ("1", site("STANDARD NONELECTRIC", &[("2022-06-22T00:00:00Z", "Available")])),
            ("2", site("RV ELECTRIC", &[("2022-06-22T00:00:00Z", "Available")])),
        ])]);
        let filter = CampsiteFilter {
            campsite_type: Some("STANDARD NONELECTRIC".to_string()),
            ..Default::default()
        };

        let availability = normalize(&payload, &filter).unwrap();
        assert_eq!(availability.len(), 2);
        assert_eq!(availability[&SiteId::new("1")], vec![date(2022, 6, 22)]);
        assert!(availability[&SiteId::new("2")].is_empty());
    }

    #[test]
    fn test_allow_list_matches_campsite_id() {
        let mut listed = site("STANDARD", &[("2022-06-22T00:00:00Z", "Available")]);
        listed.campsite_id = Some("333".to_string());
        let mut unlisted = site("STANDARD", &[("2022-06-22T00:00:00Z", "Available")]);
        unlisted.campsite_id = Some("444".to_string());

        let payload = SourcePayload::Recreation(vec![month(vec![("333", listed), ("444", unlisted)])]);
        let filter = CampsiteFilter {
            campsite_ids: ["333".to_string()].into(),
            ..Default::default()
        };

        let availability = normalize(&payload, &filter).unwrap();
        assert_eq!(availability[&SiteId::new("333")].len(), 1);
        assert!(availability[&SiteId::new("444")].is_empty());
    }

    #[test]
    fn test_months_are_merged_per_site() {
        let payload = SourcePayload::Recreation(vec![
            month(vec![("7", site("STANDARD", &[("2022-06-30T00:00:00Z", "Available")]))]),
            month(vec![("7", site("STANDARD", &[("2022-07-01T00:00:00Z", "Available")]))]),
        ]);

        let availability = normalize(&payload, &CampsiteFilter::default()).unwrap();
        assert_eq!(
            availability[&SiteId::new("7")],
            vec![date(2022, 6, 30), date(2022, 7, 1)]
        );
    }

    #[test]
    fn test_unparsable_date_is_an_error() {
        let payload = SourcePayload::Recreation(vec![month(vec![(
            "7",
            site("STANDARD", &[("yesterday", "Available")]),
        )])]);
        assert!(matches!(
            normalize(&payload, &CampsiteFilter::default()),
            Err(ScanError::DataFormat(_))
        ));
    }

    #[test]
    fn test_reserve_california_slices() {
        let slice = |key: &str, day: u32, is_free: bool| AvailabilitySlice {
            site_key: key.to_string(),
            site_name: format!("Site {}", key),
            date: date(2022, 6, day),
            is_free,
        };
        let payload = SourcePayload::ReserveCalifornia(vec![
            slice("101", 22, true),
            slice("101", 23, false),
            slice("102", 22, false),
            slice("103", 22, true),
        ]);
        let filter = CampsiteFilter {
            excluded_site_ids: ["103".to_string()].into(),
            // no effect on this source
            campsite_type: Some("RV".to_string()),
            ..Default::default()
        };

        let availability = normalize(&payload, &filter).unwrap();
        assert_eq!(availability.len(), 2);
        assert_eq!(availability[&SiteId::new("101")], vec![date(2022, 6, 22)]);
        assert!(availability[&SiteId::new("102")].is_empty());
    }
}

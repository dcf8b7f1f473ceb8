use rec_gov::FacilitySummary;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::calendar::{DateWindow, format_display, format_input_date};
use crate::scan_types::{ParkReport, ScanError};

/// Marks a park with availability
pub const SUCCESS_GLYPH: &str = "✅";
/// Marks a park without availability
pub const FAILURE_GLYPH: &str = "❌";

/// Render reports as text.
///
/// Returns the text and whether any park has availability.
pub fn generate_human_output(
    reports: &[ParkReport],
    window: &DateWindow,
    show_campsite_info: bool,
) -> (String, bool) {
    let has_availabilities = reports.iter().any(|r| r.result.available_count > 0);

    let mut out = vec![if has_availabilities {
        format!(
            "There are campsites available from {} to {} 😊",
            format_input_date(window.start()),
            format_input_date(window.end())
        )
    } else {
        "There are no campsites available 😢".to_string()
    }];

    for report in reports {
        push_park_lines(&mut out, report, show_campsite_info);
    }

    (out.join("\n"), has_availabilities)
}

fn push_park_lines(out: &mut Vec<String>, report: &ParkReport, show_campsite_info: bool) {
    let result = &report.result;
    let glyph = if result.available_count > 0 {
        SUCCESS_GLYPH
    } else {
        FAILURE_GLYPH
    };

    out.push(format!(
        "{} {} ({}): {} site(s) available out of {} site(s)",
        glyph, result.display_name, report.park_id, result.available_count, result.total_count
    ));

    if !show_campsite_info {
        return;
    }
    for (site_id, ranges) in &result.ranges_by_site {
        out.push(format!(
            "  * Site {} is available on the following dates:",
            site_id
        ));
        for range in ranges {
            out.push(format!(
                "    * {} -> {}",
                format_display(range.start),
                format_display(range.end)
            ));
        }
    }
}

struct AvailableParks<'a>(&'a [ParkReport]);

impl Serialize for AvailableParks<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for report in self.0.iter().filter(|r| r.result.available_count > 0) {
            map.serialize_entry(&report.park_id, &report.result.ranges_by_site)?;
        }
        map.end()
    }
}

/// Render reports as a JSON object keyed by park id, in query order.
///
/// Parks without availability are left out.
pub fn generate_json_output(reports: &[ParkReport]) -> Result<(String, bool), ScanError> {
    let has_availabilities = reports.iter().any(|r| r.result.available_count > 0);
    let document = serde_json::to_string(&AvailableParks(reports))?;
    Ok((document, has_availabilities))
}

/// Push message announcing a park that just opened up
pub fn notification_message(report: &ParkReport, window: &DateWindow) -> String {
    let mut out = vec![format!(
        "Campsites open between {} and {}:",
        format_input_date(window.start()),
        format_input_date(window.end())
    )];
    push_park_lines(&mut out, report, true);
    out.join("\n")
}

/// One `name: id` line per ReserveCalifornia facility, ready for `--source reserve-california --parks`
pub fn format_facilities(query: &str, facilities: &[FacilitySummary]) -> String {
    let mut out = vec![format!("Facilities matching '{}':", query)];
    out.extend(
        facilities
            .iter()
            .map(|f| format!("  * {}: {}", f.campground, f.facility_id)),
    );
    out.join("\n")
}

use super::record::{present, InspectionRecord};

const FALLBACK_PLATE: &str = "New";

/// Strips every character that is not an ASCII letter or digit.
pub fn sanitize_plate(plate: &str) -> String {
    plate.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Download name for a record's report: `Inspection_Report_<plate>_<D-M-YYYY>.pdf`.
pub fn report_filename(record: &InspectionRecord) -> String {
    let plate = present(&record.customer.license_plate)
        .map(sanitize_plate)
        .filter(|plate| !plate.is_empty())
        .unwrap_or_else(|| FALLBACK_PLATE.to_string());
    let date = record.date.format("%-d-%-m-%Y");

    format!("Inspection_Report_{plate}_{date}.pdf")
}

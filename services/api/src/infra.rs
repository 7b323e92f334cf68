use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use vehicle_inspection::inspection::{ReportComposer, ReportLanguage};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) composer: Arc<ReportComposer>,
}

/// Strict counterpart of `ReportLanguage::from_str` for command-line input.
pub(crate) fn parse_language(raw: &str) -> Result<ReportLanguage, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "en" | "english" => Ok(ReportLanguage::English),
        "id" | "id-id" | "indonesian" | "bahasa" => Ok(ReportLanguage::Indonesian),
        other => Err(format!("unsupported report language '{other}' (expected en or id)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_rejects_unknown_codes() {
        assert_eq!(parse_language("ID"), Ok(ReportLanguage::Indonesian));
        assert_eq!(parse_language("english"), Ok(ReportLanguage::English));
        let err = parse_language("fr").expect_err("fr is not supported");
        assert!(err.contains("'fr'"));
    }
}

use crate::infra::parse_language;
use clap::Args;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use vehicle_inspection::config::AppConfig;
use vehicle_inspection::error::AppError;
use vehicle_inspection::inspection::{
    report_filename, ComposeSummary, InspectionRecord, ReportComposer, ReportLanguage,
};

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Inspection record exported from the dashboard (JSON)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination PDF. Defaults to the derived report filename in the working directory.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Label language (en or id). Defaults to APP_REPORT_LANGUAGE.
    #[arg(long, value_parser = parse_language)]
    pub(crate) language: Option<ReportLanguage>,
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let RenderArgs {
        input,
        output,
        language,
    } = args;

    let language = match language {
        Some(language) => language,
        None => AppConfig::load()?.report.language,
    };

    let record = read_record(&input)?;
    let output = output.unwrap_or_else(|| PathBuf::from(report_filename(&record)));

    let composer = ReportComposer::for_language(language);
    let mut sink = BufWriter::new(File::create(&output)?);
    let summary = composer.compose_to(&record, &mut sink)?;

    print_summary(&record, &output, &summary);
    Ok(())
}

fn read_record(path: &Path) -> Result<InspectionRecord, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn print_summary(record: &InspectionRecord, output: &Path, summary: &ComposeSummary) {
    println!("Inspection report written to {}", output.display());
    println!(
        "  {} checklist item(s), {} page(s), {} byte(s)",
        record.inspection_items.len(),
        summary.page_count,
        summary.bytes_written
    );

    if summary.diagnostics.is_empty() {
        println!("  all images rendered");
        return;
    }

    println!("  {} image(s) could not be rendered:", summary.diagnostics.len());
    for diagnostic in &summary.diagnostics {
        println!("    - {diagnostic}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("inspection-api-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn render_writes_pdf_to_requested_path() {
        let dir = scratch_dir("render");
        let input = dir.join("record.json");
        let output = dir.join("report.pdf");
        fs::write(
            &input,
            r#"{
                "date": "2026-10-16T08:30:00Z",
                "customer": { "licensePlate": "B 9 ZZ" },
                "inspection": {
                    "Lights": { "status": "F", "notes": "Left indicator dim" }
                },
                "agreed": false
            }"#,
        )
        .expect("write record");

        run_render(RenderArgs {
            input,
            output: Some(output.clone()),
            language: Some(ReportLanguage::English),
        })
        .expect("render succeeds");

        let bytes = fs::read(&output).expect("read report");
        assert!(bytes.starts_with(b"%PDF-"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn render_reports_invalid_json() {
        let dir = scratch_dir("invalid");
        let input = dir.join("record.json");
        fs::write(&input, "{ \"inspection\": [] }").expect("write record");

        let err = run_render(RenderArgs {
            input,
            output: Some(dir.join("never.pdf")),
            language: Some(ReportLanguage::English),
        })
        .expect_err("record is invalid");

        assert!(matches!(err, AppError::InvalidRecord(_)));
        fs::remove_dir_all(dir).ok();
    }
}

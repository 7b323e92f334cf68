use super::image::decode_payload;
use super::labels::{ReportLabels, ReportLanguage};
use super::layout::{DocumentInfo, DocumentWriter, ImageBox, PageGeometry, TextStyle};
use super::record::{present, ChecklistEntry, InspectionRecord, PhotoAttachment};
use std::io::Write;
use thiserror::Error;
use tracing::{info, warn};

/// Box reserved for each checklist photo.
pub const PHOTO_BOX: ImageBox = ImageBox {
    width: 250.0,
    height: 150.0,
};

/// Box reserved for the customer signature.
pub const SIGNATURE_BOX: ImageBox = ImageBox {
    width: 200.0,
    height: 100.0,
};

const DETAIL_INDENT: f32 = 14.0;
const ITEM_SPACING: f32 = 6.0;
const SECTION_SPACING: f32 = 12.0;

/// Fatal composition failure. Per-image problems never surface here; they
/// are rendered inline and listed in [`ComposedReport::diagnostics`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode content of page {page}: {source}")]
    EncodePage {
        page: usize,
        #[source]
        source: lopdf::Error,
    },
    #[error("failed to finalize PDF document: {0}")]
    Finalize(String),
    #[error("failed to write PDF output: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeSummary {
    pub page_count: usize,
    pub bytes_written: usize,
    pub diagnostics: Vec<String>,
}

/// Lays an [`InspectionRecord`] out as a paginated PDF.
///
/// Composition is a single synchronous pass with no state shared between
/// calls; the same record always produces the same bytes.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    labels: ReportLabels,
    geometry: PageGeometry,
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new(ReportLabels::english())
    }
}

impl ReportComposer {
    pub fn new(labels: ReportLabels) -> Self {
        Self {
            labels,
            geometry: PageGeometry::a4(),
        }
    }

    pub fn for_language(language: ReportLanguage) -> Self {
        Self::new(language.labels())
    }

    pub fn compose(&self, record: &InspectionRecord) -> Result<ComposedReport, RenderError> {
        let mut session = Session {
            labels: &self.labels,
            writer: DocumentWriter::new(self.geometry),
            diagnostics: Vec::new(),
        };

        session.title_block(record);
        session.customer_section(record);
        session.checklist_section(record);
        session.agreement_section(record);

        let Session {
            writer,
            diagnostics,
            ..
        } = session;
        let page_count = writer.page_count();
        let info = self.document_info(record);
        let bytes = writer.finish(&info, |page, total| self.labels.page_footer(page, total))?;

        info!(
            pages = page_count,
            items = record.inspection_items.len(),
            photos = record.inspection_items.photo_count(),
            diagnostics = diagnostics.len(),
            bytes = bytes.len(),
            "composed inspection report"
        );

        Ok(ComposedReport {
            bytes,
            page_count,
            diagnostics,
        })
    }

    /// Composes into `sink`. The sink is flushed on success and a flush is
    /// still attempted when composition or writing fails.
    pub fn compose_to<W: Write>(
        &self,
        record: &InspectionRecord,
        sink: &mut W,
    ) -> Result<ComposeSummary, RenderError> {
        let written = self.compose(record).and_then(|report| {
            sink.write_all(&report.bytes)?;
            sink.flush()?;
            Ok(report)
        });

        match written {
            Ok(report) => Ok(ComposeSummary {
                page_count: report.page_count,
                bytes_written: report.bytes.len(),
                diagnostics: report.diagnostics,
            }),
            Err(err) => {
                if let Err(flush_err) = sink.flush() {
                    warn!(error = %flush_err, "flushing sink after failed composition");
                }
                Err(err)
            }
        }
    }

    fn document_info(&self, record: &InspectionRecord) -> DocumentInfo {
        let title = match present(&record.customer.license_plate) {
            Some(plate) => format!("{} - {plate}", self.labels.title),
            None => self.labels.title.to_string(),
        };

        DocumentInfo {
            title,
            producer: concat!("vehicle-inspection ", env!("CARGO_PKG_VERSION")).to_string(),
            creation_date: record.date.format("D:%Y%m%d%H%M%SZ").to_string(),
        }
    }
}

struct Session<'a> {
    labels: &'a ReportLabels,
    writer: DocumentWriter,
    diagnostics: Vec<String>,
}

impl Session<'_> {
    fn title_block(&mut self, record: &InspectionRecord) {
        self.writer.write_centered(self.labels.title, TextStyle::TITLE);
        let date = record.date.format("%d-%m-%Y %H:%M UTC");
        self.writer
            .write_centered(&format!("{}: {date}", self.labels.date), TextStyle::NOTE);
        self.writer.move_down(SECTION_SPACING);
    }

    fn customer_section(&mut self, record: &InspectionRecord) {
        let labels = self.labels;
        let customer = &record.customer;
        self.section(labels.customer_section);

        let name = customer.full_name();
        let rows = [
            (labels.location, present(&customer.location)),
            (labels.customer_name, name.as_deref()),
            (labels.phone, present(&customer.phone)),
            (labels.car_brand, present(&customer.car_brand)),
            (labels.car_model, present(&customer.car_model)),
            (labels.color, present(&customer.color)),
            (labels.license_plate, present(&customer.license_plate)),
        ];

        for (label, value) in rows {
            let value = value.unwrap_or(labels.not_available);
            self.writer
                .write_text(&format!("{label}: {value}"), TextStyle::BODY, 0.0);
        }
        self.writer.move_down(SECTION_SPACING);
    }

    fn checklist_section(&mut self, record: &InspectionRecord) {
        let labels = self.labels;
        self.section(labels.checklist_section);

        if record.inspection_items.is_empty() {
            self.writer
                .write_text(labels.no_checklist_items, TextStyle::NOTE, 0.0);
        }

        for (name, entry) in record.inspection_items.iter() {
            self.checklist_entry(name, entry);
        }
        self.writer.move_down(SECTION_SPACING);
    }

    fn checklist_entry(&mut self, name: &str, entry: &ChecklistEntry) {
        let labels = self.labels;

        // Keep the item name on the same page as its status line.
        self.writer
            .ensure_space(TextStyle::ITEM.line_height() + TextStyle::BODY.line_height());
        self.writer.write_text(name, TextStyle::ITEM, 0.0);

        let status = format!(
            "{}: {} ({})",
            labels.status,
            labels.status_label(entry.status),
            entry.status.code()
        );
        self.writer.write_text(&status, TextStyle::BODY, DETAIL_INDENT);

        let notes = entry.notes().unwrap_or(labels.no_notes);
        self.writer.write_text(
            &format!("{}: {notes}", labels.notes),
            TextStyle::NOTE,
            DETAIL_INDENT,
        );

        if let Some(photo) = &entry.photo {
            self.photo(name, photo);
        }
        self.writer.move_down(ITEM_SPACING);
    }

    fn photo(&mut self, item: &str, photo: &PhotoAttachment) {
        let labels = self.labels;
        let caption = match photo.name.trim() {
            "" => labels.photo.to_string(),
            file_name => format!("{}: {file_name}", labels.photo),
        };
        // Caption and image share a page.
        self.writer
            .ensure_space(TextStyle::NOTE.line_height() + PHOTO_BOX.height);
        self.writer.write_text(&caption, TextStyle::NOTE, DETAIL_INDENT);

        let placed = decode_payload(&photo.data_url)
            .map_err(|err| err.to_string())
            .and_then(|image| {
                self.writer
                    .place_image(&image, PHOTO_BOX)
                    .map_err(|err| err.to_string())
            });

        if let Err(reason) = placed {
            warn!(item, photo = %photo.name, %reason, "photo replaced by diagnostic line");
            self.diagnostic(labels.photo_unavailable, item, &reason);
        }
    }

    fn agreement_section(&mut self, record: &InspectionRecord) {
        let labels = self.labels;
        self.section(labels.agreement_section);
        self.writer.write_text(
            &format!("{}: {}", labels.agreement, labels.answer(record.agreed)),
            TextStyle::BODY,
            0.0,
        );
        self.writer.move_down(ITEM_SPACING);

        let Some(signature) = record.signature_image() else {
            self.writer
                .write_text(labels.no_signature, TextStyle::NOTE, 0.0);
            return;
        };

        self.writer
            .ensure_space(TextStyle::ITEM.line_height() + SIGNATURE_BOX.height);
        self.writer
            .write_text(&format!("{}:", labels.signature), TextStyle::ITEM, 0.0);

        let placed = decode_payload(signature)
            .map_err(|err| err.to_string())
            .and_then(|image| {
                self.writer
                    .place_image(&image, SIGNATURE_BOX)
                    .map_err(|err| err.to_string())
            });

        if let Err(reason) = placed {
            warn!(%reason, "signature replaced by diagnostic line");
            self.diagnostic(labels.signature_unavailable, labels.signature, &reason);
        }
    }

    fn section(&mut self, header: &str) {
        self.writer.ensure_space(
            TextStyle::SECTION.line_height() * 1.4 + TextStyle::BODY.line_height(),
        );
        self.writer.write_text(header, TextStyle::SECTION, 0.0);
        self.writer.rule();
        self.writer
            .set_running_header(Some(self.labels.continued_header(header)));
    }

    fn diagnostic(&mut self, message: &str, subject: &str, reason: &str) {
        self.writer.write_text(
            &format!("[{message}: {reason}]"),
            TextStyle::DIAGNOSTIC,
            DETAIL_INDENT,
        );
        self.diagnostics.push(format!("{subject}: {reason}"));
    }
}

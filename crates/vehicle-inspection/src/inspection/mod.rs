mod compose;
mod filename;
pub mod image;
pub mod labels;
pub mod layout;
pub mod record;

pub use compose::{
    ComposeSummary, ComposedReport, RenderError, ReportComposer, PHOTO_BOX, SIGNATURE_BOX,
};
pub use filename::{report_filename, sanitize_plate};
pub use labels::{ReportLabels, ReportLanguage};
pub use record::{
    ChecklistEntry, ChecklistItems, CustomerInfo, InspectionRecord, InspectionStatus,
    PhotoAttachment,
};

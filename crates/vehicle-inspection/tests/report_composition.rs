use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::content::Content;
use lopdf::{Document, Object};
use std::io::Cursor;
use vehicle_inspection::inspection::{
    report_filename, ChecklistEntry, CustomerInfo, InspectionRecord, InspectionStatus,
    ReportComposer, ReportLanguage,
};

fn inspection_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0)
        .single()
        .expect("valid inspection date")
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        location: Some("Jakarta Selatan".to_string()),
        first_name: Some("Siti".to_string()),
        last_name: Some("Rahma".to_string()),
        phone: Some("+62 812 0000 1111".to_string()),
        car_brand: Some("Toyota".to_string()),
        car_model: Some("Avanza".to_string()),
        color: None,
        license_plate: Some("AB-123!".to_string()),
    }
}

fn png_data_url(width: u32, height: u32) -> String {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([30, 90, 160, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode test photo");
    format!("data:image/png;base64,{}", STANDARD.encode(&buf))
}

fn record_with_photos(count: usize) -> InspectionRecord {
    let mut record = InspectionRecord::new(inspection_date(), customer());
    let photo = png_data_url(500, 300);
    for index in 0..count {
        record.inspection_items.insert(
            format!("Panel {index}"),
            ChecklistEntry::new(InspectionStatus::Fair)
                .with_notes("Light scratches")
                .with_photo(format!("panel-{index}.png"), photo.clone()),
        );
    }
    record
}

/// Text drawn on each page, in drawing order.
fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).expect("output parses as PDF");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("page content");
            Content::decode(&content)
                .expect("content stream decodes")
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(text, _)) => {
                        Some(text.iter().map(|byte| char::from(*byte)).collect())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn all_text(bytes: &[u8]) -> Vec<String> {
    page_texts(bytes).into_iter().flatten().collect()
}

fn images_per_page(bytes: &[u8]) -> Vec<usize> {
    let doc = Document::load_mem(bytes).expect("output parses as PDF");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("page content");
            Content::decode(&content)
                .expect("content stream decodes")
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .count()
        })
        .collect()
}

fn placed_images(bytes: &[u8]) -> usize {
    images_per_page(bytes).into_iter().sum()
}

#[test]
fn empty_checklist_still_renders_title_and_customer_sections() {
    let record = InspectionRecord::new(inspection_date(), CustomerInfo::default());
    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");

    let text = all_text(&report.bytes);
    assert_eq!(report.page_count, 1);
    assert!(text.iter().any(|line| line == "Vehicle Inspection Report"));
    assert!(text.iter().any(|line| line == "Customer & Vehicle"));
    assert!(text.iter().any(|line| line == "Location: N/A"));
    assert!(text.iter().any(|line| line == "Customer Name: N/A"));
    assert!(text.iter().any(|line| line == "No inspection items recorded."));
    assert!(text.iter().any(|line| line == "Page 1 of 1"));
}

#[test]
fn customer_fields_render_with_placeholder_for_gaps() {
    let record = InspectionRecord::new(inspection_date(), customer());
    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");

    let text = all_text(&report.bytes);
    assert!(text.iter().any(|line| line == "Customer Name: Siti Rahma"));
    assert!(text.iter().any(|line| line == "Color: N/A"));
    assert!(text.iter().any(|line| line == "License Plate: AB-123!"));
    assert!(text
        .iter()
        .any(|line| line == "Inspection Date: 16-10-2026 08:30 UTC"));
}

#[test]
fn page_count_grows_monotonically_with_photos() {
    let composer = ReportComposer::default();
    let mut previous = 0;

    for count in 0..=8 {
        let report = composer
            .compose(&record_with_photos(count))
            .expect("report composes");
        assert!(
            report.page_count >= previous,
            "{count} photos produced {} pages after {previous}",
            report.page_count
        );
        assert_eq!(placed_images(&report.bytes), count);
        assert!(report.diagnostics.is_empty());
        previous = report.page_count;
    }

    assert!(previous > 1, "eight photos cannot fit on a single page");
}

#[test]
fn captions_stay_on_the_page_of_their_image() {
    let composer = ReportComposer::default();

    for count in 1..=11 {
        let mut record = record_with_photos(count);
        record.agreed = true;
        record.signature = Some(png_data_url(400, 200));

        let report = composer.compose(&record).expect("report composes");
        let texts = page_texts(&report.bytes);
        let images = images_per_page(&report.bytes);
        assert_eq!(texts.len(), images.len());

        for (index, (lines, placed)) in texts.iter().zip(&images).enumerate() {
            let captions = lines
                .iter()
                .filter(|line| line.starts_with("Photo: ") || *line == "Customer Signature:")
                .count();
            assert_eq!(
                captions,
                *placed,
                "{count} photos: page {} has {captions} captions and {placed} images: {lines:?}",
                index + 1
            );
        }
    }
}

#[test]
fn continued_pages_repeat_the_checklist_header() {
    let report = ReportComposer::default()
        .compose(&record_with_photos(8))
        .expect("report composes");

    let pages = page_texts(&report.bytes);
    assert!(pages.len() > 1);
    for page in &pages[1..] {
        assert!(
            page.iter().any(|line| line.ends_with("(continued)")),
            "continued page lacks a running header: {page:?}"
        );
    }
    let total = pages.len();
    assert!(pages[total - 1]
        .iter()
        .any(|line| *line == format!("Page {total} of {total}")));
}

#[test]
fn malformed_photo_does_not_stop_later_entries() {
    let mut record = InspectionRecord::new(inspection_date(), customer());
    let photo = png_data_url(40, 40);
    record.inspection_items.insert(
        "Paint",
        ChecklistEntry::new(InspectionStatus::Good).with_photo("paint.png", photo.clone()),
    );
    record.inspection_items.insert(
        "Windshield",
        ChecklistEntry::new(InspectionStatus::Poor)
            .with_photo("crack.png", "data:image/png;base64,this-is-not-an-image"),
    );
    record.inspection_items.insert(
        "Mirrors",
        ChecklistEntry::new(InspectionStatus::Fair)
            .with_notes("Left mirror loose")
            .with_photo("mirror.png", photo),
    );

    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");

    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].starts_with("Windshield:"));
    assert_eq!(placed_images(&report.bytes), 2);

    let text = all_text(&report.bytes);
    assert!(text
        .iter()
        .any(|line| line.starts_with("[Photo could not be rendered:")));
    assert!(text.iter().any(|line| line == "Mirrors"));
    assert!(text.iter().any(|line| line == "Notes: Left mirror loose"));
}

#[test]
fn checklist_follows_insertion_order() {
    let mut record = InspectionRecord::new(inspection_date(), customer());
    for name in ["Wheels", "Paint", "Tires", "Antenna"] {
        record
            .inspection_items
            .insert(name, ChecklistEntry::new(InspectionStatus::Good));
    }

    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");
    let text = all_text(&report.bytes);
    let position = |name: &str| {
        text.iter()
            .position(|line| line == name)
            .unwrap_or_else(|| panic!("{name} missing from report"))
    };

    assert!(position("Wheels") < position("Paint"));
    assert!(position("Paint") < position("Tires"));
    assert!(position("Tires") < position("Antenna"));
    assert!(text.iter().any(|line| line == "Status: Good (G)"));
    assert!(text.iter().any(|line| line == "Notes: No notes"));
}

#[test]
fn declined_agreement_renders_no_without_signature() {
    let mut record = InspectionRecord::new(inspection_date(), customer());
    record.agreed = false;
    record.signature = Some(String::new());

    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");

    let text = all_text(&report.bytes);
    assert!(text
        .iter()
        .any(|line| line == "Customer agrees to the inspection results: No"));
    assert!(text.iter().any(|line| line == "No signature provided"));
    assert!(report.diagnostics.is_empty());
    assert_eq!(placed_images(&report.bytes), 0);
}

#[test]
fn signature_is_placed_after_the_agreement_line() {
    let mut record = record_with_photos(3);
    record.agreed = true;
    record.signature = Some(png_data_url(400, 200));

    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");

    let text = all_text(&report.bytes);
    assert!(text
        .iter()
        .any(|line| line == "Customer agrees to the inspection results: Yes"));
    assert!(text.iter().any(|line| line == "Customer Signature:"));
    assert_eq!(placed_images(&report.bytes), 4);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn malformed_signature_degrades_to_a_diagnostic_line() {
    let mut record = InspectionRecord::new(inspection_date(), customer());
    record.agreed = true;
    record.signature = Some("data:image/png;base64,".to_string());

    let report = ReportComposer::default()
        .compose(&record)
        .expect("report composes");

    assert_eq!(report.diagnostics, vec!["Customer Signature: image payload is empty"]);
    let text = all_text(&report.bytes);
    assert!(text.iter().any(|line| {
        line == "[Signature could not be rendered: image payload is empty]"
    }));
}

#[test]
fn composition_is_deterministic() {
    let mut record = record_with_photos(2);
    record.signature = Some(png_data_url(120, 60));
    let composer = ReportComposer::default();

    let first = composer.compose(&record).expect("first run");
    let second = composer.compose(&record).expect("second run");

    assert_eq!(page_texts(&first.bytes), page_texts(&second.bytes));
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn indonesian_labels_replace_every_literal() {
    let record = InspectionRecord::new(inspection_date(), CustomerInfo::default());
    let report = ReportComposer::for_language(ReportLanguage::Indonesian)
        .compose(&record)
        .expect("report composes");

    let text = all_text(&report.bytes);
    assert!(text.iter().any(|line| line == "Laporan Inspeksi Kendaraan"));
    assert!(text.iter().any(|line| line == "Lokasi: Tidak Tersedia"));
    assert!(text
        .iter()
        .any(|line| line == "Pelanggan menyetujui hasil inspeksi: Tidak"));
    assert!(text.iter().any(|line| line == "Halaman 1 dari 1"));
}

#[test]
fn filename_token_strips_plate_punctuation() {
    let record = InspectionRecord::new(inspection_date(), customer());
    assert_eq!(
        report_filename(&record),
        "Inspection_Report_AB123_16-10-2026.pdf"
    );
}

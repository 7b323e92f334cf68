use super::record::InspectionStatus;
use serde::{Deserialize, Serialize};

/// Language of the literal strings printed into a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLanguage {
    #[default]
    English,
    Indonesian,
}

impl ReportLanguage {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" | "indonesian" | "bahasa" => Self::Indonesian,
            _ => Self::English,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Indonesian => "id",
        }
    }

    pub fn labels(self) -> ReportLabels {
        match self {
            Self::English => ReportLabels::english(),
            Self::Indonesian => ReportLabels::indonesian(),
        }
    }
}

/// Every literal the composer writes into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLabels {
    pub title: &'static str,
    pub date: &'static str,
    pub customer_section: &'static str,
    pub location: &'static str,
    pub customer_name: &'static str,
    pub phone: &'static str,
    pub car_brand: &'static str,
    pub car_model: &'static str,
    pub color: &'static str,
    pub license_plate: &'static str,
    pub checklist_section: &'static str,
    pub no_checklist_items: &'static str,
    pub continued: &'static str,
    pub status: &'static str,
    pub good: &'static str,
    pub fair: &'static str,
    pub poor: &'static str,
    pub notes: &'static str,
    pub no_notes: &'static str,
    pub photo: &'static str,
    pub photo_unavailable: &'static str,
    pub agreement_section: &'static str,
    pub agreement: &'static str,
    pub yes: &'static str,
    pub no: &'static str,
    pub signature: &'static str,
    pub signature_unavailable: &'static str,
    pub no_signature: &'static str,
    pub page: &'static str,
    pub of: &'static str,
    pub not_available: &'static str,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self::english()
    }
}

impl ReportLabels {
    pub const fn english() -> Self {
        Self {
            title: "Vehicle Inspection Report",
            date: "Inspection Date",
            customer_section: "Customer & Vehicle",
            location: "Location",
            customer_name: "Customer Name",
            phone: "Phone Number",
            car_brand: "Car Brand",
            car_model: "Car Model",
            color: "Color",
            license_plate: "License Plate",
            checklist_section: "Inspection Checklist",
            no_checklist_items: "No inspection items recorded.",
            continued: "(continued)",
            status: "Status",
            good: "Good",
            fair: "Fair",
            poor: "Poor",
            notes: "Notes",
            no_notes: "No notes",
            photo: "Photo",
            photo_unavailable: "Photo could not be rendered",
            agreement_section: "Agreement",
            agreement: "Customer agrees to the inspection results",
            yes: "Yes",
            no: "No",
            signature: "Customer Signature",
            signature_unavailable: "Signature could not be rendered",
            no_signature: "No signature provided",
            page: "Page",
            of: "of",
            not_available: "N/A",
        }
    }

    pub const fn indonesian() -> Self {
        Self {
            title: "Laporan Inspeksi Kendaraan",
            date: "Tanggal Inspeksi",
            customer_section: "Pelanggan & Kendaraan",
            location: "Lokasi",
            customer_name: "Nama Pelanggan",
            phone: "Nomor Telepon",
            car_brand: "Merek Mobil",
            car_model: "Model Mobil",
            color: "Warna",
            license_plate: "Plat Nomor",
            checklist_section: "Daftar Periksa Inspeksi",
            no_checklist_items: "Tidak ada item inspeksi.",
            continued: "(lanjutan)",
            status: "Status",
            good: "Baik",
            fair: "Cukup",
            poor: "Buruk",
            notes: "Catatan",
            no_notes: "Tidak ada catatan",
            photo: "Foto",
            photo_unavailable: "Foto tidak dapat ditampilkan",
            agreement_section: "Persetujuan",
            agreement: "Pelanggan menyetujui hasil inspeksi",
            yes: "Ya",
            no: "Tidak",
            signature: "Tanda Tangan Pelanggan",
            signature_unavailable: "Tanda tangan tidak dapat ditampilkan",
            no_signature: "Tidak ada tanda tangan",
            page: "Halaman",
            of: "dari",
            not_available: "Tidak Tersedia",
        }
    }

    pub const fn status_label(&self, status: InspectionStatus) -> &'static str {
        match status {
            InspectionStatus::Good => self.good,
            InspectionStatus::Fair => self.fair,
            InspectionStatus::Poor => self.poor,
        }
    }

    pub const fn answer(&self, agreed: bool) -> &'static str {
        if agreed {
            self.yes
        } else {
            self.no
        }
    }

    pub fn continued_header(&self, header: &str) -> String {
        format!("{header} {}", self.continued)
    }

    pub fn page_footer(&self, page: usize, total: usize) -> String {
        format!("{} {page} {} {total}", self.page, self.of)
    }
}

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Condition code recorded for a single checkpoint.
///
/// Serialized as its one-letter code; parsing also accepts the full word,
/// both ignoring ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InspectionStatus {
    #[serde(rename = "G")]
    Good,
    #[serde(rename = "F")]
    Fair,
    #[serde(rename = "P")]
    Poor,
}

const STATUS_SPELLINGS: &[&str] = &["G", "F", "P", "good", "fair", "poor"];

impl InspectionStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Good => "G",
            Self::Fair => "F",
            Self::Poor => "P",
        }
    }

    const fn word(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [Self::Good, Self::Fair, Self::Poor].into_iter().find(|status| {
            value.eq_ignore_ascii_case(status.code()) || value.eq_ignore_ascii_case(status.word())
        })
    }
}

impl<'de> Deserialize<'de> for InspectionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| de::Error::unknown_variant(&raw, STATUS_SPELLINGS))
    }
}

/// Browsers send `null` for untouched text inputs; read it as empty.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Customer and vehicle details captured on the first step of the intake form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub location: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub color: Option<String>,
    pub license_plate: Option<String>,
}

impl CustomerInfo {
    /// Full name, or `None` when neither part carries any text.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(present)
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Returns the trimmed field value, treating blank strings as absent.
pub fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// An uploaded photo as the browser encoded it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoAttachment {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub status: InspectionStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default, rename = "file")]
    pub photo: Option<PhotoAttachment>,
}

impl ChecklistEntry {
    pub fn new(status: InspectionStatus) -> Self {
        Self {
            status,
            notes: String::new(),
            photo: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_photo(mut self, name: impl Into<String>, data_url: impl Into<String>) -> Self {
        self.photo = Some(PhotoAttachment {
            name: name.into(),
            data_url: data_url.into(),
        });
        self
    }

    pub fn notes(&self) -> Option<&str> {
        let trimmed = self.notes.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Checkpoints in the order the inspector filled them in.
///
/// Serialized as a JSON object; key order is preserved on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItems(Vec<(String, ChecklistEntry)>);

impl ChecklistItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. A repeated name replaces the earlier entry in place.
    pub fn insert(&mut self, name: impl Into<String>, entry: ChecklistEntry) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = entry,
            None => self.0.push((name, entry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ChecklistEntry> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChecklistEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn photo_count(&self) -> usize {
        self.0
            .iter()
            .filter(|(_, entry)| entry.photo.is_some())
            .count()
    }
}

impl<N: Into<String>> FromIterator<(N, ChecklistEntry)> for ChecklistItems {
    fn from_iter<T: IntoIterator<Item = (N, ChecklistEntry)>>(iter: T) -> Self {
        let mut items = Self::new();
        for (name, entry) in iter {
            items.insert(name, entry);
        }
        items
    }
}

impl Serialize for ChecklistItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entry) in &self.0 {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChecklistItems {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChecklistVisitor;

        impl<'de> Visitor<'de> for ChecklistVisitor {
            type Value = ChecklistItems;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping inspection item names to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut items = ChecklistItems::new();
                while let Some((name, entry)) = access.next_entry::<String, ChecklistEntry>()? {
                    items.insert(name, entry);
                }
                Ok(items)
            }
        }

        deserializer.deserialize_map(ChecklistVisitor)
    }
}

/// Everything submitted by the intake form for one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default, rename = "inspection", alias = "inspectionItems")]
    pub inspection_items: ChecklistItems,
    #[serde(default)]
    pub agreed: bool,
    #[serde(default, alias = "signatureImage")]
    pub signature: Option<String>,
}

impl InspectionRecord {
    pub fn new(date: DateTime<Utc>, customer: CustomerInfo) -> Self {
        Self {
            date,
            customer,
            inspection_items: ChecklistItems::new(),
            agreed: false,
            signature: None,
        }
    }

    /// The signature payload, ignoring the empty string a cleared pad submits.
    pub fn signature_image(&self) -> Option<&str> {
        self.signature
            .as_deref()
            .filter(|payload| !payload.trim().is_empty())
    }
}

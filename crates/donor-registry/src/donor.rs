//! Core donor types for the registry.
//!
//! A [`Donor`] is serialized with the field names used by the backing file and
//! the HTTP API (`Name`, `Phone_Number`, ...), so the same type is read from
//! disk, written back, and returned to clients.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Availability value assigned to new donors when none is supplied.
pub const DEFAULT_AVAILABILITY: &str = "Available";

/// Normalized form of [`DEFAULT_AVAILABILITY`] used for comparisons.
const AVAILABLE_KEY: &str = "AVAILABLE";

/// Unique, monotonically assigned donor identifier.
///
/// Serialized as a JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DonorId(u64);

impl DonorId {
    /// Wrap a raw id value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse an id from client-supplied text, ignoring surrounding whitespace.
    ///
    /// Returns `None` for anything that is not a non-negative integer.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok().map(Self)
    }

    /// The id that follows this one, or `None` once the id space is used up.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<DonorId> for u64 {
    fn from(id: DonorId) -> Self {
        id.0
    }
}

/// The `id` of a stored record, exactly as the data file holds it.
///
/// Hand-edited files may quote ids, leave them out, or hold values that are
/// not ids at all. Numbers and numeric strings become [`RecordId::Valid`];
/// anything else is written back untouched and never matches a lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RecordId {
    /// A usable donor id.
    Valid(DonorId),
    /// A value that is not a non-negative integer.
    Invalid(Value),
    /// No `id` field at all.
    #[default]
    Missing,
}

impl RecordId {
    /// Classify a raw JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let parsed = match &value {
            Value::Number(n) => n.as_u64().map(DonorId::new),
            Value::String(s) => DonorId::parse(s),
            _ => None,
        };
        parsed.map_or(Self::Invalid(value), Self::Valid)
    }

    /// The donor id, if this record has a usable one.
    #[must_use]
    pub fn donor_id(&self) -> Option<DonorId> {
        match self {
            Self::Valid(id) => Some(*id),
            Self::Invalid(_) | Self::Missing => None,
        }
    }

    /// Whether the record has no `id` field.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<DonorId> for RecordId {
    fn from(id: DonorId) -> Self {
        Self::Valid(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(id) => fmt::Display::fmt(id, f),
            Self::Invalid(value) => f.pad(&value.to_string()),
            Self::Missing => f.pad("-"),
        }
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid(id) => id.serialize(serializer),
            Self::Invalid(value) => value.serialize(serializer),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Read a text field, accepting numbers and booleans in their JSON form.
///
/// `null` reads as an empty string.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A single donor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    /// Registry-assigned identifier.
    #[serde(default, skip_serializing_if = "RecordId::is_missing")]
    pub id: RecordId,

    /// Donor's full name.
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Contact phone number.
    #[serde(rename = "Phone_Number", default, deserialize_with = "lenient_string")]
    pub phone_number: String,

    /// Blood group, stored uppercase (e.g. `AB-`).
    #[serde(rename = "Blood_Group", default, deserialize_with = "lenient_string")]
    pub blood_group: String,

    /// Availability, stored capitalized (e.g. `Available`).
    #[serde(rename = "Availability_Status", default, deserialize_with = "lenient_string")]
    pub availability_status: String,

    /// Free-form address or city.
    #[serde(rename = "Address", default, deserialize_with = "lenient_string")]
    pub address: String,

    /// Fields present in the data file that the registry does not model.
    /// Kept so a load/save cycle never drops data.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Donor {
    /// Whether this donor is currently available to donate.
    ///
    /// Compares the trimmed, uppercased status, so `available` and
    /// ` AVAILABLE ` both count.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability_status.trim().to_uppercase() == AVAILABLE_KEY
    }

    /// Whether this donor's blood group equals an already-normalized group.
    #[must_use]
    pub fn has_blood_group(&self, normalized: &str) -> bool {
        normalize_blood_group(&self.blood_group) == normalized
    }

    /// Case-insensitive substring match on the donor's name.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// Trim and uppercase a blood group.
#[must_use]
pub fn normalize_blood_group(group: &str) -> String {
    group.trim().to_uppercase()
}

/// Capitalize a status value: first character uppercase, the rest lowercase.
///
/// `"UNAVAILABLE"` becomes `"Unavailable"`, `"on leave"` becomes `"On leave"`.
#[must_use]
pub fn capitalize(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

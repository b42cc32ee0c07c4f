//! Request shapes accepted by the registry and their validation.
//!
//! Payloads arrive with every field optional. Validation trims values,
//! reports all missing required fields at once, and produces a normalized
//! command the registry can apply without further checks.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::donor::{capitalize, normalize_blood_group, Donor, DonorId, DEFAULT_AVAILABILITY};
use crate::error::{Error, Result};

/// Body of a donor registration, as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationRequest {
    /// Required.
    #[serde(rename = "Name")]
    pub name: Option<String>,
    /// Required.
    #[serde(rename = "Phone_Number")]
    pub phone_number: Option<String>,
    /// Required.
    #[serde(rename = "Blood_Group")]
    pub blood_group: Option<String>,
    /// Preferred source for the stored address.
    #[serde(rename = "Address")]
    pub address: Option<String>,
    /// Used as the address when `Address` is absent or blank.
    #[serde(rename = "City")]
    pub city: Option<String>,
    /// Defaults to `Available`.
    #[serde(rename = "Availability_Status")]
    pub availability_status: Option<String>,
}

/// A validated registration, ready to become a [`Donor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    phone_number: String,
    blood_group: String,
    availability_status: String,
    address: String,
}

impl RegistrationRequest {
    /// Check required fields and normalize the rest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming every required field that is
    /// absent or blank.
    pub fn validate(self) -> Result<Registration> {
        let name = present(self.name);
        let phone_number = present(self.phone_number);
        let blood_group = present(self.blood_group);

        let missing: Vec<&'static str> = [
            ("Name", name.is_none()),
            ("Phone_Number", phone_number.is_none()),
            ("Blood_Group", blood_group.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        let (Some(name), Some(phone_number), Some(blood_group)) = (name, phone_number, blood_group)
        else {
            return Err(Error::missing_fields(missing));
        };

        let address = present(self.address)
            .or_else(|| present(self.city))
            .unwrap_or_default();
        let availability_status = present(self.availability_status)
            .map_or_else(|| DEFAULT_AVAILABILITY.to_string(), |s| capitalize(&s));

        Ok(Registration {
            name,
            phone_number,
            blood_group: normalize_blood_group(&blood_group),
            availability_status,
            address,
        })
    }
}

impl Registration {
    /// Build the stored record under the given id.
    #[must_use]
    pub fn into_donor(self, id: DonorId) -> Donor {
        Donor {
            id: id.into(),
            name: self.name,
            phone_number: self.phone_number,
            blood_group: self.blood_group,
            availability_status: self.availability_status,
            address: self.address,
            extra: Map::new(),
        }
    }
}

/// Body of a status update, as sent by a client.
///
/// `id` may be a JSON number or a string holding one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusUpdateRequest {
    /// Target donor id.
    pub id: Option<Value>,
    /// New availability status, any text.
    pub new_status: Option<String>,
}

/// A validated status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// The donor to update.
    pub target: DonorRef,
    /// Capitalized status to store.
    pub new_status: String,
}

impl StatusUpdateRequest {
    /// Check that both fields are present and normalize them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `id` or `new_status` is absent or blank.
    pub fn validate(self) -> Result<StatusUpdate> {
        let target = self.id.as_ref().and_then(DonorRef::from_json);
        let new_status = present(self.new_status);

        match (target, new_status) {
            (Some(target), Some(status)) => Ok(StatusUpdate {
                target,
                new_status: capitalize(&status),
            }),
            (target, status) => {
                let mut missing = Vec::new();
                if target.is_none() {
                    missing.push("id");
                }
                if status.is_none() {
                    missing.push("new_status");
                }
                Err(Error::missing_fields(missing))
            }
        }
    }
}

/// A donor id exactly as a client sent it, with its parsed value.
///
/// Text that is not a non-negative integer has no parsed value and never
/// matches a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorRef {
    raw: String,
    id: Option<DonorId>,
}

impl DonorRef {
    /// Interpret client-supplied id text.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let raw = text.trim().to_string();
        let id = DonorId::parse(&raw);
        Self { raw, id }
    }

    /// Interpret a JSON id value. `null` and blank strings count as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(Self::from_text(s)),
            Value::Number(n) => Some(Self {
                raw: n.to_string(),
                id: n.as_u64().map(DonorId::new),
            }),
            other => Some(Self {
                raw: other.to_string(),
                id: None,
            }),
        }
    }

    /// The parsed id, if the text was a valid id.
    #[must_use]
    pub fn id(&self) -> Option<DonorId> {
        self.id
    }

    /// The id text as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Trim a value, treating blank as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

//! Search and update workflows over the donor store.
//!
//! [`Registry`] owns a [`DonorStore`] and is the only thing that mutates it.
//! Every mutation is saved before the operation reports success.

mod request;

pub use request::{
    DonorRef, Registration, RegistrationRequest, StatusUpdate, StatusUpdateRequest,
};

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::donor::{normalize_blood_group, Donor};
use crate::error::{Error, Result};
use crate::storage::DonorStore;

/// Filters for a donor search. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    /// Exact blood group; also restricts results to available donors.
    pub blood_group: Option<String>,
    /// Case-insensitive substring of the donor's name.
    pub name: Option<String>,
}

impl SearchQuery {
    /// Search by blood group only.
    #[must_use]
    pub fn blood_group(group: impl Into<String>) -> Self {
        Self {
            blood_group: Some(group.into()),
            name: None,
        }
    }

    /// Search by name only.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            blood_group: None,
            name: Some(name.into()),
        }
    }

    /// Whether no filter is set, i.e. the query lists every donor.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        non_blank(self.blood_group.as_deref()).is_none()
            && non_blank(self.name.as_deref()).is_none()
    }
}

/// The donor registry service.
#[derive(Debug)]
pub struct Registry {
    store: DonorStore,
}

impl Registry {
    /// Wrap an already-loaded store.
    #[must_use]
    pub fn new(store: DonorStore) -> Self {
        Self { store }
    }

    /// Load the store from `path` and wrap it.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(DonorStore::load(path))
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &DonorStore {
        &self.store
    }

    /// Number of registered donors.
    #[must_use]
    pub fn donor_count(&self) -> usize {
        self.store.len()
    }

    /// Find donors matching `query`, in collection order.
    ///
    /// With no filters every donor is returned, available or not. A blood
    /// group filter matches the normalized group exactly and only returns
    /// available donors. A name filter is a case-insensitive substring
    /// match. Both filters combine with AND.
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<&Donor> {
        let group = non_blank(query.blood_group.as_deref()).map(normalize_blood_group);
        let name = non_blank(query.name.as_deref()).map(|n| n.trim().to_lowercase());

        self.store
            .donors()
            .iter()
            .filter(|donor| {
                group
                    .as_deref()
                    .is_none_or(|g| donor.has_blood_group(g) && donor.is_available())
            })
            .filter(|donor| name.as_deref().is_none_or(|n| donor.name_contains(n)))
            .collect()
    }

    /// Register a new donor and persist the collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if required fields are missing,
    /// [`Error::IdsExhausted`] if no id is left, or a persistence error if
    /// saving fails. On a save failure the donor stays in memory.
    pub fn register(&mut self, request: RegistrationRequest) -> Result<Donor> {
        let registration = request.validate()?;
        let donor = registration.into_donor(self.store.next_id()?);

        self.store.append(donor.clone());
        self.store.save()?;

        info!(
            "Registered donor {} ({}, {})",
            donor.id, donor.name, donor.blood_group
        );
        Ok(donor)
    }

    /// Overwrite a donor's availability status and persist the collection.
    ///
    /// Applying the same update twice leaves the same state as applying it
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field is missing,
    /// [`Error::NotFound`] if no donor has the id, or a persistence error if
    /// saving fails.
    pub fn update_status(&mut self, request: StatusUpdateRequest) -> Result<Donor> {
        let StatusUpdate { target, new_status } = request.validate()?;

        let donor = target
            .id()
            .and_then(|id| self.store.find_by_id_mut(id))
            .ok_or_else(|| Error::not_found(target.as_str()))?;
        donor.availability_status = new_status;
        let updated = donor.clone();

        self.store.save()?;

        info!(
            "Updated donor {} status to {}",
            updated.id, updated.availability_status
        );
        Ok(updated)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

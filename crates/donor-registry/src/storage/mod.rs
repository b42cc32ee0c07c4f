//! Record store for the donor registry.
//!
//! The store owns the authoritative in-memory collection and mirrors it to a
//! single JSON data file. The whole collection is read once when the store is
//! loaded and rewritten in full by [`DonorStore::save`].

pub mod format;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::donor::{Donor, DonorId};
use crate::error::{Error, LoadWarning, Result};

/// In-memory donor collection backed by a JSON file.
///
/// Records keep their insertion order and are never removed.
#[derive(Debug, Clone)]
pub struct DonorStore {
    /// Path to the backing data file.
    path: PathBuf,
    /// All donors, in file order.
    donors: Vec<Donor>,
    /// The file on disk could not be decoded and must be moved aside before
    /// it is overwritten.
    set_aside_original: bool,
}

impl DonorStore {
    /// Create an empty store that will save to `path`.
    #[must_use]
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            donors: Vec::new(),
            set_aside_original: false,
        }
    }

    /// Load the store from `path`, falling back to an empty collection.
    ///
    /// A missing, unreadable, or malformed file is logged as a warning and
    /// never fails startup. A malformed file is kept: the first save moves it
    /// to a timestamped `.bak` sibling instead of overwriting it.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(store) => store,
            Err(warning) => {
                warn!("{warning}");
                let mut store = Self::empty(path);
                store.set_aside_original = matches!(warning, LoadWarning::Malformed { .. });
                store
            }
        }
    }

    /// Load the store from `path`, reporting why it could not be read.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadWarning`] if the file is missing, unreadable, or not a
    /// JSON array of donors.
    pub fn try_load(path: impl AsRef<Path>) -> std::result::Result<Self, LoadWarning> {
        let path = path.as_ref().to_path_buf();

        debug!("Loading donor data from {}", path.display());
        let content = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadWarning::Missing { path: path.clone() }
            } else {
                LoadWarning::Unreadable {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let donors = format::decode(&content).map_err(|source| LoadWarning::Malformed {
            path: path.clone(),
            source,
        })?;

        info!(
            "Loaded {} donor records from {}",
            donors.len(),
            path.display()
        );
        let unusable = donors.iter().filter(|d| d.id.donor_id().is_none()).count();
        if unusable > 0 {
            warn!(
                "{unusable} donor records in {} have no usable id and cannot be updated",
                path.display()
            );
        }

        Ok(Self {
            path,
            donors,
            set_aside_original: false,
        })
    }

    /// Write the full collection to the backing file, replacing it.
    ///
    /// The in-memory collection is left as is whether or not the write
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the parent directory cannot be
    /// created, [`Error::Persistence`] if the file cannot be written or an
    /// undecodable original cannot be moved aside, or [`Error::Serialize`] if
    /// the collection cannot be encoded.
    pub fn save(&mut self) -> Result<()> {
        let bytes = format::encode(&self.donors)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| {
                    error!("Failed to create directory {}: {source}", parent.display());
                    Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        if self.set_aside_original {
            self.move_original_aside()?;
        }

        format::write_atomic(&self.path, &bytes)
            .map_err(|source| self.persistence_error(source))?;

        debug!(
            "Saved {} donor records to {}",
            self.donors.len(),
            self.path.display()
        );
        Ok(())
    }

    fn move_original_aside(&mut self) -> Result<()> {
        let backup = format::backup_path(&self.path);
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!(
                "Moved undecodable {} to {}",
                self.path.display(),
                backup.display()
            ),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(self.persistence_error(source)),
        }
        self.set_aside_original = false;
        Ok(())
    }

    fn persistence_error(&self, source: io::Error) -> Error {
        error!("Failed to save donor data to {}: {source}", self.path.display());
        Error::Persistence {
            path: self.path.clone(),
            source,
        }
    }

    /// The id the next created donor should receive.
    ///
    /// One greater than the largest usable id in the store, or 1 if there is
    /// none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdsExhausted`] if the largest id is `u64::MAX`.
    pub fn next_id(&self) -> Result<DonorId> {
        let last = self
            .donors
            .iter()
            .filter_map(|d| d.id.donor_id())
            .max()
            .unwrap_or(DonorId::new(0));
        last.checked_next().ok_or(Error::IdsExhausted { last })
    }

    /// Add a donor to the end of the collection.
    ///
    /// Does not persist; call [`DonorStore::save`] afterwards.
    pub fn append(&mut self, donor: Donor) {
        self.donors.push(donor);
    }

    /// Find a donor by id. Records without a usable id never match.
    #[must_use]
    pub fn find_by_id(&self, id: DonorId) -> Option<&Donor> {
        self.donors.iter().find(|d| d.id.donor_id() == Some(id))
    }

    /// Find a donor by id for modification.
    pub fn find_by_id_mut(&mut self, id: DonorId) -> Option<&mut Donor> {
        self.donors
            .iter_mut()
            .find(|d| d.id.donor_id() == Some(id))
    }

    /// All donors, in collection order.
    #[must_use]
    pub fn donors(&self) -> &[Donor] {
        &self.donors
    }

    /// Number of donors in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.donors.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.donors.is_empty()
    }

    /// Path to the backing data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Summary counts for status reporting.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_donors: self.donors.len(),
            available_donors: self.donors.iter().filter(|d| d.is_available()).count(),
            data_file_bytes: fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        }
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of donors.
    pub total_donors: usize,
    /// Donors whose status is available.
    pub available_donors: usize,
    /// Size of the data file in bytes (0 if it does not exist yet).
    pub data_file_bytes: u64,
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use uuid::Uuid;
use crate::core::PropertyLinker;
use crate::models::{Listing, SharedProperty};

/// Errors that can occur with ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger lock poisoned: {0}")]
    Poisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for LedgerError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        LedgerError::Poisoned(err.to_string())
    }
}

type Record = Arc<Mutex<SharedProperty>>;

/// Records by address key, plus the order keys were first created in
#[derive(Default)]
struct Index {
    order: Vec<String>,
    by_key: HashMap<String, Record>,
}

/// In-memory store of canonical properties
///
/// Each record sits behind its own mutex, so listings for different
/// addresses are ingested in parallel while the merge-then-reclassify
/// sequence for one address is serialized.
pub struct PropertyLedger {
    linker: PropertyLinker,
    records: RwLock<Index>,
}

impl PropertyLedger {
    pub fn new(linker: PropertyLinker) -> Self {
        Self {
            linker,
            records: RwLock::new(Index::default()),
        }
    }

    /// Fold a listing into its record and return the record's new state
    pub fn ingest(&self, listing: &Listing) -> Result<SharedProperty, LedgerError> {
        let key = self.linker.address_key(listing);

        let existing = {
            let index = self.records.read()?;
            let found = self.lookup(&index, &key, listing)?;
            found
        };

        let record = match existing {
            Some(record) => record,
            None => {
                let mut index = self.records.write()?;
                // Another writer may have created a matching record since the read
                let rechecked = self.lookup(&index, &key, listing)?;
                match rechecked {
                    Some(record) => record,
                    None => {
                        let created = self.linker.link(None, listing);
                        index.order.push(key.clone());
                        index.by_key.insert(key, Arc::new(Mutex::new(created.clone())));
                        return Ok(created);
                    }
                }
            }
        };

        let mut property = record.lock()?;
        let updated = self.linker.link(Some(&*property), listing);
        *property = updated.clone();

        Ok(updated)
    }

    /// Record for `key`, else the first-created record the listing matches
    fn lookup(&self, index: &Index, key: &str, listing: &Listing) -> Result<Option<Record>, LedgerError> {
        if let Some(record) = index.by_key.get(key) {
            return Ok(Some(record.clone()));
        }

        // Different key spelling, same property (e.g. a listing id match)
        for candidate in index.order.iter().filter_map(|k| index.by_key.get(k)) {
            let property = candidate.lock()?;
            if self.linker.matches(listing, &property) {
                return Ok(Some(candidate.clone()));
            }
        }

        Ok(None)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<SharedProperty>, LedgerError> {
        let index = self.records.read()?;
        for record in index.by_key.values() {
            let property = record.lock()?;
            if property.id == *id {
                return Ok(Some(property.clone()));
            }
        }
        Ok(None)
    }

    /// Snapshot of every record, in creation order
    pub fn snapshot(&self) -> Result<Vec<SharedProperty>, LedgerError> {
        let index = self.records.read()?;
        let mut properties = Vec::with_capacity(index.order.len());
        for record in index.order.iter().filter_map(|k| index.by_key.get(k)) {
            properties.push(record.lock()?.clone());
        }

        Ok(properties)
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.records.read()?.order.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}

impl Default for PropertyLedger {
    fn default() -> Self {
        Self::new(PropertyLinker::default())
    }
}

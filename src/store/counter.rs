//! Persisted monotonic sequences, used to hand out report and feedback ids.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::store::{StoreError, replace_file, temp_sibling};

pub const COUNTERS_FILE: &str = "counters.toml";

pub struct Counters {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Counters {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(COUNTERS_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Advances the sequence `name` and returns its new value.
    ///
    /// `floor` is the number of rows already present in the owning table; the
    /// sequence never hands out a value at or below it, so a lost or stale
    /// counter file cannot cause ids to be reused.
    pub fn next(&self, name: &str, floor: usize) -> Result<u64, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut counters = self.read();
        let current = counters
            .get(name)
            .copied()
            .unwrap_or(0)
            .max(floor as u64);
        let next = current + 1;
        counters.insert(name.to_string(), next);

        let tmp = temp_sibling(&self.path);
        fs::write(&tmp, toml::to_string(&counters)?).map_err(|source| {
            StoreError::Io {
                path: tmp.clone(),
                source,
            }
        })?;
        replace_file(&tmp, &self.path)?;

        Ok(next)
    }

    fn read(&self) -> BTreeMap<String, u64> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return BTreeMap::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "counter file unreadable, reseeding");
                return BTreeMap::new();
            }
        };

        toml::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "counter file malformed, reseeding");
            BTreeMap::new()
        })
    }
}

/// Formats a sequence value as an id such as `R0001`.
pub fn format_id(prefix: char, seq: u64) -> String {
    format!("{prefix}{seq:04}")
}

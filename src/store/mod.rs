//! Flat-file storage.
//!
//! Every entity lives in its own CSV table with a fixed header row. A
//! [`Table`] is always read and rewritten as a whole; callers never touch the
//! files directly, they go through [`Table::load`] and [`Table::modify`]. Each
//! table carries its own lock which is held for the complete
//! read-modify-write cycle, and writes land in a temporary sibling file which
//! is renamed over the table once it is complete.

use std::{
    fs,
    io,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    auth::accounts::{Citizen, Contractor},
    feedback::Rating,
    reports::Report,
    tenders::Tender,
};

pub mod counter;
pub mod seed;

pub use counter::Counters;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("could not encode counters: {0}")]
    Counter(#[from] toml::ser::Error),
    #[error("could not hash seed password: {0}")]
    Seed(String),
}

/// A row type which is persisted in its own table file.
///
/// Rows are (de)serialized by column name, so a table whose file is missing a
/// column reads that column as its default (an empty string).
pub trait Record: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    const HEADERS: &'static [&'static str];
}

pub struct Table<R> {
    path: PathBuf,
    lock: Mutex<()>,
    _row: PhantomData<fn() -> R>,
}

impl<R: Record> Table<R> {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(R::FILE_NAME),
            lock: Mutex::new(()),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads every row of the table. An unreadable table reads as empty.
    pub fn load(&self) -> Vec<R> {
        let _guard = self.guard();
        self.read_rows()
    }

    /// Replaces the full contents of the table.
    pub fn replace_all(&self, rows: &[R]) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.write_rows(rows)
    }

    /// Runs `f` over the current rows while holding the table lock. The rows
    /// are written back only if `f` succeeds.
    ///
    /// Unlike [`Table::load`], this refuses to run over a table it cannot
    /// read completely, since the rewrite would drop the unreadable rows.
    pub fn modify<T, E>(
        &self,
        f: impl FnOnce(&mut Vec<R>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.guard();
        let mut rows = self.read_rows_strict()?;
        let ret = f(&mut rows)?;
        self.write_rows(&rows)?;
        Ok(ret)
    }

    /// Creates the table file with just its header row, if it does not exist
    /// yet. Returns whether the file was created.
    pub fn ensure_exists(&self) -> Result<bool, StoreError> {
        let _guard = self.guard();
        if self.path.exists() {
            return Ok(false);
        }
        self.write_rows(&[])?;
        Ok(true)
    }

    fn read_rows(&self) -> Vec<R> {
        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!(
                    table = R::FILE_NAME,
                    error = %e,
                    "table unreadable, treating it as empty"
                );
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for (i, row) in reader.deserialize::<R>().enumerate() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        table = R::FILE_NAME,
                        row = i + 1,
                        error = %e,
                        "skipping malformed row"
                    );
                }
            }
        }
        rows
    }

    /// Reads every row, failing on the first one which cannot be parsed. A
    /// missing file reads as empty.
    fn read_rows_strict(&self) -> Result<Vec<R>, StoreError> {
        let csv_err = |source| StoreError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e)
                if matches!(
                    e.kind(),
                    csv::ErrorKind::Io(err) if err.kind() == io::ErrorKind::NotFound
                ) =>
            {
                return Ok(Vec::new());
            }
            Err(e) => return Err(csv_err(e)),
        };

        reader
            .deserialize::<R>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)
    }

    fn write_rows(&self, rows: &[R]) -> Result<(), StoreError> {
        let tmp = temp_sibling(&self.path);
        let csv_err = |source| StoreError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp)
            .map_err(csv_err)?;
        writer.write_record(R::HEADERS).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        drop(writer);

        replace_file(&tmp, &self.path)
    }
}

pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", Uuid::now_v7()));
    path.with_file_name(name)
}

pub(crate) fn replace_file(tmp: &Path, dest: &Path) -> Result<(), StoreError> {
    fs::rename(tmp, dest).map_err(|source| {
        let _ = fs::remove_file(tmp);
        StoreError::Io {
            path: dest.to_path_buf(),
            source,
        }
    })
}

/// All of the tables, plus the id counters.
pub struct Store {
    pub citizens: Table<Citizen>,
    pub contractors: Table<Contractor>,
    pub tenders: Table<Tender>,
    pub reports: Table<Report>,
    pub ratings: Table<Rating>,
    pub counters: Counters,
}

impl Store {
    /// Opens (and if necessary initialises) the store rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let store = Self {
            citizens: Table::new(data_dir),
            contractors: Table::new(data_dir),
            tenders: Table::new(data_dir),
            reports: Table::new(data_dir),
            ratings: Table::new(data_dir),
            counters: Counters::new(data_dir),
        };
        seed::init_tables(&store)?;

        Ok(store)
    }
}

#[cfg(test)]
pub(crate) fn temp_data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("roadwatch-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

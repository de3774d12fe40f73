//! Memoization of the last prepared dataset.
//!
//! The key is the input file's identity plus the preparer options and the
//! calendar day of `now`: the trailing window moves with the clock, so a
//! new day always re-prepares.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::NaiveDate;

use crate::error::{DataError, DataResult};

use super::model::PreparedDataset;
use super::prepare::{DatasetPreparer, PrepareOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    options: PrepareOptions,
    day: NaiveDate,
}

impl CacheKey {
    fn for_input(path: &Path, options: PrepareOptions, day: NaiveDate) -> DataResult<Self> {
        let meta = fs::metadata(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => DataError::Unavailable {
                path: path.to_path_buf(),
            },
            _ => DataError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(CacheKey {
            path: fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()),
            len: meta.len(),
            modified: meta.modified().ok(),
            options,
            day,
        })
    }
}

/// Holds at most one prepared dataset.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(CacheKey, Arc<PreparedDataset>)>,
    hits: u64,
    misses: u64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path` or prepare it afresh.
    pub fn get_or_prepare(
        &mut self,
        preparer: &DatasetPreparer,
        path: &Path,
        now: NaiveDate,
    ) -> DataResult<Arc<PreparedDataset>> {
        let key = CacheKey::for_input(path, *preparer.options(), now)?;

        if let Some((cached_key, dataset)) = &self.entry {
            if *cached_key == key {
                self.hits += 1;
                log::debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        self.misses += 1;
        log::debug!("Cache miss for {}", path.display());
        let dataset = Arc::new(preparer.prepare_at(path, now)?);
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset so the next call re-reads the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

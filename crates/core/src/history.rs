//! Date → guide assignment history and its line-oriented file format.
//!
//! One entry per line: `<yyyy/mm/dd> <guideName>`. Entries are kept in a
//! [`BTreeMap`] keyed by the date key, so iteration order is date order
//! (the zero-padded key sorts chronologically as a plain string).

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PedibusError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStore {
    entries: BTreeMap<String, String>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse history records. Blank lines are skipped; any other line must
    /// have exactly two whitespace-separated fields or the whole load fails
    /// with the 1-based line number.
    pub fn load<R: BufRead>(source: R) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (index, line) in source.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [day, guide_name] = fields.as_slice() else {
                return Err(PedibusError::Parse { line: line_number });
            };
            entries.insert(day.to_string(), guide_name.to_string());
        }
        Ok(Self { entries })
    }

    /// Like [`load`](Self::load), but falls back to an empty store and hands
    /// the failure back for display.
    pub fn load_or_empty<R: BufRead>(source: R) -> (Self, Option<PedibusError>) {
        match Self::load(source) {
            Ok(store) => (store, None),
            Err(e) => (Self::new(), Some(e)),
        }
    }

    /// Load from a history file. A missing file is a load failure like any
    /// other; callers fall back to an empty store and the file is created on
    /// the first save.
    pub fn load_file(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|e| PedibusError::load(path, e.into()))?;
        let store = Self::load(BufReader::new(file)).map_err(|e| PedibusError::load(path, e))?;
        info!(path = %path.display(), entries = store.len(), "loaded history");
        Ok(store)
    }

    pub fn get(&self, date_key: &str) -> Option<&str> {
        self.entries.get(date_key).map(String::as_str)
    }

    /// Insert or overwrite the entry for `date_key`.
    pub fn put(&mut self, date_key: impl Into<String>, guide_name: impl Into<String>) {
        let date_key = date_key.into();
        let guide_name = guide_name.into();
        debug!(date = %date_key, guide = %guide_name, "history put");
        self.entries.insert(date_key, guide_name);
    }

    /// Delete the entry for `date_key`, returning the guide it held.
    pub fn remove(&mut self, date_key: &str) -> Option<String> {
        debug!(date = date_key, "history remove");
        self.entries.remove(date_key)
    }

    /// Write every entry in ascending date-key order, one per line.
    pub fn save<W: Write>(&self, mut destination: W) -> io::Result<()> {
        for (day, guide_name) in &self.entries {
            writeln!(destination, "{day} {guide_name}")?;
        }
        destination.flush()
    }

    /// Overwrite `path` with the full history.
    ///
    /// Writes to a temporary sibling file first, then renames it over the
    /// destination. In-memory state is untouched on failure.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let tmp_path = tmp_path_for(path);
        let result = fs::File::create(&tmp_path)
            .and_then(|file| self.save(BufWriter::new(file)))
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(source) = result {
            let _ = fs::remove_file(&tmp_path);
            warn!(path = %path.display(), error = %source, "failed to write history");
            return Err(PedibusError::Save {
                path: path.to_path_buf(),
                source,
            });
        }

        info!(path = %path.display(), entries = self.len(), "saved history");
        Ok(())
    }

    /// Number of entries dated at or before `cutoff_date_key` whose stored
    /// guide name equals `guide_name` exactly.
    pub fn count_up_to(&self, guide_name: &str, cutoff_date_key: &str) -> usize {
        self.entries
            .range::<str, _>((Bound::Unbounded, Bound::Included(cutoff_date_key)))
            .filter(|(_, name)| name.as_str() == guide_name)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending date-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

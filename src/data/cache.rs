use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_table;
use super::model::SalesTable;
use super::schema::LoadParams;
use crate::error::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// Load cache: one table per (file identity, load parameters)
// ---------------------------------------------------------------------------

/// Identity of a loaded source. A change in any part forces a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
    pub params: LoadParams,
}

impl SourceKey {
    /// Stat the file; a missing file is a load error.
    pub fn for_path(path: &Path, params: &LoadParams) -> LoadResult<Self> {
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::MissingFile(path.to_path_buf()),
            _ => LoadError::Io(e),
        })?;
        Ok(SourceKey {
            path: path.canonicalize()?,
            len: meta.len(),
            modified: meta.modified().ok(),
            params: params.clone(),
        })
    }
}

/// Memoizes the most recently loaded table.
///
/// The table is handed out as `Arc<SalesTable>` and never mutated; filter
/// changes do not touch the cache.
#[derive(Debug, Default)]
pub struct LoadCache {
    entry: Option<(SourceKey, Arc<SalesTable>)>,
    loads: usize,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table when `path`/`params` still match, load otherwise.
    /// On a failed load the previous entry is kept.
    pub fn get_or_load(&mut self, path: &Path, params: &LoadParams) -> LoadResult<Arc<SalesTable>> {
        let key = SourceKey::for_path(path, params)?;
        if let Some((cached, table)) = &self.entry {
            if *cached == key {
                log::debug!("Cache hit for {}", key.path.display());
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(load_table(&key.path, params)?);
        self.loads += 1;
        self.entry = Some((key, Arc::clone(&table)));
        Ok(table)
    }

    /// Drop the cached table; the next `get_or_load` reads the file again.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of actual file loads performed.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::write_csv;
    use crate::data::schema::SheetWindow;

    const ROW_A: &str = "1,A,Yangon,Member,Female,Health and beauty,100,10:00:00,7";
    const ROW_B: &str = "2,B,Mandalay,Normal,Male,Sports and travel,50,15:30:00,8";

    #[test]
    fn unchanged_source_is_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "sales.csv", &[ROW_A, ROW_B]);
        let params = LoadParams::default();

        let mut cache = LoadCache::new();
        let first = cache.get_or_load(&path, &params).unwrap();
        let second = cache.get_or_load(&path, &params).unwrap();

        assert_eq!(cache.loads(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn changed_content_or_params_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "sales.csv", &[ROW_A]);
        let params = LoadParams::default();

        let mut cache = LoadCache::new();
        assert_eq!(cache.get_or_load(&path, &params).unwrap().len(), 1);

        // Different length, so the key changes even if mtime granularity is coarse.
        write_csv(&dir, "sales.csv", &[ROW_A, ROW_B]);
        assert_eq!(cache.get_or_load(&path, &params).unwrap().len(), 2);
        assert_eq!(cache.loads(), 2);

        let other = LoadParams {
            window: SheetWindow::new(0, "A:Z").unwrap(),
            ..LoadParams::default()
        };
        cache.get_or_load(&path, &other).unwrap();
        assert_eq!(cache.loads(), 3);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "sales.csv", &[ROW_A]);
        let params = LoadParams::default();

        let mut cache = LoadCache::new();
        cache.get_or_load(&path, &params).unwrap();
        cache.invalidate();
        cache.get_or_load(&path, &params).unwrap();
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn failed_load_keeps_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "sales.csv", &[ROW_A]);
        let params = LoadParams::default();

        let mut cache = LoadCache::new();
        let before = cache.get_or_load(&path, &params).unwrap();

        let missing = dir.path().join("missing.csv");
        let err = cache.get_or_load(&missing, &params).unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(_)));
        let after = cache.get_or_load(&path, &params).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(cache.loads(), 1);
    }
}

//! File-backed dashboard store: one pretty-printed JSON file per dashboard.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use grid::dashboard::{Dashboard, DashboardStore, validate_name};
use grid::error::StoreError;
use tracing::{debug, warn};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }
}

fn not_found(err: std::io::Error, name: &str) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(name.to_owned())
    } else {
        StoreError::Io(err)
    }
}

impl DashboardStore for FileStore {
    fn load(&self, name: &str) -> Result<Dashboard, StoreError> {
        let path = self.path_for(name)?;
        let raw = fs::read_to_string(&path).map_err(|e| not_found(e, name))?;
        let mut dashboard: Dashboard = serde_json::from_str(&raw)?;
        if dashboard.name != name {
            warn!(file = %path.display(), stored = %dashboard.name, "dashboard name differs from file name, using file name");
            dashboard.name = name.to_owned();
        }
        debug!(dashboard = name, widgets = dashboard.widgets.len(), "dashboard read");
        Ok(dashboard)
    }

    fn save(&mut self, dashboard: &Dashboard) -> Result<(), StoreError> {
        let path = self.path_for(&dashboard.name)?;
        fs::create_dir_all(&self.dir)?;
        let rendered = serde_json::to_string_pretty(dashboard)?;
        // Replace atomically: write a sibling temp file, then rename over the target.
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        fs::write(&tmp, rendered)?;
        fs::rename(&tmp, &path)?;
        debug!(file = %path.display(), "dashboard written");
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|e| not_found(e, name))?;
        debug!(file = %path.display(), "dashboard deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

//! Persisted dashboard document and the store interface.
//!
//! A dashboard is a name, a grid configuration, and the widget records in
//! draw order. Sync state is deliberately absent: it resets on every load.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cell::Rect;
use crate::error::StoreError;
use crate::geometry::GridConfig;
use crate::registry::{WidgetId, WidgetKind, WidgetRecord};

/// Cell range of the map widget placed on a brand-new dashboard.
pub const STARTER_MAP_CELLS: (&str, &str) = ("3F", "7H");

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// A saved dashboard layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub name: String,
    #[serde(default)]
    pub grid_config: GridConfig,
    #[serde(default)]
    pub widgets: Vec<WidgetRecord>,
    /// Milliseconds since Unix epoch, 0 if never saved.
    #[serde(default)]
    pub saved_at: i64,
}

impl Dashboard {
    /// Empty dashboard with the default grid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), grid_config: GridConfig::default(), widgets: Vec::new(), saved_at: 0 }
    }

    /// Dashboard with one map widget in the middle of the default grid, which
    /// is what a user sees the first time they open the canvas.
    #[must_use]
    pub fn starter(name: impl Into<String>) -> Self {
        let mut dashboard = Self::new(name);
        if let Ok(rect) = Rect::parse(STARTER_MAP_CELLS.0, STARTER_MAP_CELLS.1) {
            dashboard.widgets.push(WidgetRecord {
                id: WidgetId::new(WidgetKind::Map, 1),
                kind: WidgetKind::Map,
                rect,
                props: WidgetKind::Map.default_props(),
            });
        }
        dashboard
    }
}

/// Check that `name` can be used as a dashboard key.
///
/// # Errors
///
/// `InvalidName` for empty names, `.`/`..`, and names containing path
/// separators or control characters.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    let bad = trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.chars().any(|c| c == '/' || c == '\\' || c.is_control());
    if bad { Err(StoreError::InvalidName(name.to_owned())) } else { Ok(()) }
}

/// Save/load dashboards by name.
pub trait DashboardStore {
    /// # Errors
    ///
    /// `NotFound` if no dashboard has this name.
    fn load(&self, name: &str) -> Result<Dashboard, StoreError>;

    /// Insert or overwrite the dashboard under its own name.
    ///
    /// # Errors
    ///
    /// `InvalidName`, or a backend failure.
    fn save(&mut self, dashboard: &Dashboard) -> Result<(), StoreError>;

    /// Names of every saved dashboard, sorted.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// # Errors
    ///
    /// `NotFound` if no dashboard has this name.
    fn delete(&mut self, name: &str) -> Result<(), StoreError>;
}

/// In-memory store. Used by tests and by hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dashboards: BTreeMap<String, Dashboard>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DashboardStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Dashboard, StoreError> {
        self.dashboards
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    fn save(&mut self, dashboard: &Dashboard) -> Result<(), StoreError> {
        validate_name(&dashboard.name)?;
        self.dashboards.insert(dashboard.name.clone(), dashboard.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.dashboards.keys().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.dashboards
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }
}

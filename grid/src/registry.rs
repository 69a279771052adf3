//! Widget records and the registry that owns them.
//!
//! This module defines what sits on the grid (`WidgetKind`, `WidgetId`,
//! `WidgetRecord`), a typed accessor for the open-ended `props` JSON bag
//! (`Props`), and the store that owns every live record (`WidgetRegistry`).
//! Everything else refers to widgets by id; the registry is the only place a
//! record is mutated.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::cell::{Rect, Span};
use crate::consts::MAX_MAP_WIDGETS;
use crate::error::GridError;
use crate::geometry::GridModel;
use crate::placement::find_free_rect;

/// Default map style; navigation is shared between synced maps, style is not.
pub const DEFAULT_MAP_STYLE: &str = "mapbox://styles/mapbox/satellite-v9";

/// The closed set of widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// Interactive map viewport. The only kind that takes part in sync.
    Map,
    /// Bar, line, or pie chart.
    Chart,
    /// Hierarchical sunburst chart.
    Sunburst,
    /// User-authored HTML/CSS widget.
    Custom,
    /// Styled rich text block.
    RichText,
    /// Quick-start help panel shown in edit mode.
    Dev,
}

impl WidgetKind {
    pub const ALL: [Self; 6] = [Self::Map, Self::Chart, Self::Sunburst, Self::Custom, Self::RichText, Self::Dev];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Chart => "chart",
            Self::Sunburst => "sunburst",
            Self::Custom => "custom",
            Self::RichText => "richtext",
            Self::Dev => "dev",
        }
    }

    /// Human-readable name for menus.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::Chart => "Chart",
            Self::Sunburst => "Sunburst",
            Self::Custom => "Custom",
            Self::RichText => "Rich Text",
            Self::Dev => "Dev",
        }
    }

    /// Whether instances of this kind can mirror each other's navigation.
    #[must_use]
    pub fn supports_sync(self) -> bool {
        matches!(self, Self::Map)
    }

    /// Per-dashboard instance cap, if any.
    #[must_use]
    pub fn max_instances(self) -> Option<usize> {
        match self {
            Self::Map => Some(MAX_MAP_WIDGETS),
            _ => None,
        }
    }

    /// Props a new widget of this kind starts with.
    #[must_use]
    pub fn default_props(self) -> serde_json::Value {
        match self {
            Self::Map => json!({
                "style": DEFAULT_MAP_STYLE,
                "center": [-74.5, 40.0],
                "zoom": 9.0,
                "pitch": 0.0,
                "bearing": 0.0,
            }),
            Self::Chart => json!({ "chartType": "bar" }),
            Self::Sunburst => json!({ "dataSource": "financial", "animationsEnabled": true }),
            Self::Custom => json!({
                "title": "Custom Widget",
                "description": "",
                "html": "<div class=\"custom-widget-content\"><h3>Custom Widget</h3></div>",
                "css": ".custom-widget-content { padding: 20px; text-align: center; color: #fff; }",
            }),
            Self::RichText => json!({
                "content": "",
                "fontSize": 14,
                "textColor": "#ffffff",
                "backgroundColor": "#1A1A1A",
                "textAlign": "left",
            }),
            Self::Dev => json!({}),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GridError::UnknownWidgetType(s.to_owned()))
    }
}

/// Widget identifier, written `<kind>-<n>` (e.g. `map-3`).
///
/// `n` counts per kind from 1 and is never reused within a dashboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WidgetId {
    pub kind: WidgetKind,
    pub seq: u32,
}

impl WidgetId {
    #[must_use]
    pub fn new(kind: WidgetKind, seq: u32) -> Self {
        Self { kind, seq }
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.seq)
    }
}

impl FromStr for WidgetId {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidWidgetId(s.to_owned());
        let (kind, seq) = s.rsplit_once('-').ok_or_else(invalid)?;
        let kind = kind.parse::<WidgetKind>()?;
        let seq = seq.parse::<u32>().map_err(|_| invalid())?;
        if seq == 0 {
            return Err(invalid());
        }
        Ok(Self { kind, seq })
    }
}

impl TryFrom<String> for WidgetId {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WidgetId> for String {
    fn from(id: WidgetId) -> Self {
        id.to_string()
    }
}

/// A widget as stored in the registry and in a saved dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    #[serde(flatten)]
    pub rect: Rect,
    /// Kind-specific configuration (map style and view, chart type, ...).
    #[serde(default)]
    pub props: serde_json::Value,
}

/// Typed access to common props fields.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Map style URL. Defaults to [`DEFAULT_MAP_STYLE`] when absent.
    #[must_use]
    pub fn style(&self) -> &'a str {
        self.value
            .get("style")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_MAP_STYLE)
    }

    /// Display title. Empty string when absent.
    #[must_use]
    pub fn title(&self) -> &'a str {
        self.value
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

/// Shallow-merge `incoming` object keys into `target`; `null` values delete.
///
/// Returns `false` without touching `target` if `incoming` is not an object.
pub fn merge_props(target: &mut serde_json::Value, incoming: &serde_json::Value) -> bool {
    let Some(incoming) = incoming.as_object() else {
        return false;
    };
    if !target.is_object() {
        *target = json!({});
    }
    if let Some(existing) = target.as_object_mut() {
        for (k, v) in incoming {
            if v.is_null() {
                existing.remove(k);
            } else {
                existing.insert(k.clone(), v.clone());
            }
        }
    }
    true
}

/// Owner of every widget record on the current dashboard.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    kinds: HashSet<WidgetKind>,
    records: HashMap<WidgetId, WidgetRecord>,
    /// Insertion order; later widgets draw above earlier ones.
    order: Vec<WidgetId>,
    /// Highest sequence number handed out per kind.
    counters: HashMap<WidgetKind, u32>,
}

impl WidgetRegistry {
    /// Empty registry with no kinds registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry with every [`WidgetKind`] registered.
    #[must_use]
    pub fn with_all_kinds() -> Self {
        let mut registry = Self::new();
        for kind in WidgetKind::ALL {
            registry.register(kind);
        }
        registry
    }

    pub fn register(&mut self, kind: WidgetKind) {
        self.kinds.insert(kind);
    }

    #[must_use]
    pub fn is_registered(&self, kind: WidgetKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn ensure_registered(&self, kind: WidgetKind) -> Result<(), GridError> {
        if self.is_registered(kind) {
            Ok(())
        } else {
            Err(GridError::UnknownWidgetType(kind.to_string()))
        }
    }

    fn next_id(&mut self, kind: WidgetKind) -> WidgetId {
        let seq = self.counters.entry(kind).or_insert(0);
        *seq += 1;
        WidgetId::new(kind, *seq)
    }

    /// Create a widget at `rect`.
    ///
    /// `props` are merged over the kind's defaults.
    ///
    /// # Errors
    ///
    /// `UnknownWidgetType` if `kind` is not registered, `OutOfBounds` if
    /// `rect` does not fit the grid.
    pub fn create(
        &mut self,
        kind: WidgetKind,
        rect: Rect,
        props: Option<&serde_json::Value>,
        grid: &GridModel,
    ) -> Result<WidgetId, GridError> {
        self.ensure_registered(kind)?;
        grid.validate(rect)?;

        let mut merged = kind.default_props();
        if let Some(props) = props {
            merge_props(&mut merged, props);
        }

        let id = self.next_id(kind);
        self.records.insert(id, WidgetRecord { id, kind, rect, props: merged });
        self.order.push(id);
        info!(%id, %rect, "widget created");
        Ok(id)
    }

    /// Move or resize a widget.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `rect` does not fit the grid (callers clamp first),
    /// `UnknownWidget` if `id` is not present.
    pub fn reposition(&mut self, id: WidgetId, rect: Rect, grid: &GridModel) -> Result<(), GridError> {
        grid.validate(rect)?;
        let record = self.records.get_mut(&id).ok_or(GridError::UnknownWidget(id))?;
        record.rect = rect;
        Ok(())
    }

    /// Copy a widget's props into a new widget of the same kind at the first
    /// free rect of `span`.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not present, `NoSpaceAvailable` if the grid
    /// has no free rect of that size.
    pub fn duplicate(&mut self, id: WidgetId, span: Span, grid: &GridModel) -> Result<WidgetId, GridError> {
        let source = self.records.get(&id).ok_or(GridError::UnknownWidget(id))?;
        let (kind, props) = (source.kind, source.props.clone());
        let rect = find_free_rect(span, &self.rects(), grid.config()).ok_or(GridError::NoSpaceAvailable)?;
        self.create(kind, rect, Some(&props), grid)
    }

    /// Delete a widget, returning its record if it existed.
    pub fn remove(&mut self, id: WidgetId) -> Option<WidgetRecord> {
        let record = self.records.remove(&id)?;
        self.order.retain(|other| *other != id);
        info!(%id, "widget removed");
        Some(record)
    }

    /// Merge a partial props object into a widget's props.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not present.
    pub fn merge_props(&mut self, id: WidgetId, partial: &serde_json::Value) -> Result<bool, GridError> {
        let record = self.records.get_mut(&id).ok_or(GridError::UnknownWidget(id))?;
        Ok(merge_props(&mut record.props, partial))
    }

    /// Pull every rect back inside the grid after a shrink.
    ///
    /// Returns the ids whose rect changed. Widgets are never deleted here.
    pub fn clamp_all(&mut self, grid: &GridModel) -> Vec<WidgetId> {
        let (columns, rows) = (grid.columns(), grid.rows());
        let mut changed = Vec::new();
        for id in &self.order {
            let Some(record) = self.records.get_mut(id) else {
                continue;
            };
            let clamped = record.rect.clamp_to(columns, rows);
            if clamped != record.rect {
                warn!(%id, from = %record.rect, to = %clamped, "widget clamped into resized grid");
                record.rect = clamped;
                changed.push(*id);
            }
        }
        changed
    }

    /// Replace all records with a saved set.
    ///
    /// Rects are clamped into `grid`, duplicate ids are dropped, and per-kind
    /// counters advance past every loaded id so new ids never collide.
    ///
    /// # Errors
    ///
    /// `UnknownWidgetType` if a record's kind is not registered. The registry
    /// is left empty in that case.
    pub fn load(&mut self, records: Vec<WidgetRecord>, grid: &GridModel) -> Result<(), GridError> {
        self.clear();
        for mut record in records {
            if let Err(err) = self.ensure_registered(record.id.kind) {
                self.clear();
                return Err(err);
            }
            if self.records.contains_key(&record.id) {
                warn!(id = %record.id, "duplicate widget id in saved dashboard, dropping");
                continue;
            }
            if record.kind != record.id.kind {
                warn!(id = %record.id, kind = %record.kind, "widget kind disagrees with id, using id");
                record.kind = record.id.kind;
            }
            record.rect = record.rect.clamp_to(grid.columns(), grid.rows());
            let counter = self.counters.entry(record.kind).or_insert(0);
            *counter = (*counter).max(record.id.seq);
            self.order.push(record.id);
            self.records.insert(record.id, record);
        }
        Ok(())
    }

    /// Remove every record and reset id counters.
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.counters.clear();
    }

    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&WidgetRecord> {
        self.records.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.records.contains_key(&id)
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &WidgetRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Ids of one kind in insertion order.
    #[must_use]
    pub fn ids_of_kind(&self, kind: WidgetKind) -> Vec<WidgetId> {
        self.order.iter().copied().filter(|id| id.kind == kind).collect()
    }

    #[must_use]
    pub fn count_of_kind(&self, kind: WidgetKind) -> usize {
        self.order.iter().filter(|id| id.kind == kind).count()
    }

    /// Every occupied rect.
    #[must_use]
    pub fn rects(&self) -> Vec<Rect> {
        self.records().map(|r| r.rect).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

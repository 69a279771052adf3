//! Engine core: the per-dashboard context that owns every component.
//!
//! `EngineCore` holds one grid model, widget registry, manipulation controller,
//! and sync coordinator. Hosts feed it structured input (pointer, key,
//! navigation events) and high-level commands (add, remove, edit a cell), and
//! apply the returned [`Action`]s: repaint a preview, move a widget box, push a
//! mirrored camera into a follower map.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info, warn};

use crate::cell::{self, Rect, Span};
use crate::consts::PARAM_COARSE_STEP;
use crate::dashboard::{Dashboard, DashboardStore, now_ms};
use crate::error::{GridError, StoreError};
use crate::geometry::{ConfigChange, GridConfig, GridModel, GridParam, PixelBox, PixelSize, Point};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, EditMode, Gesture, Key, ManipulationController, Modifiers, UiState};
use crate::placement::find_free_rect;
use crate::registry::{WidgetId, WidgetKind, WidgetRecord, WidgetRegistry};
use crate::sync::{ChangeOrigin, NavState, SyncCoordinator, SyncGroup, SyncMode};

/// Actions returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Show the gesture preview outline at `rect`.
    PreviewMoved { id: WidgetId, rect: Rect, pixel_box: PixelBox },
    /// Hide the gesture preview outline.
    PreviewCleared { id: WidgetId },
    /// A widget's committed rect changed (or was re-committed unchanged).
    WidgetCommitted { id: WidgetId, rect: Rect, pixel_box: PixelBox },
    WidgetCreated { id: WidgetId, rect: Rect, pixel_box: PixelBox },
    WidgetRemoved { id: WidgetId },
    /// Every widget's pixel box after a spacing or container change.
    WidgetsReprojected(Vec<(WidgetId, PixelBox)>),
    /// Column or row count changed; rebuild the background cells.
    GridRebuilt { columns: u32, rows: u32 },
    SelectionChanged(Option<WidgetId>),
    InspectorChanged(Option<WidgetId>),
    ModeChanged(EditMode),
    /// Move follower `id`'s map camera to `nav`. The host reports the
    /// resulting map event back with [`ChangeOrigin::Mirror`].
    SyncApplied { id: WidgetId, nav: NavState },
    SyncGroupChanged(SyncGroup),
    SetCursor(String),
    RenderNeeded,
}

/// Which corner of a rect an inspector edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEnd {
    Start,
    End,
}

/// Core engine state for one open dashboard.
#[derive(Debug)]
pub struct EngineCore {
    name: String,
    grid: GridModel,
    registry: WidgetRegistry,
    input: ManipulationController,
    sync: SyncCoordinator,
    ui: UiState,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(PixelSize::default())
    }
}

impl EngineCore {
    /// Empty, unnamed dashboard with the default grid and every widget kind
    /// registered.
    #[must_use]
    pub fn new(size: PixelSize) -> Self {
        Self {
            name: String::new(),
            grid: GridModel::new(GridConfig::default(), size),
            registry: WidgetRegistry::with_all_kinds(),
            input: ManipulationController::new(),
            sync: SyncCoordinator::new(WidgetKind::Map),
            ui: UiState::default(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    #[must_use]
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn controller(&self) -> &ManipulationController {
        &self.input
    }

    #[must_use]
    pub fn sync_group(&self) -> SyncGroup {
        self.sync.group()
    }

    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&WidgetRecord> {
        self.registry.get(id)
    }

    /// Committed pixel box of a widget.
    #[must_use]
    pub fn pixel_box(&self, id: WidgetId) -> Option<PixelBox> {
        self.registry.get(id).map(|r| self.grid.pixel_box(r.rect))
    }

    /// Debug-box readout for a widget: start cell, end cell, cell count.
    #[must_use]
    pub fn debug_label(&self, id: WidgetId) -> Option<String> {
        self.registry.get(id).map(|r| r.rect.debug_label())
    }

    fn sync_members(&self) -> Vec<WidgetId> {
        self.registry.ids_of_kind(self.sync.kind())
    }

    fn reprojected(&self) -> Action {
        Action::WidgetsReprojected(
            self.registry
                .records()
                .map(|r| (r.id, self.grid.pixel_box(r.rect)))
                .collect(),
        )
    }

    fn committed(&self, id: WidgetId, rect: Rect) -> Action {
        Action::WidgetCommitted { id, rect, pixel_box: self.grid.pixel_box(rect) }
    }

    // --- Dashboards ---

    /// Tear down the current dashboard and rebuild from a saved one.
    ///
    /// Any gesture is cancelled, selection is cleared, and sync is reset to
    /// disabled. An out-of-range grid config is clamped.
    ///
    /// # Errors
    ///
    /// `UnknownWidgetType` if a saved widget's kind is not registered. The
    /// dashboard is then left empty.
    pub fn load_dashboard(&mut self, dashboard: Dashboard) -> Result<Vec<Action>, GridError> {
        let Dashboard { name, grid_config, widgets, .. } = dashboard;
        if !grid_config.is_within_bounds() {
            warn!(dashboard = %name, ?grid_config, "saved grid config out of range, clamping");
        }

        self.input.cancel();
        self.ui.selected_id = None;
        self.ui.inspector_id = None;
        self.sync.reset();
        self.grid.set_config(grid_config);
        self.name = name;
        self.registry.load(widgets, &self.grid)?;
        info!(dashboard = %self.name, widgets = self.registry.len(), "dashboard loaded");

        Ok(vec![
            Action::GridRebuilt { columns: self.grid.columns(), rows: self.grid.rows() },
            Action::SelectionChanged(None),
            Action::InspectorChanged(None),
            Action::SyncGroupChanged(self.sync.group()),
            self.reprojected(),
            Action::RenderNeeded,
        ])
    }

    /// Snapshot the current dashboard, stamped with the current time.
    #[must_use]
    pub fn to_dashboard(&self) -> Dashboard {
        Dashboard {
            name: self.name.clone(),
            grid_config: *self.grid.config(),
            widgets: self.registry.records().cloned().collect(),
            saved_at: now_ms(),
        }
    }

    /// Snapshot and persist the current dashboard.
    ///
    /// # Errors
    ///
    /// Whatever the store reports.
    pub fn save(&self, store: &mut dyn DashboardStore) -> Result<Dashboard, StoreError> {
        let dashboard = self.to_dashboard();
        store.save(&dashboard)?;
        info!(dashboard = %dashboard.name, widgets = dashboard.widgets.len(), "dashboard saved");
        Ok(dashboard)
    }

    // --- Grid ---

    /// Container resized: reproject every widget.
    pub fn set_viewport(&mut self, size: PixelSize) -> Vec<Action> {
        self.grid.set_size(size);
        vec![self.reprojected(), Action::RenderNeeded]
    }

    /// Replace the grid configuration (clamped into bounds).
    ///
    /// A column or row change rebuilds the grid, cancels any gesture, and
    /// clamps every widget back inside. A spacing change only reprojects.
    pub fn set_grid_config(&mut self, config: GridConfig) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.grid.set_config(config) {
            ConfigChange::Unchanged => return actions,
            ConfigChange::Rebuild => {
                if let Some(id) = self.input.cancel() {
                    actions.push(Action::PreviewCleared { id });
                }
                let clamped = self.registry.clamp_all(&self.grid);
                info!(
                    columns = self.grid.columns(),
                    rows = self.grid.rows(),
                    clamped = clamped.len(),
                    "grid rebuilt"
                );
                actions.push(Action::GridRebuilt { columns: self.grid.columns(), rows: self.grid.rows() });
                for id in clamped {
                    if let Some(record) = self.registry.get(id) {
                        actions.push(self.committed(id, record.rect));
                    }
                }
            }
            ConfigChange::Reproject => {
                debug!(config = ?self.grid.config(), "grid spacing changed");
            }
        }
        actions.push(self.reprojected());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Set one grid parameter, clamped into its range.
    pub fn set_grid_param(&mut self, param: GridParam, value: i64) -> Vec<Action> {
        let mut config = *self.grid.config();
        config.set(param, value);
        self.set_grid_config(config)
    }

    /// Arrow-key stepping on a grid parameter: one unit, or ten with Shift.
    pub fn step_grid_param(&mut self, param: GridParam, direction: i64, modifiers: Modifiers) -> Vec<Action> {
        let step = if modifiers.shift { PARAM_COARSE_STEP } else { 1 };
        let mut config = *self.grid.config();
        config.adjust(param, direction.signum() * step);
        self.set_grid_config(config)
    }

    // --- Mode / selection ---

    /// Switch between edit and view mode. Entering view mode cancels any
    /// gesture and clears the selection and inspector.
    pub fn set_mode(&mut self, mode: EditMode) -> Vec<Action> {
        if self.ui.mode == mode {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.ui.mode = mode;
        if mode == EditMode::View {
            if let Some(id) = self.input.cancel() {
                actions.push(Action::PreviewCleared { id });
            }
            actions.extend(self.set_selection(None));
            actions.extend(self.set_inspector(None));
        }
        debug!(?mode, "edit mode changed");
        actions.push(Action::ModeChanged(mode));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn toggle_mode(&mut self) -> Vec<Action> {
        let next = match self.ui.mode {
            EditMode::Edit => EditMode::View,
            EditMode::View => EditMode::Edit,
        };
        self.set_mode(next)
    }

    fn set_selection(&mut self, id: Option<WidgetId>) -> Option<Action> {
        if self.ui.selected_id == id {
            return None;
        }
        self.ui.selected_id = id;
        Some(Action::SelectionChanged(id))
    }

    fn set_inspector(&mut self, id: Option<WidgetId>) -> Option<Action> {
        if self.ui.inspector_id == id {
            return None;
        }
        self.ui.inspector_id = id;
        Some(Action::InspectorChanged(id))
    }

    /// Select a widget and open its inspector.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not present.
    pub fn open_inspector(&mut self, id: WidgetId) -> Result<Vec<Action>, GridError> {
        if !self.registry.contains(id) {
            return Err(GridError::UnknownWidget(id));
        }
        let mut actions: Vec<Action> = self.set_selection(Some(id)).into_iter().collect();
        actions.extend(self.set_inspector(Some(id)));
        Ok(actions)
    }

    pub fn close_inspector(&mut self) -> Vec<Action> {
        self.set_inspector(None).into_iter().collect()
    }

    // --- Widgets ---

    fn check_instance_cap(&self, kind: WidgetKind) -> Result<(), GridError> {
        match kind.max_instances() {
            Some(max) if self.registry.count_of_kind(kind) >= max => Err(GridError::WidgetLimit { kind, max }),
            _ => Ok(()),
        }
    }

    /// Add a widget of `kind` at the first free 2×2 rect.
    ///
    /// # Errors
    ///
    /// `WidgetLimit` if the kind is at its cap, `NoSpaceAvailable` if the grid
    /// has no free 2×2 rect, `UnknownWidgetType` if the kind is unregistered.
    pub fn add_widget(&mut self, kind: WidgetKind) -> Result<(WidgetId, Vec<Action>), GridError> {
        self.check_instance_cap(kind)?;
        let rect = find_free_rect(Span::default(), &self.registry.rects(), self.grid.config())
            .ok_or(GridError::NoSpaceAvailable)?;
        self.create_widget(kind, rect, None)
    }

    /// Add a widget of `kind` at an explicit rect.
    ///
    /// # Errors
    ///
    /// `WidgetLimit`, `UnknownWidgetType`, or `OutOfBounds`.
    pub fn create_widget(
        &mut self,
        kind: WidgetKind,
        rect: Rect,
        props: Option<&serde_json::Value>,
    ) -> Result<(WidgetId, Vec<Action>), GridError> {
        self.check_instance_cap(kind)?;
        let id = self.registry.create(kind, rect, props, &self.grid)?;
        Ok((id, self.after_create(id)))
    }

    /// Copy a widget's props into a new 2×2 widget of the same kind at the
    /// first free rect, and select the copy.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, `WidgetLimit`, or `NoSpaceAvailable`.
    pub fn duplicate_widget(&mut self, id: WidgetId) -> Result<(WidgetId, Vec<Action>), GridError> {
        if !self.registry.contains(id) {
            return Err(GridError::UnknownWidget(id));
        }
        self.check_instance_cap(id.kind)?;
        let copy = self.registry.duplicate(id, Span::default(), &self.grid)?;
        let mut actions = self.after_create(copy);
        actions.extend(self.set_selection(Some(copy)));
        Ok((copy, actions))
    }

    fn after_create(&mut self, id: WidgetId) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(rect) = self.registry.get(id).map(|r| r.rect) {
            actions.push(Action::WidgetCreated { id, rect, pixel_box: self.grid.pixel_box(rect) });
        }
        // A primary group that lost every member picks up the first new one.
        let group = self.sync.group();
        if id.kind == self.sync.kind() && group.enabled && group.mode == SyncMode::PrimaryLeader && group.leader_id.is_none() {
            let members = self.sync_members();
            actions.push(Action::SyncGroupChanged(self.sync.set_enabled(true, None, &members)));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Delete a widget, clearing any selection, inspector, gesture, or sync
    /// leadership that referenced it.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not present.
    pub fn remove_widget(&mut self, id: WidgetId) -> Result<Vec<Action>, GridError> {
        if !self.registry.contains(id) {
            return Err(GridError::UnknownWidget(id));
        }
        let mut actions = Vec::new();
        if self.input.active_id() == Some(id) {
            self.input.cancel();
            actions.push(Action::PreviewCleared { id });
        }
        self.registry.remove(id);
        if self.ui.selected_id == Some(id) {
            actions.extend(self.set_selection(None));
        }
        if self.ui.inspector_id == Some(id) {
            actions.extend(self.set_inspector(None));
        }
        if id.kind == self.sync.kind() {
            let members = self.sync_members();
            if self.sync.on_widget_removed(id, &members) {
                actions.push(Action::SyncGroupChanged(self.sync.group()));
            }
        }
        actions.push(Action::WidgetRemoved { id });
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Commit a new rect for a widget.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` or `OutOfBounds`.
    pub fn move_widget(&mut self, id: WidgetId, rect: Rect) -> Result<Vec<Action>, GridError> {
        self.registry.reposition(id, rect, &self.grid)?;
        info!(%id, %rect, "widget repositioned");
        Ok(vec![self.committed(id, rect), Action::RenderNeeded])
    }

    /// Inspector edit of one corner cell. Input is trimmed and uppercased.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, `InvalidCellId` for a malformed id, `OutOfBounds` if
    /// the cell is outside the grid or the edit would invert the rect.
    pub fn edit_cell(&mut self, id: WidgetId, end: CellEnd, input: &str) -> Result<Vec<Action>, GridError> {
        let current = self.registry.get(id).ok_or(GridError::UnknownWidget(id))?.rect;
        let cell = cell::parse(&input.trim().to_uppercase())?;
        let rect = match end {
            CellEnd::Start => Rect::new(cell, current.end),
            CellEnd::End => Rect::new(current.start, cell),
        };
        self.move_widget(id, rect)
    }

    /// Merge a partial props object into a widget (null deletes a key).
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not present.
    pub fn update_props(&mut self, id: WidgetId, partial: &serde_json::Value) -> Result<Vec<Action>, GridError> {
        if self.registry.merge_props(id, partial)? {
            Ok(vec![Action::RenderNeeded])
        } else {
            Ok(Vec::new())
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        let Some(hit) = hit_test(pt, &self.registry, &self.grid) else {
            actions.extend(self.set_selection(None));
            return actions;
        };

        actions.extend(self.note_interaction(hit.id));
        if self.ui.mode == EditMode::View {
            return actions;
        }
        actions.extend(self.set_selection(Some(hit.id)));

        let gesture = match hit.part {
            HitPart::MoveHandle => Some(Gesture::Drag),
            HitPart::ResizeHandle(handle) => Some(Gesture::Resize(handle)),
            HitPart::Body => None,
        };
        let origin = self.registry.get(hit.id).map(|r| r.rect);
        if let (Some(gesture), Some(origin)) = (gesture, origin) {
            if self.input.begin(hit.id, gesture, origin, pt, self.ui.mode) {
                actions.push(Action::SetCursor(hit.part.cursor().to_owned()));
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        if let Some((_, before)) = self.input.preview() {
            let mut actions = Vec::new();
            if let Some((id, rect)) = self.input.update(pt, &self.grid) {
                if rect != before {
                    actions.push(Action::PreviewMoved { id, rect, pixel_box: self.grid.pixel_box(rect) });
                    actions.push(Action::RenderNeeded);
                }
            }
            return actions;
        }

        let cursor = match (self.ui.mode, hit_test(pt, &self.registry, &self.grid)) {
            (EditMode::Edit, Some(hit)) => hit.part.cursor(),
            _ => "default",
        };
        vec![Action::SetCursor(cursor.to_owned())]
    }

    pub fn on_pointer_up(&mut self, _pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let Some(commit) = self.input.release() else {
            return Vec::new();
        };

        let mut actions = vec![Action::PreviewCleared { id: commit.id }];
        match self.registry.reposition(commit.id, commit.rect, &self.grid) {
            Ok(()) => {
                if commit.changed() {
                    info!(id = %commit.id, from = %commit.from, to = %commit.rect, "widget committed");
                }
                actions.push(self.committed(commit.id, commit.rect));
            }
            Err(err) => warn!(id = %commit.id, %err, "gesture commit rejected"),
        }
        actions.push(Action::SetCursor("default".to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Escape cancels an active gesture, or clears the selection when idle.
    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.0 != "Escape" {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if let Some(id) = self.input.cancel() {
            actions.push(Action::PreviewCleared { id });
            actions.push(Action::SetCursor("default".to_owned()));
        } else {
            actions.extend(self.set_selection(None));
            actions.extend(self.set_inspector(None));
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Sync ---

    fn note_interaction(&mut self, id: WidgetId) -> Option<Action> {
        if id.kind != self.sync.kind() {
            return None;
        }
        let members = self.sync_members();
        self.sync
            .on_interaction(id, &members)
            .then(|| Action::SyncGroupChanged(self.sync.group()))
    }

    /// Set both sync switches. `source` is the widget whose controls made the
    /// change, if any.
    pub fn configure_sync(&mut self, enabled: bool, mode: SyncMode, source: Option<WidgetId>) -> Vec<Action> {
        let members = self.sync_members();
        vec![Action::SyncGroupChanged(self.sync.configure(enabled, mode, source, &members))]
    }

    pub fn set_sync_enabled(&mut self, enabled: bool, source: Option<WidgetId>) -> Vec<Action> {
        let members = self.sync_members();
        vec![Action::SyncGroupChanged(self.sync.set_enabled(enabled, source, &members))]
    }

    pub fn set_sync_mode(&mut self, mode: SyncMode, source: Option<WidgetId>) -> Vec<Action> {
        let members = self.sync_members();
        vec![Action::SyncGroupChanged(self.sync.set_mode(mode, source, &members))]
    }

    /// Make `id` the primary leader.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not a live sync-capable widget.
    pub fn assign_primary(&mut self, id: WidgetId) -> Result<Vec<Action>, GridError> {
        let members = self.sync_members();
        Ok(vec![Action::SyncGroupChanged(self.sync.assign_primary(id, &members)?)])
    }

    /// A widget's map camera moved.
    ///
    /// The new navigation is stored in the widget's props. A user change marks
    /// the widget as interacted with, and if it leads the group every other
    /// member receives the same navigation. Mirrored changes are stored but
    /// never forwarded.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not a live sync-capable widget. Nothing is
    /// written in that case.
    pub fn on_nav_changed(&mut self, id: WidgetId, nav: NavState, origin: ChangeOrigin) -> Result<Vec<Action>, GridError> {
        if id.kind != self.sync.kind() {
            return Err(GridError::UnknownWidget(id));
        }
        let partial = nav.to_props();
        self.registry.merge_props(id, &partial)?;

        let mut actions = Vec::new();
        if origin == ChangeOrigin::User {
            actions.extend(self.note_interaction(id));
        }

        let members = self.sync_members();
        let followers = self.sync.followers(id, origin, &members);
        for follower in &followers {
            self.registry.merge_props(*follower, &partial)?;
            actions.push(Action::SyncApplied { id: *follower, nav });
        }
        if !followers.is_empty() {
            debug!(leader = %id, followers = followers.len(), "navigation mirrored");
        }
        Ok(actions)
    }
}

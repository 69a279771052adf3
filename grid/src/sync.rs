//! Leader/follower synchronization of map viewports.
//!
//! One group per sync-capable kind. When enabled, navigation changes made by
//! the user on the leader are pushed to every other member; followers keep
//! their own style and other settings. Which widget leads depends on the mode:
//!
//! - **All leaders**: whichever member the user last interacted with.
//! - **Primary leader**: one designated member, defaulting to the first.
//!
//! Every change carries a [`ChangeOrigin`]. A follower applying a mirrored
//! change reports it back as [`ChangeOrigin::Mirror`], and mirrored changes are
//! never rebroadcast, so the leader cannot be echoed back into a loop.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::GridError;
use crate::registry::{WidgetId, WidgetKind};

/// How the leader is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    #[default]
    AllLeaders,
    PrimaryLeader,
}

/// Observable state of the sync group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncGroup {
    pub enabled: bool,
    pub mode: SyncMode,
    pub leader_id: Option<WidgetId>,
}

/// Where a navigation change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Direct user input on the widget.
    User,
    /// Applied by the coordinator from the leader.
    Mirror,
}

/// Map camera: the part of a map's props that is shared across the group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavState {
    /// `[longitude, latitude]`.
    pub center: [f64; 2],
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl NavState {
    /// Read navigation from map props. Missing keys yield `None`.
    #[must_use]
    pub fn from_props(props: &serde_json::Value) -> Option<Self> {
        let center = props.get("center")?.as_array()?;
        let [lng, lat] = center.as_slice() else {
            return None;
        };
        Some(Self {
            center: [lng.as_f64()?, lat.as_f64()?],
            zoom: props.get("zoom")?.as_f64()?,
            pitch: props.get("pitch")?.as_f64()?,
            bearing: props.get("bearing")?.as_f64()?,
        })
    }

    /// Partial props object carrying only the navigation keys.
    #[must_use]
    pub fn to_props(&self) -> serde_json::Value {
        json!({
            "center": self.center,
            "zoom": self.zoom,
            "pitch": self.pitch,
            "bearing": self.bearing,
        })
    }
}

/// Tracks the sync group for one widget kind and decides who mirrors whom.
///
/// Membership is not stored: callers pass the current member ids (every live
/// widget of [`SyncCoordinator::kind`], in insertion order) to each operation.
#[derive(Debug)]
pub struct SyncCoordinator {
    kind: WidgetKind,
    group: SyncGroup,
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(kind: WidgetKind) -> Self {
        Self { kind, group: SyncGroup::default() }
    }

    /// Kind whose widgets make up the group.
    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    #[must_use]
    pub fn group(&self) -> SyncGroup {
        self.group
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.group.enabled
    }

    #[must_use]
    pub fn leader(&self) -> Option<WidgetId> {
        self.group.leader_id
    }

    /// Disable sync and forget the leader. Used on dashboard switch.
    pub fn reset(&mut self) {
        self.group = SyncGroup::default();
    }

    /// Set both switches at once and re-derive the leader.
    ///
    /// `source` is the widget whose controls made the change, if any. In
    /// primary mode it becomes the leader, falling back to the first member.
    /// In all-leaders mode it becomes the initial leader, otherwise the current
    /// leader is kept. Disabling clears the leader.
    pub fn configure(&mut self, enabled: bool, mode: SyncMode, source: Option<WidgetId>, members: &[WidgetId]) -> SyncGroup {
        let source = source.filter(|id| members.contains(id));
        let current = self.group.leader_id.filter(|id| members.contains(id));
        let leader_id = match (enabled, mode) {
            (false, _) => None,
            (true, SyncMode::PrimaryLeader) => source.or_else(|| members.first().copied()),
            (true, SyncMode::AllLeaders) => source.or(current),
        };
        self.group = SyncGroup { enabled, mode, leader_id };
        info!(enabled, ?mode, leader = ?leader_id.map(|id| id.to_string()), "sync group configured");
        self.group
    }

    pub fn set_enabled(&mut self, enabled: bool, source: Option<WidgetId>, members: &[WidgetId]) -> SyncGroup {
        self.configure(enabled, self.group.mode, source, members)
    }

    pub fn set_mode(&mut self, mode: SyncMode, source: Option<WidgetId>, members: &[WidgetId]) -> SyncGroup {
        self.configure(self.group.enabled, mode, source, members)
    }

    /// Note that the user interacted with `id`.
    ///
    /// In all-leaders mode the widget becomes the leader. Returns whether the
    /// leader changed.
    pub fn on_interaction(&mut self, id: WidgetId, members: &[WidgetId]) -> bool {
        if !self.group.enabled || self.group.mode != SyncMode::AllLeaders || !members.contains(&id) {
            return false;
        }
        if self.group.leader_id == Some(id) {
            return false;
        }
        self.group.leader_id = Some(id);
        debug!(%id, "sync leader taken by interaction");
        true
    }

    /// Designate `id` as the leader. The previous leader becomes a follower.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not a current member.
    pub fn assign_primary(&mut self, id: WidgetId, members: &[WidgetId]) -> Result<SyncGroup, GridError> {
        if !members.contains(&id) {
            return Err(GridError::UnknownWidget(id));
        }
        self.group.leader_id = Some(id);
        info!(%id, "sync leader assigned");
        Ok(self.group)
    }

    /// Members that should mirror a change reported by `source`.
    ///
    /// Empty unless sync is enabled, the change came from the user, and
    /// `source` is the leader.
    #[must_use]
    pub fn followers(&self, source: WidgetId, origin: ChangeOrigin, members: &[WidgetId]) -> Vec<WidgetId> {
        if origin == ChangeOrigin::Mirror || !self.group.enabled || self.group.leader_id != Some(source) {
            return Vec::new();
        }
        members.iter().copied().filter(|id| *id != source).collect()
    }

    /// Drop a deleted widget from leadership.
    ///
    /// `members` is the membership after removal. A removed primary leader
    /// hands over to the first remaining member. Returns whether the group
    /// changed.
    pub fn on_widget_removed(&mut self, id: WidgetId, members: &[WidgetId]) -> bool {
        if self.group.leader_id != Some(id) {
            return false;
        }
        self.group.leader_id = match self.group.mode {
            SyncMode::PrimaryLeader if self.group.enabled => members.first().copied(),
            _ => None,
        };
        info!(removed = %id, leader = ?self.group.leader_id.map(|id| id.to_string()), "sync leader removed");
        true
    }
}

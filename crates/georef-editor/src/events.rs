//! Change notifications.
//!
//! Each editor owns one [`Listeners`] table. Listeners are plain callables
//! registered per event kind and removed by `Rc` identity.

use georef_core::{GeoCorners, Shape};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// The first shape was finalized by a create gesture.
    BoundsCreated,
    /// A move, resize or rotate gesture finished, or corners were set.
    TransformChanged,
    /// The editor switched between create and edit mode.
    ModeChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::BoundsCreated,
        EventKind::TransformChanged,
        EventKind::ModeChanged,
    ];

    fn slot(self) -> usize {
        match self {
            Self::BoundsCreated => 0,
            Self::TransformChanged => 1,
            Self::ModeChanged => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BoundsCreated => "boundsCreated",
            Self::TransformChanged => "transformChanged",
            Self::ModeChanged => "modeChanged",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Create mode: no shape yet. Edit mode: a shape exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorMode {
    #[default]
    Create,
    Edit,
}

/// What listeners receive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub event: EventKind,
    pub mode: EditorMode,
    pub shape: Option<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_corners: Option<GeoCorners>,
}

pub type Listener = Rc<dyn Fn(&StateSnapshot)>;

#[derive(Default)]
pub struct Listeners {
    slots: [SmallVec<[Listener; 2]>; 3],
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("bounds_created", &self.slots[0].len())
            .field("transform_changed", &self.slots[1].len())
            .field("mode_changed", &self.slots[2].len())
            .finish()
    }
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EventKind, listener: Listener) {
        self.slots[kind.slot()].push(listener);
    }

    /// Remove one registration of `listener`. Returns whether it was found.
    pub fn remove(&mut self, kind: EventKind, listener: &Listener) -> bool {
        let slot = &mut self.slots[kind.slot()];
        match slot.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(i) => {
                slot.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, kind: EventKind) {
        self.slots[kind.slot()].clear();
    }

    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.slots[kind.slot()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(SmallVec::is_empty)
    }

    /// Call every listener registered for `snapshot.event`, in
    /// registration order.
    pub fn emit(&self, snapshot: &StateSnapshot) {
        let slot = &self.slots[snapshot.event.slot()];
        log::trace!("emit {:?} to {} listener(s)", snapshot.event, slot.len());
        for listener in slot {
            listener(snapshot);
        }
    }
}

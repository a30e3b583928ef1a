//! Input abstraction layer.
//!
//! Normalizes DOM mouse, touch, wheel and keyboard events into a single
//! `InputEvent` enum consumed by the editor facade.

use georef_core::PointerCoords;
use kurbo::Vec2;

/// Key code that toggles pan mode while held.
pub const PAN_KEY: &str = "Space";

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
}

/// Unit of a wheel delta (`WheelEvent.deltaMode`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map the DOM constant (0, 1, 2). Unknown values are treated as pixels.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    /// Pixels per delta unit.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Pixel => 1.0,
            Self::Line => 16.0,
            Self::Page => 100.0,
        }
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse down or touch start.
    PointerDown { coords: PointerCoords },
    /// Mouse move or touch move.
    PointerMove { coords: PointerCoords },
    /// Mouse up or touch end.
    PointerUp { coords: PointerCoords },
    /// Pointer left the canvas; ends any gesture like a pointer-up.
    PointerLeave,
    Wheel {
        coords: PointerCoords,
        delta: Vec2,
        mode: DeltaMode,
        modifiers: Modifiers,
    },
    KeyDown { code: String },
    KeyUp { code: String },
}

impl InputEvent {
    pub fn coords(&self) -> Option<&PointerCoords> {
        match self {
            Self::PointerDown { coords }
            | Self::PointerMove { coords }
            | Self::PointerUp { coords }
            | Self::Wheel { coords, .. } => Some(coords),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        !matches!(self, Self::KeyDown { .. } | Self::KeyUp { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn delta_mode_normalization() {
        assert_eq!(DeltaMode::from_dom(0).multiplier(), 1.0);
        assert_eq!(DeltaMode::from_dom(1).multiplier(), 16.0);
        assert_eq!(DeltaMode::from_dom(2).multiplier(), 100.0);
        assert_eq!(DeltaMode::from_dom(7), DeltaMode::Pixel);
    }

    #[test]
    fn coords_only_on_pointer_events() {
        let down = InputEvent::PointerDown {
            coords: PointerCoords::mouse(1.0, 2.0),
        };
        assert!(down.coords().is_some());
        assert!(down.is_pointer());

        let key = InputEvent::KeyDown {
            code: PAN_KEY.to_string(),
        };
        assert!(key.coords().is_none());
        assert!(!key.is_pointer());
        assert!(InputEvent::PointerLeave.coords().is_none());
    }
}

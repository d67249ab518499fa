//! Input events and the unified carry state.
//!
//! Pointer-drag and touch-drag feed the same [`Carry`]; the origin tag keeps
//! the two streams from interleaving within one gesture.

use serde::{Deserialize, Serialize};

use crate::targets::Point;

/// Which input stream started a carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarryOrigin {
    Pointer,
    Touch,
}

/// An answer in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarriedItem {
    /// Answer text being carried.
    pub answer: String,
    /// Position of the answer in the presentation order.
    pub index: usize,
    pub origin: CarryOrigin,
    /// Last known touch position; always `None` for pointer carries.
    pub position: Option<Point>,
    /// Drop slot under the touch point, for highlighting only.
    pub hovered: Option<usize>,
}

/// At most one carried item exists per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Carry {
    #[default]
    Idle,
    Active(CarriedItem),
}

impl Carry {
    pub fn is_active(&self) -> bool {
        matches!(self, Carry::Active(_))
    }

    pub fn item(&self) -> Option<&CarriedItem> {
        match self {
            Carry::Active(item) => Some(item),
            Carry::Idle => None,
        }
    }

    /// The active item, if it was started by `origin`.
    pub fn item_from(&self, origin: CarryOrigin) -> Option<&CarriedItem> {
        self.item().filter(|item| item.origin == origin)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.item().and_then(|item| item.hovered)
    }
}

/// A host input event, already stripped of platform details.
///
/// Touch events carry every contact point the platform reported; coordinates
/// that are missing on the host side should be passed as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer drag began on the answer at `item` in presentation order.
    DragStart { item: usize },
    /// Pointer drag released over the drop slot `slot`.
    Drop { slot: usize },
    /// Pointer drag ended anywhere other than a drop slot.
    DragCancel,
    /// Touch began on the answer at `item`.
    TouchStart { item: usize, touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    /// Touch lifted; `changed` holds the lifted contact points.
    TouchEnd { changed: Vec<Point> },
    TouchCancel,
}

impl InputEvent {
    pub fn touch_start(item: usize, x: f64, y: f64) -> Self {
        InputEvent::TouchStart {
            item,
            touches: vec![Point::new(x, y)],
        }
    }

    pub fn touch_move(x: f64, y: f64) -> Self {
        InputEvent::TouchMove {
            touches: vec![Point::new(x, y)],
        }
    }

    pub fn touch_end(x: f64, y: f64) -> Self {
        InputEvent::TouchEnd {
            changed: vec![Point::new(x, y)],
        }
    }

    /// Input stream this event belongs to.
    pub fn origin(&self) -> CarryOrigin {
        match self {
            InputEvent::DragStart { .. } | InputEvent::Drop { .. } | InputEvent::DragCancel => {
                CarryOrigin::Pointer
            }
            InputEvent::TouchStart { .. }
            | InputEvent::TouchMove { .. }
            | InputEvent::TouchEnd { .. }
            | InputEvent::TouchCancel => CarryOrigin::Touch,
        }
    }
}

/// The single usable contact point of a touch list.
///
/// `None` for multi-touch, empty lists, and non-finite coordinates.
pub(crate) fn single_touch(touches: &[Point]) -> Option<Point> {
    match touches {
        [point] if point.is_valid() => Some(*point),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_touch_rejects_gestures_and_bad_coordinates() {
        assert_eq!(
            single_touch(&[Point::new(1.0, 2.0)]),
            Some(Point::new(1.0, 2.0))
        );
        assert_eq!(single_touch(&[]), None);
        assert_eq!(
            single_touch(&[Point::new(1.0, 2.0), Point::new(3.0, 4.0)]),
            None
        );
        assert_eq!(single_touch(&[Point::new(f64::NAN, 2.0)]), None);
    }

    #[test]
    fn events_deserialize_from_tagged_toml() {
        let event: InputEvent = toml::from_str(
            r#"
kind = "touch_start"
item = 2
touches = [{ x = 10.0, y = 20.0 }]
"#,
        )
        .unwrap();
        assert_eq!(event, InputEvent::touch_start(2, 10.0, 20.0));
        assert_eq!(event.origin(), CarryOrigin::Touch);
        assert_eq!(InputEvent::DragCancel.origin(), CarryOrigin::Pointer);
    }
}

//! Drop-slot hit-testing.
//!
//! Touch input only carries coordinates, so the engine asks the host which
//! drop slot sits under a point. [`DropTargets`] is that query;
//! [`DropZoneLayout`] answers it from a list of registered rectangles.

use serde::{Deserialize, Serialize};

/// A screen coordinate in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// The host's "topmost drop slot under this point" query.
pub trait DropTargets {
    /// Slot index of the topmost drop target containing `point`, if any.
    fn slot_at(&self, point: Point) -> Option<usize>;
}

/// A host with no registered drop targets.
pub struct NoTargets;

impl DropTargets for NoTargets {
    fn slot_at(&self, _: Point) -> Option<usize> {
        None
    }
}

/// One registered drop region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    /// Prompt slot this region belongs to.
    pub slot: usize,
    pub rect: Rect,
    /// Stacking order; higher is on top.
    #[serde(default)]
    pub z: i32,
}

/// Drop regions registered by a host layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropZoneLayout {
    #[serde(default)]
    zones: Vec<DropZone>,
}

impl DropZoneLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single column of equally sized slots, one per prompt.
    pub fn column(slots: usize, origin: Point, width: f64, row_height: f64) -> Self {
        let zones = (0..slots)
            .map(|slot| DropZone {
                slot,
                rect: Rect::new(
                    origin.x,
                    origin.y + slot as f64 * row_height,
                    width,
                    row_height,
                ),
                z: 0,
            })
            .collect();
        Self { zones }
    }

    pub fn register(&mut self, slot: usize, rect: Rect, z: i32) -> &mut Self {
        self.zones.push(DropZone { slot, rect, z });
        self
    }

    pub fn zones(&self) -> &[DropZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl DropTargets for DropZoneLayout {
    fn slot_at(&self, point: Point) -> Option<usize> {
        if !point.is_valid() {
            return None;
        }
        // Ties on `z` go to the zone registered last, which paints over earlier ones.
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, zone)| zone.rect.contains(point))
            .max_by_key(|(order, zone)| (zone.z, *order))
            .map(|(_, zone)| zone.slot)
    }
}

impl From<Vec<DropZone>> for DropZoneLayout {
    fn from(zones: Vec<DropZone>) -> Self {
        Self { zones }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_layout_resolves_rows() {
        let layout = DropZoneLayout::column(3, Point::new(0.0, 0.0), 200.0, 50.0);
        assert_eq!(layout.slot_at(Point::new(10.0, 10.0)), Some(0));
        assert_eq!(layout.slot_at(Point::new(10.0, 120.0)), Some(2));
        assert_eq!(layout.slot_at(Point::new(250.0, 10.0)), None);
        assert_eq!(layout.slot_at(Point::new(10.0, 400.0)), None);
    }

    #[test]
    fn topmost_zone_wins_on_overlap() {
        let mut layout = DropZoneLayout::new();
        layout
            .register(0, Rect::new(0.0, 0.0, 100.0, 100.0), 1)
            .register(1, Rect::new(50.0, 50.0, 100.0, 100.0), 0);
        assert_eq!(layout.slot_at(Point::new(75.0, 75.0)), Some(0));

        layout.register(2, Rect::new(60.0, 60.0, 10.0, 10.0), 1);
        assert_eq!(layout.slot_at(Point::new(65.0, 65.0)), Some(2));
    }

    #[test]
    fn invalid_points_never_hit() {
        let layout = DropZoneLayout::column(1, Point::new(0.0, 0.0), 100.0, 100.0);
        assert_eq!(layout.slot_at(Point::new(f64::NAN, 10.0)), None);
        assert_eq!(layout.slot_at(Point::new(10.0, f64::INFINITY)), None);
        assert_eq!(NoTargets.slot_at(Point::new(10.0, 10.0)), None);
    }
}

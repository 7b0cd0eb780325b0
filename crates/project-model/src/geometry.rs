//! Canvas geometry: element frames and the pure drag/resize/rotate transforms.
//!
//! All coordinates are canvas pixels with `(0, 0)` at the top-left corner.
//! Rotation is in degrees, clockwise, normalized to `[0, 360)`.

use serde::{Deserialize, Serialize};

/// Smallest width an element may have.
pub const MIN_ELEMENT_WIDTH: f64 = 50.0;

/// Smallest height an element may have.
pub const MIN_ELEMENT_HEIGHT: f64 = 30.0;

/// Distance (px) within which a pointer grabs a resize handle.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Distance (px) of the rotate handle above the element's top edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    pub fn delta_from(&self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Divide both coordinates, e.g. to undo a display zoom.
    pub fn scaled(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Size of the drawable canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self::new(450.0, 800.0)
    }
}

/// One of the four corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    fn north(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }

    fn west(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    /// Handle position in element-local coordinates (origin at top-left,
    /// unrotated).
    fn local_anchor(self, width: f64, height: f64) -> Point {
        let x = if self.west() { 0.0 } else { width };
        let y = if self.north() { 0.0 } else { height };
        Point::new(x, y)
    }
}

/// Which part of an element a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    Body,
    Resize(ResizeHandle),
    Rotate,
}

/// Position, size and rotation of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementFrame {
    /// Left edge of the unrotated box.
    pub x: f64,
    /// Top edge of the unrotated box.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation about the box center, degrees in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
}

impl ElementFrame {
    /// Create a frame, enforcing the minimum size and normalizing rotation.
    pub fn new(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        let mut frame = Self {
            x,
            y,
            width,
            height,
            rotation,
        };
        frame.enforce_invariants();
        frame
    }

    /// Clamp size to the minimums and normalize rotation. Non-finite values
    /// are replaced with the nearest sane value.
    pub fn enforce_invariants(&mut self) {
        if !self.x.is_finite() {
            self.x = 0.0;
        }
        if !self.y.is_finite() {
            self.y = 0.0;
        }
        self.width = finite_or(self.width, MIN_ELEMENT_WIDTH).max(MIN_ELEMENT_WIDTH);
        self.height = finite_or(self.height, MIN_ELEMENT_HEIGHT).max(MIN_ELEMENT_HEIGHT);
        self.rotation = normalize_rotation(self.rotation);
    }

    /// Center of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge of the unrotated box.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge of the unrotated box.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Map a canvas point into this element's unrotated local space
    /// (origin at the box's top-left corner).
    pub fn to_local(&self, p: Point) -> Point {
        let c = self.center();
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        Point::new(
            dx * cos - dy * sin + self.width / 2.0,
            dx * sin + dy * cos + self.height / 2.0,
        )
    }

    /// Whether a canvas point lies inside the rotated box.
    pub fn contains(&self, p: Point) -> bool {
        let local = self.to_local(p);
        local.x >= 0.0 && local.x <= self.width && local.y >= 0.0 && local.y <= self.height
    }

    /// Classify a canvas point against the handles and body of this element.
    /// Handles take precedence over the body.
    pub fn hit_region(&self, p: Point) -> Option<HitRegion> {
        let local = self.to_local(p);

        let rotate_anchor = Point::new(self.width / 2.0, -ROTATE_HANDLE_OFFSET);
        if local.distance_to(&rotate_anchor) <= HANDLE_RADIUS {
            return Some(HitRegion::Rotate);
        }

        for handle in ResizeHandle::ALL {
            let anchor = handle.local_anchor(self.width, self.height);
            if local.distance_to(&anchor) <= HANDLE_RADIUS {
                return Some(HitRegion::Resize(handle));
            }
        }

        if self.contains(p) {
            Some(HitRegion::Body)
        } else {
            None
        }
    }
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Move an element by a pointer delta, keeping it fully inside the canvas.
///
/// Position and size come from the frame captured at gesture start; the
/// delta is measured from the gesture's starting pointer position.
pub fn translate(start: &ElementFrame, delta: Point, bounds: CanvasBounds) -> ElementFrame {
    // max(0, min(limit, v)) rather than clamp: an element wider than the
    // canvas pins to the top-left instead of panicking on an inverted range
    let max_x = bounds.width - start.width;
    let max_y = bounds.height - start.height;
    ElementFrame {
        x: (start.x + delta.x).min(max_x).max(0.0),
        y: (start.y + delta.y).min(max_y).max(0.0),
        ..*start
    }
}

/// Resize an element by dragging one of its corner handles.
///
/// The edges opposite the handle stay fixed. Sizes floor at the minimums;
/// at the floor the position is derived from the clamped size so the fixed
/// edge never drifts.
pub fn resize(start: &ElementFrame, delta: Point, handle: ResizeHandle) -> ElementFrame {
    let mut next = *start;

    if handle.west() {
        next.width = (start.width - delta.x).max(MIN_ELEMENT_WIDTH);
        next.x = start.x + (start.width - next.width);
    } else {
        next.width = (start.width + delta.x).max(MIN_ELEMENT_WIDTH);
    }

    if handle.north() {
        next.height = (start.height - delta.y).max(MIN_ELEMENT_HEIGHT);
        next.y = start.y + (start.height - next.height);
    } else {
        next.height = (start.height + delta.y).max(MIN_ELEMENT_HEIGHT);
    }

    next
}

/// New rotation after the pointer moved from `pointer_start` to
/// `pointer_now`, measured as the signed angle swept around the element's
/// center and added to the rotation at gesture start.
pub fn rotate(start: &ElementFrame, pointer_start: Point, pointer_now: Point) -> f64 {
    let c = start.center();
    let a0 = (pointer_start.y - c.y).atan2(pointer_start.x - c.x);
    let a1 = (pointer_now.y - c.y).atan2(pointer_now.x - c.x);
    normalize_rotation(start.rotation + (a1 - a0).to_degrees())
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame() -> ElementFrame {
        ElementFrame::new(100.0, 100.0, 200.0, 100.0, 0.0)
    }

    #[test]
    fn test_new_clamps_minimum_size() {
        let f = ElementFrame::new(0.0, 0.0, 10.0, 5.0, 0.0);
        assert_eq!(f.width, MIN_ELEMENT_WIDTH);
        assert_eq!(f.height, MIN_ELEMENT_HEIGHT);
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(370.0), 10.0);
        assert_eq!(normalize_rotation(-90.0), 270.0);
        assert_eq!(normalize_rotation(360.0), 0.0);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
        assert!(normalize_rotation(-1e-20) < 360.0);
    }

    #[test]
    fn test_translate_clamps_to_canvas() {
        let bounds = CanvasBounds::new(450.0, 800.0);
        let moved = translate(&frame(), Point::new(1000.0, -500.0), bounds);
        assert_eq!(moved.x, 250.0);
        assert_eq!(moved.y, 0.0);
        assert_eq!(moved.width, 200.0);
    }

    #[test]
    fn test_translate_element_wider_than_canvas_pins_left() {
        let wide = ElementFrame::new(0.0, 0.0, 600.0, 50.0, 0.0);
        let moved = translate(&wide, Point::new(40.0, 0.0), CanvasBounds::new(450.0, 800.0));
        assert_eq!(moved.x, 0.0);
    }

    #[test]
    fn test_resize_west_keeps_right_edge() {
        let start = frame();
        let resized = resize(&start, Point::new(30.0, 0.0), ResizeHandle::Sw);
        assert_eq!(resized.width, 170.0);
        assert_eq!(resized.right(), start.right());
    }

    #[test]
    fn test_resize_nw_floor_has_no_drift() {
        let start = frame();
        let resized = resize(&start, Point::new(500.0, 500.0), ResizeHandle::Nw);
        assert_eq!(resized.width, MIN_ELEMENT_WIDTH);
        assert_eq!(resized.height, MIN_ELEMENT_HEIGHT);
        assert_eq!(resized.right(), start.right());
        assert_eq!(resized.bottom(), start.bottom());
    }

    #[test]
    fn test_resize_ne_grows_up_and_right() {
        let start = frame();
        let resized = resize(&start, Point::new(20.0, -10.0), ResizeHandle::Ne);
        assert_eq!(resized.x, start.x);
        assert_eq!(resized.width, 220.0);
        assert_eq!(resized.height, 110.0);
        assert_eq!(resized.bottom(), start.bottom());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let start = frame();
        let c = start.center();
        let r = rotate(
            &start,
            Point::new(c.x + 50.0, c.y),
            Point::new(c.x, c.y + 50.0),
        );
        assert!((r - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_is_relative_to_grab_point() {
        let mut start = frame();
        start.rotation = 30.0;
        let c = start.center();
        // grabbing anywhere and not moving leaves rotation unchanged
        let p = Point::new(c.x - 13.0, c.y + 70.0);
        assert!((rotate(&start, p, p) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_region_unrotated() {
        let f = frame();
        assert_eq!(f.hit_region(Point::new(200.0, 150.0)), Some(HitRegion::Body));
        assert_eq!(
            f.hit_region(Point::new(300.0, 200.0)),
            Some(HitRegion::Resize(ResizeHandle::Se))
        );
        assert_eq!(
            f.hit_region(Point::new(101.0, 99.0)),
            Some(HitRegion::Resize(ResizeHandle::Nw))
        );
        assert_eq!(
            f.hit_region(Point::new(200.0, 100.0 - ROTATE_HANDLE_OFFSET)),
            Some(HitRegion::Rotate)
        );
        assert_eq!(f.hit_region(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_hit_region_follows_rotation() {
        let mut f = frame();
        f.rotation = 90.0;
        // after a quarter turn the local top-left corner sits at the
        // top-right of the rotated footprint
        let c = f.center();
        let nw = Point::new(c.x + f.height / 2.0, c.y - f.width / 2.0);
        assert_eq!(f.hit_region(nw), Some(HitRegion::Resize(ResizeHandle::Nw)));
        // a point inside the unrotated box but outside the rotated one
        assert_eq!(f.hit_region(Point::new(110.0, 140.0)), None);
    }

    proptest! {
        #[test]
        fn prop_resize_se_only_grows_with_positive_delta(dx in 0.0f64..500.0, dy in 0.0f64..500.0) {
            let start = frame();
            let r = resize(&start, Point::new(dx, dy), ResizeHandle::Se);
            prop_assert_eq!(r.x, start.x);
            prop_assert_eq!(r.y, start.y);
            prop_assert!(r.width >= start.width);
            prop_assert!(r.height >= start.height);
        }

        #[test]
        fn prop_resize_nw_keeps_bottom_right_fixed(dx in -300.0f64..800.0, dy in -300.0f64..800.0) {
            let start = frame();
            let r = resize(&start, Point::new(dx, dy), ResizeHandle::Nw);
            prop_assert!((r.right() - start.right()).abs() < 1e-9);
            prop_assert!((r.bottom() - start.bottom()).abs() < 1e-9);
            prop_assert!(r.width >= MIN_ELEMENT_WIDTH);
            prop_assert!(r.height >= MIN_ELEMENT_HEIGHT);
        }

        #[test]
        fn prop_translate_stays_inside_canvas(dx in -2000.0f64..2000.0, dy in -2000.0f64..2000.0) {
            let bounds = CanvasBounds::new(450.0, 800.0);
            let r = translate(&frame(), Point::new(dx, dy), bounds);
            prop_assert!(r.x >= 0.0 && r.right() <= bounds.width);
            prop_assert!(r.y >= 0.0 && r.bottom() <= bounds.height);
        }

        #[test]
        fn prop_full_revolution_returns_to_start(start_rot in 0.0f64..360.0, grab in 0.0f64..std::f64::consts::TAU) {
            let mut start = frame();
            start.rotation = start_rot;
            let c = start.center();
            let at = |theta: f64| Point::new(c.x + 80.0 * theta.cos(), c.y + 80.0 * theta.sin());

            // sweep a full circle in small steps, re-anchoring the gesture as
            // the pointer travels, the way successive moves are applied
            let mut current = start;
            let steps = 64;
            for i in 0..steps {
                let a = grab + std::f64::consts::TAU * i as f64 / steps as f64;
                let b = grab + std::f64::consts::TAU * (i + 1) as f64 / steps as f64;
                current.rotation = rotate(&current, at(a), at(b));
            }
            let diff = (current.rotation - start_rot).rem_euclid(360.0);
            prop_assert!(diff < 1e-6 || (360.0 - diff) < 1e-6);
        }
    }
}

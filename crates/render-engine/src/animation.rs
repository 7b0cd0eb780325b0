//! Entrance animations and the per-element draw transform.

use slidecast_project_model::{Animation, ElementFrame};
use tiny_skia::Transform;

/// Animation-adjusted draw parameters for one element at one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Uniform scale about the element center.
    pub scale: f64,
}

impl AnimationState {
    /// Fully shown, no offset.
    pub const IDENTITY: Self = Self {
        alpha: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Evaluate an entrance animation. `progress` is clamped to `[0, 1]`;
/// slide distances are fractions of the surface size.
pub fn animation_state(
    animation: Animation,
    progress: f64,
    surface_width: f64,
    surface_height: f64,
) -> AnimationState {
    let p = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let remaining = 1.0 - p;

    match animation {
        Animation::None | Animation::Rotate => AnimationState::IDENTITY,
        Animation::FadeIn => AnimationState {
            alpha: p,
            ..AnimationState::IDENTITY
        },
        Animation::SlideInLeft => AnimationState {
            alpha: p,
            translate_x: remaining * -0.25 * surface_width,
            ..AnimationState::IDENTITY
        },
        Animation::SlideInRight => AnimationState {
            alpha: p,
            translate_x: remaining * 0.25 * surface_width,
            ..AnimationState::IDENTITY
        },
        Animation::SlideInUp => AnimationState {
            alpha: p,
            translate_y: remaining * 0.2 * surface_height,
            ..AnimationState::IDENTITY
        },
        // enters from above, mirroring slide-up
        Animation::SlideInDown => AnimationState {
            alpha: p,
            translate_y: remaining * -0.2 * surface_height,
            ..AnimationState::IDENTITY
        },
        Animation::ZoomIn => AnimationState {
            alpha: p,
            scale: 0.5 + 0.5 * p,
            ..AnimationState::IDENTITY
        },
    }
}

/// Canvas-space transform for drawing an element.
///
/// Applied to element-space points right to left: animation offset, move
/// the center to the origin, scale, rotate, move back. Rotation and scale
/// therefore pivot on the element center.
pub fn element_transform(frame: &ElementFrame, state: &AnimationState) -> Transform {
    let c = frame.center();
    let (cx, cy) = (c.x as f32, c.y as f32);
    let scale = state.scale as f32;

    Transform::from_translate(cx, cy)
        .pre_concat(Transform::from_rotate(frame.rotation as f32))
        .pre_scale(scale, scale)
        .pre_translate(-cx, -cy)
        .pre_translate(state.translate_x as f32, state.translate_y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Point;

    const W: f64 = 450.0;
    const H: f64 = 800.0;

    fn map(t: Transform, x: f32, y: f32) -> (f32, f32) {
        let mut p = [Point::from_xy(x, y)];
        t.map_points(&mut p);
        (p[0].x, p[0].y)
    }

    #[test]
    fn test_fade_in_alpha_tracks_progress() {
        assert_eq!(animation_state(Animation::FadeIn, 0.0, W, H).alpha, 0.0);
        assert_eq!(animation_state(Animation::FadeIn, 0.5, W, H).alpha, 0.5);
        assert_eq!(animation_state(Animation::FadeIn, 1.0, W, H).alpha, 1.0);
    }

    #[test]
    fn test_slides_start_offset_and_settle() {
        let left = animation_state(Animation::SlideInLeft, 0.0, W, H);
        assert_eq!(left.translate_x, -112.5);
        let right = animation_state(Animation::SlideInRight, 0.0, W, H);
        assert_eq!(right.translate_x, 112.5);
        let up = animation_state(Animation::SlideInUp, 0.0, W, H);
        assert_eq!(up.translate_y, 160.0);
        for anim in [Animation::SlideInLeft, Animation::SlideInRight, Animation::SlideInUp] {
            assert_eq!(animation_state(anim, 1.0, W, H), AnimationState::IDENTITY);
        }
    }

    #[test]
    fn test_slide_in_down_mirrors_slide_in_up() {
        let up = animation_state(Animation::SlideInUp, 0.25, W, H);
        let down = animation_state(Animation::SlideInDown, 0.25, W, H);
        assert_eq!(down.translate_y, -up.translate_y);
        assert_eq!(down.alpha, up.alpha);
        assert!((down.translate_y + 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_in_scales_from_half() {
        let start = animation_state(Animation::ZoomIn, 0.0, W, H);
        assert_eq!((start.scale, start.alpha), (0.5, 0.0));
        let mid = animation_state(Animation::ZoomIn, 0.5, W, H);
        assert_eq!(mid.scale, 0.75);
    }

    #[test]
    fn test_none_and_rotate_are_static() {
        for p in [0.0, 0.3, 1.0] {
            assert_eq!(animation_state(Animation::None, p, W, H), AnimationState::IDENTITY);
            assert_eq!(animation_state(Animation::Rotate, p, W, H), AnimationState::IDENTITY);
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(animation_state(Animation::FadeIn, -1.0, W, H).alpha, 0.0);
        assert_eq!(animation_state(Animation::FadeIn, 7.0, W, H).alpha, 1.0);
    }

    #[test]
    fn test_transform_pivots_on_center() {
        let frame = ElementFrame::new(100.0, 100.0, 200.0, 100.0, 90.0);
        let state = AnimationState {
            scale: 0.5,
            ..AnimationState::IDENTITY
        };
        let t = element_transform(&frame, &state);

        // the center is a fixed point
        let (x, y) = map(t, 200.0, 150.0);
        assert!((x - 200.0).abs() < 1e-3 && (y - 150.0).abs() < 1e-3);

        // the right-middle point ends up half as far away, a quarter turn clockwise
        let (x, y) = map(t, 300.0, 150.0);
        assert!((x - 200.0).abs() < 1e-3, "x = {x}");
        assert!((y - 200.0).abs() < 1e-3, "y = {y}");
    }

    #[test]
    fn test_unrotated_offset_is_plain_translation() {
        let frame = ElementFrame::new(10.0, 10.0, 100.0, 100.0, 0.0);
        let state = animation_state(Animation::SlideInUp, 0.0, W, H);
        let (x, y) = map(element_transform(&frame, &state), 10.0, 10.0);
        assert!((x - 10.0).abs() < 1e-3);
        assert!((y - 170.0).abs() < 1e-3);
    }
}

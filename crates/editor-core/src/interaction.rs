//! Pointer gesture state machine.
//!
//! `Idle -> {Dragging, Resizing, Rotating} -> Idle`. A gesture captures the
//! pointer and element frame at pointer-down; every move recomputes the
//! element from that start state, so intermediate frames never accumulate
//! error. Pointer-up always returns to `Idle` and reports the finished
//! gesture so the caller can commit exactly one history entry for it.

use slidecast_project_model::{
    resize, rotate, translate, CanvasBounds, ElementFrame, HitRegion, Page, Point, Project,
    ResizeHandle,
};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTarget {
    /// Element index on the current page.
    pub element: usize,
    pub region: HitRegion,
}

/// Start state shared by every gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStart {
    /// Page the element lives on.
    pub page: usize,
    pub element: usize,
    pub pointer_start: Point,
    pub element_start: ElementFrame,
}

/// Interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(GestureStart),
    Resizing {
        start: GestureStart,
        handle: ResizeHandle,
    },
    Rotating(GestureStart),
}

/// A completed gesture, reported on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishedGesture {
    pub kind: GestureKind,
    pub page: usize,
    pub element: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
    Rotate,
}

/// Find the topmost element under a point. Later elements paint on top, so
/// they are tested first.
pub fn hit_test(page: &Page, p: Point) -> Option<HitTarget> {
    page.elements
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, element)| {
            element.frame.hit_region(p).map(|region| HitTarget {
                element: index,
                region,
            })
        })
}

/// Translates pointer events into geometry updates.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Begin a gesture on `target`. Returns the gesture that was still
    /// active, if any; it has been ended and the caller should commit it.
    pub fn pointer_down(
        &mut self,
        project: &Project,
        target: HitTarget,
        pointer: Point,
    ) -> Option<FinishedGesture> {
        let stale = self.pointer_up();
        if stale.is_some() {
            tracing::warn!("Pointer-down during an active gesture; ending the previous gesture");
        }

        let Some(element) = project.current_page().elements.get(target.element) else {
            tracing::warn!(element = target.element, "Pointer-down on a missing element");
            return stale;
        };

        let start = GestureStart {
            page: project.current_page_index(),
            element: target.element,
            pointer_start: pointer,
            element_start: element.frame,
        };

        self.state = match target.region {
            HitRegion::Body => InteractionState::Dragging(start),
            HitRegion::Resize(handle) => InteractionState::Resizing { start, handle },
            HitRegion::Rotate => InteractionState::Rotating(start),
        };
        stale
    }

    /// Apply a pointer move. Returns whether the element changed.
    ///
    /// Moves while idle, or for an element that no longer exists (the
    /// project was replaced mid-gesture), are ignored.
    pub fn pointer_move(&self, project: &mut Project, pointer: Point, bounds: CanvasBounds) -> bool {
        let (start, next) = match self.state {
            InteractionState::Idle => return false,
            InteractionState::Dragging(start) => {
                let delta = pointer.delta_from(start.pointer_start);
                (start, translate(&start.element_start, delta, bounds))
            }
            InteractionState::Resizing { start, handle } => {
                let delta = pointer.delta_from(start.pointer_start);
                (start, resize(&start.element_start, delta, handle))
            }
            InteractionState::Rotating(start) => {
                let rotation = rotate(&start.element_start, start.pointer_start, pointer);
                (
                    start,
                    ElementFrame {
                        rotation,
                        ..start.element_start
                    },
                )
            }
        };

        if project.current_page_index() != start.page {
            return false;
        }
        match project.element_mut(start.element) {
            Some(element) if element.frame != next => {
                element.frame = next;
                true
            }
            _ => false,
        }
    }

    /// End the active gesture, if any, and return to `Idle`.
    pub fn pointer_up(&mut self) -> Option<FinishedGesture> {
        let finished = match std::mem::take(&mut self.state) {
            InteractionState::Idle => None,
            InteractionState::Dragging(s) => Some((GestureKind::Drag, s)),
            InteractionState::Resizing { start, .. } => Some((GestureKind::Resize, start)),
            InteractionState::Rotating(s) => Some((GestureKind::Rotate, s)),
        };
        finished.map(|(kind, start)| FinishedGesture {
            kind,
            page: start.page,
            element: start.element,
        })
    }

    /// Drop the active gesture without reporting it, used when the live
    /// project is replaced wholesale (undo/redo) mid-gesture.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidecast_project_model::{Element, MIN_ELEMENT_WIDTH};

    fn project_with_text() -> Project {
        let mut project = Project::new();
        project.add_element(Element::new_text()); // 100,100 250x80
        project
    }

    fn bounds() -> CanvasBounds {
        CanvasBounds::new(450.0, 800.0)
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut project = project_with_text();
        project.add_element(Element::new_text());
        let hit = hit_test(project.current_page(), Point::new(200.0, 140.0)).unwrap();
        assert_eq!(hit.element, 1);
        assert_eq!(hit.region, HitRegion::Body);
    }

    #[test]
    fn test_drag_moves_from_start_frame() {
        let mut project = project_with_text();
        let mut ctl = InteractionController::new();
        let target = HitTarget {
            element: 0,
            region: HitRegion::Body,
        };
        ctl.pointer_down(&project, target, Point::new(150.0, 120.0));

        assert!(ctl.pointer_move(&mut project, Point::new(160.0, 130.0), bounds()));
        assert!(ctl.pointer_move(&mut project, Point::new(170.0, 150.0), bounds()));
        let frame = project.current_page().elements[0].frame;
        assert_eq!((frame.x, frame.y), (120.0, 130.0));

        let done = ctl.pointer_up().unwrap();
        assert_eq!(done.kind, GestureKind::Drag);
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_resize_gesture_clamps_at_floor() {
        let mut project = project_with_text();
        let mut ctl = InteractionController::new();
        let target = HitTarget {
            element: 0,
            region: HitRegion::Resize(ResizeHandle::Se),
        };
        ctl.pointer_down(&project, target, Point::new(350.0, 180.0));
        ctl.pointer_move(&mut project, Point::new(0.0, 0.0), bounds());
        let frame = project.current_page().elements[0].frame;
        assert_eq!(frame.width, MIN_ELEMENT_WIDTH);
        assert_eq!((frame.x, frame.y), (100.0, 100.0));
    }

    #[test]
    fn test_rotate_gesture() {
        let mut project = project_with_text();
        let mut ctl = InteractionController::new();
        let c = project.current_page().elements[0].frame.center();
        let target = HitTarget {
            element: 0,
            region: HitRegion::Rotate,
        };
        ctl.pointer_down(&project, target, Point::new(c.x + 10.0, c.y));
        ctl.pointer_move(&mut project, Point::new(c.x, c.y - 10.0), bounds());
        let rotation = project.current_page().elements[0].frame.rotation;
        assert!((rotation - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut project = project_with_text();
        let ctl = InteractionController::new();
        assert!(!ctl.pointer_move(&mut project, Point::new(10.0, 10.0), bounds()));
    }

    #[test]
    fn test_pointer_up_while_idle_reports_nothing() {
        let mut ctl = InteractionController::new();
        assert!(ctl.pointer_up().is_none());
    }

    #[test]
    fn test_missing_element_mid_gesture_recovers() {
        let mut project = project_with_text();
        let mut ctl = InteractionController::new();
        let target = HitTarget {
            element: 0,
            region: HitRegion::Body,
        };
        ctl.pointer_down(&project, target, Point::new(150.0, 120.0));
        project.delete_element(0).unwrap();

        assert!(!ctl.pointer_move(&mut project, Point::new(200.0, 200.0), bounds()));
        assert!(ctl.pointer_up().is_some());

        // a fresh gesture works normally afterwards
        project.add_element(Element::new_text());
        ctl.pointer_down(&project, target, Point::new(150.0, 120.0));
        assert!(ctl.pointer_move(&mut project, Point::new(151.0, 120.0), bounds()));
    }

    #[test]
    fn test_pointer_down_during_gesture_reports_stale_gesture() {
        let project = project_with_text();
        let mut ctl = InteractionController::new();
        let target = HitTarget {
            element: 0,
            region: HitRegion::Body,
        };
        assert!(ctl.pointer_down(&project, target, Point::new(150.0, 120.0)).is_none());
        let stale = ctl.pointer_down(&project, target, Point::new(150.0, 120.0));
        assert_eq!(stale.unwrap().kind, GestureKind::Drag);
        assert!(matches!(ctl.state(), InteractionState::Dragging(_)));
    }
}

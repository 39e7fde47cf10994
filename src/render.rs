//! Thin, replaceable presentation seam. The core never touches a drawing
//! surface; it plans pixel-space draw commands and lets the host rasterize
//! them, and it translates raw pointer events into store actions.

use kurbo::{Point, Rect, Vec2};

use crate::{
    engine::Draft,
    geom::{NormPoint, Viewport},
    model::{Annotation, Shape, Style, Tool},
    store::{AnnotationStore, PlaybackClock},
};

/// Resolved per-command appearance, in pixel units.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawStyle {
    pub color: String,
    pub thickness: f64,
    pub opacity: f64,
}

impl DrawStyle {
    fn from_style(style: &Style) -> Self {
        Self {
            color: style.color.clone(),
            thickness: style.thickness,
            opacity: style.opacity,
        }
    }
}

/// Flat draw list entry in pixel space, ready for any 2D surface.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Segment {
        from: Point,
        to: Point,
        style: DrawStyle,
    },
    ArrowHead {
        tip: Point,
        left: Point,
        right: Point,
        style: DrawStyle,
    },
    Rect {
        rect: Rect,
        style: DrawStyle,
    },
    Disc {
        center: Point,
        radius: f64,
        style: DrawStyle,
    },
}

/// Pointer input in raw pixel coordinates of the displayed video frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Leave,
}

const DOT_RADIUS_FACTOR: f64 = 1.5;
const ARROW_HEAD_MIN_PX: f64 = 12.0;

/// Plans the draw list for one frame: committed annotations visible at
/// `current_time` in insertion order (insertion order is z-order), then the
/// in-flight draft on top. Degenerate shapes are skipped here, not errored.
#[tracing::instrument(skip(store))]
pub fn plan_frame(
    store: &AnnotationStore,
    current_time: f64,
    viewport: Viewport,
) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    for ann in store.annotations_at(current_time) {
        push_annotation(&mut out, ann, viewport);
    }
    if let Some(draft) = store.draft() {
        push_draft(&mut out, draft, viewport);
    }
    out
}

/// Routes a pointer event against the store. `viewport` must be the displayed
/// frame's box, not the page viewport; the normalization happens here and
/// nowhere else. Returns the id of an annotation committed by this event.
pub fn handle_pointer(
    store: &mut AnnotationStore,
    event: PointerEvent,
    viewport: Viewport,
    clock: PlaybackClock,
) -> Option<String> {
    match event {
        PointerEvent::Down(p) => {
            let pt = viewport.to_norm(p);
            match store.current_tool() {
                Tool::Select => {
                    let hit = store.hit_test(pt).map(str::to_owned);
                    store.select_annotation(hit.as_deref());
                }
                Tool::Draw(_) => {
                    store.begin_stroke(pt, clock.current_time);
                }
            }
            None
        }
        PointerEvent::Move(p) => {
            store.move_stroke(viewport.to_norm(p));
            None
        }
        PointerEvent::Up(p) => store.end_stroke(viewport.to_norm(p), clock),
        PointerEvent::Leave => {
            store.cancel_stroke();
            None
        }
    }
}

fn push_annotation(out: &mut Vec<DrawCommand>, ann: &Annotation, viewport: Viewport) {
    if ann.points.len() < ann.shape.committed_point_count() {
        return;
    }
    match ann.shape {
        Shape::Line => push_segment(out, ann.points[0], ann.points[1], &ann.style, viewport),
        Shape::Arrow => push_arrow(out, ann.points[0], ann.points[1], &ann.style, viewport),
        Shape::Box => push_box(out, ann.points[0], ann.points[1], &ann.style, viewport),
        Shape::Dot => push_dot(out, ann.points[0], &ann.style, viewport),
    }
}

fn push_draft(out: &mut Vec<DrawCommand>, draft: &Draft, viewport: Viewport) {
    let [a, b] = draft.points;
    match draft.shape {
        Shape::Line => push_segment(out, a, b, &draft.style, viewport),
        Shape::Arrow => push_arrow(out, a, b, &draft.style, viewport),
        Shape::Box => push_box(out, a, b, &draft.style, viewport),
        Shape::Dot => push_dot(out, a, &draft.style, viewport),
    }
}

fn push_segment(
    out: &mut Vec<DrawCommand>,
    a: NormPoint,
    b: NormPoint,
    style: &Style,
    viewport: Viewport,
) {
    if a == b {
        return;
    }
    out.push(DrawCommand::Segment {
        from: a.to_pixel(viewport),
        to: b.to_pixel(viewport),
        style: DrawStyle::from_style(style),
    });
}

fn push_arrow(
    out: &mut Vec<DrawCommand>,
    a: NormPoint,
    b: NormPoint,
    style: &Style,
    viewport: Viewport,
) {
    if a == b {
        return;
    }
    let from = a.to_pixel(viewport);
    let tip = b.to_pixel(viewport);
    out.push(DrawCommand::Segment {
        from,
        to: tip,
        style: DrawStyle::from_style(style),
    });

    let shaft: Vec2 = tip - from;
    let angle = shaft.y.atan2(shaft.x);
    let head_len = (style.thickness * 4.0).max(ARROW_HEAD_MIN_PX);
    let spread = std::f64::consts::FRAC_PI_6;
    out.push(DrawCommand::ArrowHead {
        tip,
        left: tip - Vec2::from_angle(angle - spread) * head_len,
        right: tip - Vec2::from_angle(angle + spread) * head_len,
        style: DrawStyle::from_style(style),
    });
}

fn push_box(
    out: &mut Vec<DrawCommand>,
    a: NormPoint,
    b: NormPoint,
    style: &Style,
    viewport: Viewport,
) {
    let rect = Rect::from_points(a.to_pixel(viewport), b.to_pixel(viewport));
    if rect.width() == 0.0 || rect.height() == 0.0 {
        return;
    }
    out.push(DrawCommand::Rect {
        rect,
        style: DrawStyle::from_style(style),
    });
}

fn push_dot(out: &mut Vec<DrawCommand>, p: NormPoint, style: &Style, viewport: Viewport) {
    out.push(DrawCommand::Disc {
        center: p.to_pixel(viewport),
        radius: style.thickness * DOT_RADIUS_FACTOR,
        style: DrawStyle::from_style(style),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 500.0).unwrap()
    }

    fn paused_at(t: f64) -> PlaybackClock {
        PlaybackClock {
            current_time: t,
            is_playing: false,
        }
    }

    #[test]
    fn pointer_gesture_normalizes_against_viewport() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store.set_tool(Tool::Draw(Shape::Line));

        handle_pointer(
            &mut store,
            PointerEvent::Down(Point::new(100.0, 100.0)),
            viewport(),
            paused_at(1.0),
        );
        handle_pointer(
            &mut store,
            PointerEvent::Move(Point::new(400.0, 200.0)),
            viewport(),
            paused_at(1.2),
        );
        let id = handle_pointer(
            &mut store,
            PointerEvent::Up(Point::new(400.0, 200.0)),
            viewport(),
            paused_at(1.4),
        )
        .unwrap();

        let ann = &store.annotations()[0];
        assert_eq!(ann.id, id);
        assert_eq!(ann.points[0], NormPoint::new(0.1, 0.2));
        assert_eq!(ann.points[1], NormPoint::new(0.4, 0.4));
    }

    #[test]
    fn pointer_down_with_select_tool_hit_tests() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store.set_tool(Tool::Draw(Shape::Box));
        store.begin_stroke(NormPoint::new(0.2, 0.2), 0.0);
        store.move_stroke(NormPoint::new(0.6, 0.6));
        let id = store
            .end_stroke(NormPoint::new(0.6, 0.6), paused_at(0.0))
            .unwrap();
        store.set_tool(Tool::Select);

        handle_pointer(
            &mut store,
            PointerEvent::Down(Point::new(200.0, 100.0)),
            viewport(),
            paused_at(0.5),
        );
        assert_eq!(store.selected_id(), Some(id.as_str()));

        // Clicking empty space deselects.
        handle_pointer(
            &mut store,
            PointerEvent::Down(Point::new(950.0, 480.0)),
            viewport(),
            paused_at(0.5),
        );
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn pointer_leave_abandons_draft() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store.set_tool(Tool::Draw(Shape::Arrow));
        handle_pointer(
            &mut store,
            PointerEvent::Down(Point::new(10.0, 10.0)),
            viewport(),
            paused_at(0.0),
        );
        handle_pointer(&mut store, PointerEvent::Leave, viewport(), paused_at(0.1));
        assert!(store.draft().is_none());
        assert!(store.annotations().is_empty());
    }

    #[test]
    fn plan_draws_visible_annotations_then_draft_on_top() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store.set_tool(Tool::Draw(Shape::Line));
        store.begin_stroke(NormPoint::new(0.0, 0.0), 0.0);
        store.move_stroke(NormPoint::new(0.5, 0.5));
        store.end_stroke(NormPoint::new(0.5, 0.5), paused_at(0.0));

        store.begin_stroke(NormPoint::new(0.1, 0.9), 1.0);
        store.move_stroke(NormPoint::new(0.2, 0.9));

        let cmds = plan_frame(&store, 1.0, viewport());
        assert_eq!(cmds.len(), 2);
        assert!(matches!(
            cmds[1],
            DrawCommand::Segment { from, .. } if from == Point::new(100.0, 450.0)
        ));
    }

    #[test]
    fn plan_respects_visibility_window() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store.set_tool(Tool::Draw(Shape::Line));
        store.begin_stroke(NormPoint::new(0.0, 0.0), 1.0);
        store.move_stroke(NormPoint::new(0.5, 0.5));
        store.end_stroke(NormPoint::new(0.5, 0.5), paused_at(1.0));

        assert_eq!(plan_frame(&store, 0.5, viewport()).len(), 0);
        assert_eq!(plan_frame(&store, 6.0, viewport()).len(), 1);
        assert_eq!(plan_frame(&store, 6.001, viewport()).len(), 0);
    }

    #[test]
    fn plan_skips_degenerate_shapes() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store
            .restore(vec![
                Annotation {
                    id: "flat-box".to_string(),
                    shape: Shape::Box,
                    points: vec![NormPoint::new(0.2, 0.2), NormPoint::new(0.6, 0.2)],
                    style: Style::default(),
                    t_start: 0.0,
                    t_end: 10.0,
                },
                Annotation {
                    id: "zero-line".to_string(),
                    shape: Shape::Line,
                    points: vec![NormPoint::new(0.3, 0.3), NormPoint::new(0.3, 0.3)],
                    style: Style::default(),
                    t_start: 0.0,
                    t_end: 10.0,
                },
            ])
            .unwrap();
        assert!(plan_frame(&store, 1.0, viewport()).is_empty());
    }

    #[test]
    fn arrow_plans_shaft_and_head() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store
            .restore(vec![Annotation {
                id: "ar".to_string(),
                shape: Shape::Arrow,
                points: vec![NormPoint::new(0.1, 0.5), NormPoint::new(0.9, 0.5)],
                style: Style::default(),
                t_start: 0.0,
                t_end: 10.0,
            }])
            .unwrap();

        let cmds = plan_frame(&store, 1.0, viewport());
        assert_eq!(cmds.len(), 2);
        let DrawCommand::ArrowHead { tip, left, right, .. } = &cmds[1] else {
            panic!("expected arrow head, got {:?}", cmds[1]);
        };
        assert_eq!(*tip, Point::new(900.0, 250.0));
        // Head flares behind the tip, one barb per side of the shaft.
        assert!(left.x < tip.x && right.x < tip.x);
        assert!((left.y < tip.y) != (right.y < tip.y));
    }

    #[test]
    fn dot_plans_a_disc_scaled_by_thickness() {
        let mut store = AnnotationStore::new(StoreConfig::default());
        store
            .restore(vec![Annotation {
                id: "d".to_string(),
                shape: Shape::Dot,
                points: vec![NormPoint::new(0.5, 0.5)],
                style: Style {
                    thickness: 4.0,
                    ..Style::default()
                },
                t_start: 0.0,
                t_end: 10.0,
            }])
            .unwrap();

        let cmds = plan_frame(&store, 0.0, viewport());
        assert_eq!(
            cmds,
            vec![DrawCommand::Disc {
                center: Point::new(500.0, 250.0),
                radius: 6.0,
                style: DrawStyle {
                    color: Style::default().color,
                    thickness: 4.0,
                    opacity: 1.0,
                },
            }]
        );
    }
}

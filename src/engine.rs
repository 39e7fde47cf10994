use crate::{
    geom::{NormPoint, distance_to_segment},
    model::{Annotation, Shape, Style},
};

/// An in-progress, uncommitted annotation being actively drawn. Transient and
/// never persisted; scoped to one pointer gesture at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub shape: Shape,
    pub points: [NormPoint; 2],
    pub start_time: f64,
    pub style: Style,
}

impl Draft {
    /// Seeds both points at the anchor, so two-point shapes render during the
    /// drag without a point-count special case.
    pub fn begin(shape: Shape, pt: NormPoint, t: f64, style: Style) -> Self {
        Self {
            shape,
            points: [pt, pt],
            start_time: t,
            style,
        }
    }

    /// Replaces only the second point; the anchor never moves.
    pub fn drag_to(&mut self, pt: NormPoint) {
        self.points[1] = pt;
    }

    /// Whether the drag left the anchor. Two-point shapes with no movement
    /// are abandoned rather than committed.
    pub fn has_moved(&self) -> bool {
        self.points[0] != self.points[1]
    }

    /// Freezes the draft into a persisted annotation. `end_time` is taken as
    /// given; the caller decides the window policy (see
    /// [`StoreConfig::paused_window_secs`](crate::store::StoreConfig)).
    pub fn commit(self, end_time: f64, id: String) -> Annotation {
        let points = match self.shape {
            Shape::Dot => vec![self.points[0]],
            Shape::Line | Shape::Arrow | Shape::Box => self.points.to_vec(),
        };
        Annotation {
            id,
            shape: self.shape,
            points,
            style: self.style,
            t_start: self.start_time,
            t_end: end_time,
        }
    }
}

/// Best-effort unique id source: commit-time millis plus an FNV-mixed
/// per-process counter suffix. Collisions are theoretical, not handled.
#[derive(Debug, Default)]
pub struct IdGen {
    counter: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        self.counter = self.counter.wrapping_add(1);
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        let suffix = stable_hash64(millis, self.counter) & 0xff_ffff;
        format!("ann-{millis}-{suffix:06x}")
    }
}

fn stable_hash64(seed: u64, v: u64) -> u64 {
    // FNV-1a 64, seeded.
    let mut h = 0xcbf2_9ce4_8422_2325u64 ^ seed;
    for b in v.to_le_bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}

/// Topmost annotation under `pt`, or `None`. Iterates in reverse insertion
/// order so the most recently added annotation wins on overlap. `tolerance`
/// is normalized (a fraction of the frame, like
/// [`DEFAULT_HIT_TOLERANCE`](crate::geom::DEFAULT_HIT_TOLERANCE)).
pub fn hit_test<'a>(
    annotations: &'a [Annotation],
    pt: NormPoint,
    tolerance: f64,
) -> Option<&'a str> {
    annotations
        .iter()
        .rev()
        .find(|ann| hits(ann, pt, tolerance))
        .map(|ann| ann.id.as_str())
}

fn hits(ann: &Annotation, pt: NormPoint, tolerance: f64) -> bool {
    if ann.points.len() < ann.shape.committed_point_count() {
        return false;
    }
    match ann.shape {
        Shape::Dot => ann.points[0].distance(pt) <= tolerance,
        Shape::Box => {
            let a = ann.points[0];
            let b = ann.points[1];
            let rect = kurbo::Rect::from_points(
                kurbo::Point::new(a.x, a.y),
                kurbo::Point::new(b.x, b.y),
            )
            .inflate(tolerance, tolerance);
            rect.contains(kurbo::Point::new(pt.x, pt.y))
        }
        Shape::Line | Shape::Arrow => {
            distance_to_segment(pt, ann.points[0], ann.points[1]) <= tolerance
        }
    }
}

/// Annotations whose inclusive visibility window contains `time`, in input
/// order. Callers relying on z-order use insertion order, which the store
/// keeps append-only.
pub fn visible_at(annotations: &[Annotation], time: f64) -> impl Iterator<Item = &Annotation> {
    annotations.iter().filter(move |ann| ann.visible_at(time))
}

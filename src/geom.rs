use crate::error::{SwingmarkError, SwingmarkResult};

/// Default hit-test tolerance as a fraction of the frame (2%). Tolerances are
/// normalized, never pixel counts, so hit-testing stays resolution-independent.
pub const DEFAULT_HIT_TOLERANCE: f64 = 0.02;

/// Position expressed as a fraction of the displayed video frame,
/// `x,y ∈ [0,1]`. All persisted annotation geometry uses this space;
/// conversion to pixels happens only at render time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_pixel(self, viewport: Viewport) -> kurbo::Point {
        kurbo::Point::new(self.x * viewport.width(), self.y * viewport.height())
    }

    pub fn distance(self, other: NormPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// The displayed video frame's bounding box in pixels. This is the frame as
/// drawn on screen (after letterboxing), not the full viewport; converting
/// pointer coordinates against the wrong box offsets every annotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> SwingmarkResult<Self> {
        if !(width > 0.0) || !(height > 0.0) {
            return Err(SwingmarkError::validation(
                "Viewport width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    pub fn to_norm(self, p: kurbo::Point) -> NormPoint {
        NormPoint::new(p.x / self.width, p.y / self.height)
    }
}

/// Distance from `p` to the segment `a..b`, all in normalized space.
/// Degenerate segments (`a == b`) fall back to point distance.
pub fn distance_to_segment(p: NormPoint, a: NormPoint, b: NormPoint) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return a.distance(p);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    let proj = NormPoint::new(a.x + abx * t, a.y + aby * t);
    proj.distance(p)
}

use crate::{
    error::{SwingmarkError, SwingmarkResult},
    geom::NormPoint,
};

/// Shape of a committed annotation. `select` is a tool mode, not a shape, so
/// persisted data cannot carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Line,
    Arrow,
    Box,
    Dot,
}

impl Shape {
    /// Point count a committed annotation of this shape carries. Line, arrow
    /// and box are anchored two-point shapes; there is no polyline.
    pub fn committed_point_count(self) -> usize {
        match self {
            Self::Dot => 1,
            Self::Line | Self::Arrow | Self::Box => 2,
        }
    }
}

/// Current input mode. `Select` switches pointer handling to
/// hit-testing/selection and never produces an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Select,
    Draw(Shape),
}

impl Tool {
    pub fn shape(self) -> Option<Shape> {
        match self {
            Self::Select => None,
            Self::Draw(shape) => Some(shape),
        }
    }
}

/// Stroke appearance. Copied by value into the annotation at commit time, so
/// later changes to the current style never retouch committed annotations.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Style {
    pub color: String,
    pub thickness: f64,
    pub opacity: f64, // 0..1
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#e53e3e".to_string(),
            thickness: 3.0,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StylePatch {
    pub color: Option<String>,
    pub thickness: Option<f64>,
    pub opacity: Option<f64>,
}

impl Style {
    pub fn merge(&mut self, patch: StylePatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(thickness) = patch.thickness {
            self.thickness = thickness;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
    }
}

/// A persisted, time-bounded vector drawing over the video frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    pub id: String,
    pub shape: Shape,
    pub points: Vec<NormPoint>,
    pub style: Style,
    pub t_start: f64, // seconds on the video timeline
    pub t_end: f64,
}

impl Annotation {
    /// Visibility window test, inclusive on both ends.
    pub fn visible_at(&self, t: f64) -> bool {
        self.t_start <= t && t <= self.t_end
    }

    /// Structural validation for the wholesale-restore path. Live editing
    /// paths stay permissive and never call this.
    pub fn validate(&self) -> SwingmarkResult<()> {
        if self.id.is_empty() {
            return Err(SwingmarkError::validation("annotation id must be non-empty"));
        }
        if self.points.len() != self.shape.committed_point_count() {
            return Err(SwingmarkError::validation(format!(
                "annotation '{}' has {} points, shape needs {}",
                self.id,
                self.points.len(),
                self.shape.committed_point_count()
            )));
        }
        if !(self.t_start <= self.t_end) {
            return Err(SwingmarkError::validation(format!(
                "annotation '{}' has t_start > t_end",
                self.id
            )));
        }
        if !(self.style.thickness > 0.0) {
            return Err(SwingmarkError::validation(format!(
                "annotation '{}' style thickness must be > 0",
                self.id
            )));
        }
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(SwingmarkError::validation(format!(
                "annotation '{}' style opacity must be in 0..=1",
                self.id
            )));
        }
        Ok(())
    }

    /// Shallow-merges `patch` into this annotation.
    pub fn apply(&mut self, patch: AnnotationPatch) {
        if let Some(points) = patch.points {
            self.points = points;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(t_start) = patch.t_start {
            self.t_start = t_start;
        }
        if let Some(t_end) = patch.t_end {
            self.t_end = t_end;
        }
    }
}

/// Shallow partial update for [`Annotation`].
#[derive(Clone, Debug, Default)]
pub struct AnnotationPatch {
    pub points: Option<Vec<NormPoint>>,
    pub style: Option<Style>,
    pub t_start: Option<f64>,
    pub t_end: Option<f64>,
}

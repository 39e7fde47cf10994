#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod geom;
pub mod history;
pub mod model;
pub mod render;
pub mod store;

pub use engine::{Draft, IdGen, hit_test, visible_at};
pub use error::{SwingmarkError, SwingmarkResult};
pub use geom::{DEFAULT_HIT_TOLERANCE, NormPoint, Viewport, distance_to_segment};
pub use history::History;
pub use model::{Annotation, AnnotationPatch, Shape, Style, StylePatch, Tool};
pub use render::{DrawCommand, DrawStyle, PointerEvent, handle_pointer, plan_frame};
pub use store::{AnnotationStore, PlaybackClock, StoreConfig};

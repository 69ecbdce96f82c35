// CV document model: schema and normalization, the field merge engine,
// position-identified section edits, and the printable preview.

pub mod dates;
pub mod editing;
pub mod handlers;
pub mod merge;
pub mod model;
pub mod preview;

pub use merge::merge;
pub use model::{normalize_value, title_of, CvDocument, CvFragment};

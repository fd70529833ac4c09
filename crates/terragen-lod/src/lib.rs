//! Level-of-detail table: distance thresholds, LOD selection and simplification arithmetic.

mod selector;

pub use selector::{LodError, LodLevel, LodTable, simplification_step, vertices_per_line};

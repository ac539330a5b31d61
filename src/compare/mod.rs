//! Frame comparison
//!
//! Leaf-first: [`reconcile`] crops two frames to a common region,
//! [`differ`] counts pixels whose [`color`] distance exceeds the tolerance,
//! and [`evaluator`] turns that into a [`ComparisonResult`] judged by a
//! [`PassPolicy`].

pub mod color;
pub mod differ;
pub mod evaluator;
pub mod policy;
pub mod reconcile;
pub mod result;

pub use differ::{DiffOptions, DiffStyle, PixelDiff, DEFAULT_HIGHLIGHT, DEFAULT_TOLERANCE};
pub use evaluator::{evaluate, evaluate_files};
pub use policy::PassPolicy;
pub use reconcile::{NoOverlapError, Reconciled};
pub use result::{height_delta_percentage, ComparisonResult};

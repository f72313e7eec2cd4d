//! Raster engine for hand-labeling gas regions over a folder of images.
//!
//! A session walks the unlabeled images of a folder in natural order. For
//! each one the operator draws a boundary into a binary mask, fills the
//! enclosed area and saves the mask together with a soft preview overlay.

pub mod annotator;
pub mod mask;
pub mod render;
pub mod script;
pub mod session;
pub mod source;
pub mod store;
pub mod view;

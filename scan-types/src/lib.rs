//! # scan-types: in-memory representation of an annotated single-cell matrix
//!
//! These types mirror the parts of an AnnData object needed to draw embeddings: per-cell annotations,
//! named embeddings and the cell × gene expression matrix.

#![deny(warnings)]

/// Annotated matrix: annotations, embeddings and expression together
pub mod anndata;
/// Grouping of cells by a shared label, e.g. a clustering
pub mod groups;
/// Expression matrix storage
pub mod matrix;
/// Per-cell annotation columns
pub mod obs;

pub use anndata::AnnotatedMatrix;
pub use groups::CellGroups;
pub use matrix::ExpressionMatrix;
pub use obs::{ObsColumn, ObsFrame};

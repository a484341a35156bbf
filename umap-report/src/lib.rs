//! # umap-report: UMAP plots of a Seurat object as a single HTML page
//!
//! A Seurat `.rds` object is converted to h5ad by an external R script, then every requested gene and every
//! metadata column listed by the conversion is drawn as a Plotly scatter of the UMAP embedding.

#![deny(warnings)]

/// Color scale selection
pub mod coloring;
/// Report settings
pub mod config;
/// Seurat to h5ad conversion via Rscript
pub mod convert;
/// Locating the conversion outputs
pub mod discovery;
/// Metadata column list written by the conversion
pub mod dropdown;
/// Plotly figures
pub mod figure;
/// Joining embeddings with plotted values
pub mod frame;
/// End-to-end report run
pub mod pipeline;
/// HTML page assembly
pub mod report;

pub use coloring::ColorScale;
pub use config::ReportConfig;
pub use pipeline::{parse_gene_list, run, RunSummary};

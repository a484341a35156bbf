use crate::coloring::{determine_coloring, ColorScale};
use anyhow::{bail, format_err, Context, Error};
use scan_types::{AnnotatedMatrix, CellGroups};
use std::fmt;

/// obs column holding the Seurat clustering
pub const DEFAULT_CLUSTER_COLUMN: &str = "seurat_clusters";

/// Label used for missing values in categorical plots
pub const MISSING_LABEL: &str = "nan";

/// What a UMAP plot is colored by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlotTarget {
    /// A per-cell metadata column from `obs`
    Metadata(String),
    /// The expression of a gene from `var`
    Gene(String),
}

impl PlotTarget {
    pub fn name(&self) -> &str {
        match self {
            PlotTarget::Metadata(name) | PlotTarget::Gene(name) => name,
        }
    }

    pub fn is_gene(&self) -> bool {
        matches!(self, PlotTarget::Gene(_))
    }
}

impl fmt::Display for PlotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotTarget::Metadata(name) => write!(f, "column {name}"),
            PlotTarget::Gene(name) => write!(f, "gene {name}"),
        }
    }
}

/// Seurat clustering columns, which get the cluster size in their hover text.
pub fn is_cluster_column(name: &str) -> bool {
    name == DEFAULT_CLUSTER_COLUMN || name.contains("RNA_snn_res")
}

/// Per-cell values the points are colored by.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotValues {
    Labels(Vec<String>),
    Numbers(Vec<f64>),
}

impl PlotValues {
    pub fn len(&self) -> usize {
        match self {
            PlotValues::Labels(v) => v.len(),
            PlotValues::Numbers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// UMAP coordinates joined with the plotted values and cluster annotations, one row per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct UmapFrame {
    pub target: PlotTarget,
    /// obs column the `clusters` labels come from
    pub cluster_column: String,
    pub color_scale: ColorScale,
    pub umap1: Vec<f64>,
    pub umap2: Vec<f64>,
    pub values: PlotValues,
    pub clusters: Vec<String>,
    pub cells_in_cluster: Vec<usize>,
}

impl UmapFrame {
    /// Join the UMAP embedding of `data` with the values of `target`.
    ///
    /// Metadata rows are sorted by the column's values so the legend follows value order; gene rows keep
    /// cell order and always use a continuous scale.
    pub fn build(
        data: &AnnotatedMatrix,
        target: &PlotTarget,
        requested: ColorScale,
        cluster_column: &str,
    ) -> Result<UmapFrame, Error> {
        if target.name().is_empty() {
            bail!("Select an input parameter (either a metadata column or a gene name)");
        }

        let coords = data.umap_coords()?;
        let cluster_col = data
            .obs
            .column(cluster_column)
            .ok_or_else(|| format_err!("cluster column {cluster_column} not found in obs"))?;
        let clusters: Vec<String> = (0..cluster_col.len())
            .map(|cell| cluster_col.label(cell).unwrap_or_else(|| MISSING_LABEL.to_string()))
            .collect();
        let sizes = CellGroups::from_cell_labels(&clusters).cell_group_sizes();

        let (order, values, color_scale) = match target {
            PlotTarget::Gene(gene) => {
                let expression = data.gene_expression(gene)?;
                let order = (0..data.n_obs()).collect::<Vec<_>>();
                (order, PlotValues::Numbers(expression.to_vec()), ColorScale::Continuous)
            }
            PlotTarget::Metadata(name) => {
                let column = data
                    .obs
                    .column(name)
                    .ok_or_else(|| format_err!("metadata column {name} not found in obs"))?;
                let scale = determine_coloring(column, name, requested);
                let order = column.sort_order();
                let values = match scale {
                    ColorScale::Categorical => PlotValues::Labels(
                        order
                            .iter()
                            .map(|&cell| column.label(cell).unwrap_or_else(|| MISSING_LABEL.to_string()))
                            .collect(),
                    ),
                    ColorScale::Continuous => PlotValues::Numbers(
                        order
                            .iter()
                            .map(|&cell| Ok(column.numeric(cell)?.unwrap_or(f64::NAN)))
                            .collect::<Result<Vec<f64>, Error>>()
                            .with_context(|| format!("{name} cannot be plotted on a continuous color scale"))?,
                    ),
                };
                (order, values, scale)
            }
        };

        Ok(UmapFrame {
            target: target.clone(),
            cluster_column: cluster_column.to_string(),
            color_scale,
            umap1: order.iter().map(|&cell| coords[[cell, 0]]).collect(),
            umap2: order.iter().map(|&cell| coords[[cell, 1]]).collect(),
            values,
            clusters: order.iter().map(|&cell| clusters[cell].clone()).collect(),
            cells_in_cluster: order.iter().map(|&cell| sizes[cell]).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.umap1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.umap1.is_empty()
    }
}

use crate::coloring::ColorScale;
use crate::frame::DEFAULT_CLUSTER_COLUMN;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_RSCRIPT: &str = "Rscript";
pub const DEFAULT_CONVERSION_SCRIPT: &str = "/opt/genepatt/rds_conversion.R";
pub const DEFAULT_OUTPUT: &str = "index.html";

/// Settings for one report run. Missing fields take their defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Seurat `.rds` file to convert; unused when `skip_conversion` is set
    pub input: Option<PathBuf>,
    /// genes plotted by expression, in order
    pub target_genes: Vec<String>,
    pub color_scale: ColorScale,
    pub rscript: PathBuf,
    pub conversion_script: PathBuf,
    /// directory searched recursively for the conversion outputs
    pub search_dir: PathBuf,
    pub output: PathBuf,
    pub cluster_column: String,
    pub skip_conversion: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input: None,
            target_genes: Vec::new(),
            color_scale: ColorScale::default(),
            rscript: PathBuf::from(DEFAULT_RSCRIPT),
            conversion_script: PathBuf::from(DEFAULT_CONVERSION_SCRIPT),
            search_dir: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            cluster_column: DEFAULT_CLUSTER_COLUMN.to_string(),
            skip_conversion: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"input": "pbmc.rds", "color_scale": "categorical"}"#).unwrap();
        assert_eq!(config.input, Some(PathBuf::from("pbmc.rds")));
        assert_eq!(config.color_scale, ColorScale::Categorical);
        assert_eq!(config.rscript, PathBuf::from("Rscript"));
        assert_eq!(config.search_dir, PathBuf::from("."));
        assert_eq!(config.output, PathBuf::from("index.html"));
        assert_eq!(config.cluster_column, "seurat_clusters");
        assert!(config.target_genes.is_empty());
        assert!(!config.skip_conversion);
    }

    #[test]
    fn test_unknown_color_scale() {
        assert!(serde_json::from_str::<ReportConfig>(r#"{"color_scale": "rainbow"}"#).is_err());
    }
}

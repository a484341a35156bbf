use crate::matrix::ExpressionMatrix;
use crate::obs::ObsFrame;
use anyhow::{bail, format_err, Error};
use ndarray::{s, Array1, Array2};
use std::collections::BTreeMap;

/// The parts of an AnnData object needed to draw embeddings.
#[derive(Clone, Debug)]
pub struct AnnotatedMatrix {
    pub obs_names: Vec<String>,
    pub var_names: Vec<String>,
    pub obs: ObsFrame,
    /// Per-cell embeddings, one row per cell
    pub obsm: BTreeMap<String, Array2<f64>>,
    /// `None` when the file was read without the expression matrix
    pub x: Option<ExpressionMatrix>,
}

impl AnnotatedMatrix {
    pub fn n_obs(&self) -> usize {
        self.obs_names.len()
    }

    pub fn n_vars(&self) -> usize {
        self.var_names.len()
    }

    /// The last embedding key whose name contains "umap", ignoring case.
    pub fn umap_key(&self) -> Option<&str> {
        self.obsm
            .keys()
            .filter(|k| k.to_lowercase().contains("umap"))
            .last()
            .map(String::as_str)
    }

    /// First two UMAP components, one row per cell.
    pub fn umap_coords(&self) -> Result<Array2<f64>, Error> {
        let key = self
            .umap_key()
            .ok_or_else(|| format_err!("no UMAP embedding found among obsm keys {:?}", self.obsm.keys()))?;
        let embedding = &self.obsm[key];
        let (rows, cols) = embedding.dim();
        if cols < 2 {
            bail!("embedding {key} has {cols} components, expected at least 2");
        }
        if rows != self.n_obs() {
            bail!("embedding {key} has {rows} rows but there are {} cells", self.n_obs());
        }
        Ok(embedding.slice(s![.., ..2]).to_owned())
    }

    pub fn gene_index(&self, gene: &str) -> Option<usize> {
        self.var_names.iter().position(|g| g == gene)
    }

    /// Expression of `gene` in every cell.
    pub fn gene_expression(&self, gene: &str) -> Result<Array1<f64>, Error> {
        let Some(idx) = self.gene_index(gene) else {
            bail!("The gene name was not found: {gene}")
        };
        let Some(x) = &self.x else {
            bail!("expression matrix was not loaded")
        };
        let values = x.column(idx)?;
        if values.len() != self.n_obs() {
            bail!("expression matrix has {} rows but there are {} cells", values.len(), self.n_obs());
        }
        Ok(values)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    fn data() -> AnnotatedMatrix {
        let mut obsm = BTreeMap::new();
        obsm.insert("X_pca".to_string(), array![[9.0, 9.0, 9.0], [9.0, 9.0, 9.0]]);
        obsm.insert("X_UMAP".to_string(), array![[0.0, 1.0], [2.0, 3.0]]);
        obsm.insert("X_umap".to_string(), array![[1.0, 2.0, 7.0], [3.0, 4.0, 7.0]]);
        AnnotatedMatrix {
            obs_names: vec!["AAAC-1".to_string(), "AAAG-1".to_string()],
            var_names: vec!["MS4A1".to_string(), "CD8A".to_string()],
            obs: ObsFrame::new(2),
            obsm,
            x: Some(ExpressionMatrix::Dense(array![[0.5, 0.0], [1.5, 2.0]])),
        }
    }

    #[test]
    fn test_umap_key_is_last_match() {
        let d = data();
        assert_eq!(d.umap_key(), Some("X_umap"));
        assert_eq!(d.umap_coords().unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_umap_missing() {
        let mut d = data();
        d.obsm.retain(|k, _| k == "X_pca");
        assert_eq!(d.umap_key(), None);
        assert!(d.umap_coords().is_err());

        d.obsm.insert("umap_1d".to_string(), array![[1.0], [2.0]]);
        assert!(d.umap_coords().is_err());
    }

    #[test]
    fn test_gene_expression() {
        let mut d = data();
        assert_eq!(d.gene_expression("CD8A").unwrap(), array![0.0, 2.0]);
        let err = d.gene_expression("CD14").unwrap_err().to_string();
        assert!(err.contains("not found"), "{err}");

        d.x = None;
        assert!(d.gene_expression("CD8A").is_err());
    }
}

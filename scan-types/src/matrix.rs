use anyhow::{bail, Error};
use ndarray::{Array1, Array2};
use sprs::CsMatI;

/// Sparse storage type for h5ad expression matrices, in either CSR or CSC layout.
pub type SparseExpression = CsMatI<f64, i64>;

/// Cell × gene expression values, as stored in AnnData's `X`.
#[derive(Clone, Debug)]
pub enum ExpressionMatrix {
    Dense(Array2<f64>),
    Sparse(SparseExpression),
}

impl ExpressionMatrix {
    /// (cells, genes)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            ExpressionMatrix::Dense(m) => m.dim(),
            ExpressionMatrix::Sparse(m) => m.shape(),
        }
    }

    /// Expression of one gene across all cells.
    pub fn column(&self, gene: usize) -> Result<Array1<f64>, Error> {
        let (cells, genes) = self.shape();
        if gene >= genes {
            bail!("gene index {gene} is out of range for a matrix with {genes} genes");
        }
        match self {
            ExpressionMatrix::Dense(m) => Ok(m.column(gene).to_owned()),
            ExpressionMatrix::Sparse(m) => {
                let mut values = Array1::zeros(cells);
                if m.is_csr() {
                    for (cell, row) in m.outer_iterator().enumerate() {
                        if let Some(&v) = row.get(gene) {
                            values[cell] = v;
                        }
                    }
                } else if let Some(col) = m.outer_view(gene) {
                    for (cell, &v) in col.iter() {
                        values[cell] = v;
                    }
                }
                Ok(values)
            }
        }
    }
}

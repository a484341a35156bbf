use crate::read_string_attr;
use anyhow::{bail, format_err, Context, Error};
use hdf5::Group;
use log::debug;
use scan_types::matrix::SparseExpression;
use scan_types::ExpressionMatrix;

/// Sparse layout of an encoded matrix group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SparseFormat {
    Csr,
    Csc,
}

fn sparse_format(group: &Group) -> Result<SparseFormat, Error> {
    if let Some(encoding) = read_string_attr(group, "encoding-type")? {
        return match encoding.as_str() {
            "csr_matrix" => Ok(SparseFormat::Csr),
            "csc_matrix" => Ok(SparseFormat::Csc),
            other => bail!("unsupported matrix encoding {other}"),
        };
    }
    // anndata < 0.8
    match read_string_attr(group, "h5sparse_format")?.as_deref() {
        Some("csr") => Ok(SparseFormat::Csr),
        Some("csc") => Ok(SparseFormat::Csc),
        Some(other) => bail!("unsupported sparse format {other}"),
        None => bail!("matrix group {} has no encoding-type", group.name()),
    }
}

fn sparse_shape(group: &Group) -> Result<(usize, usize), Error> {
    let attr_names = group.attr_names()?;
    let name = ["shape", "h5sparse_shape"]
        .into_iter()
        .find(|n| attr_names.iter().any(|a| a == n))
        .ok_or_else(|| format_err!("matrix group {} has no shape", group.name()))?;
    let shape = group.attr(name)?.read_1d::<i64>()?;
    if shape.len() != 2 {
        bail!("expected a 2-d shape, found {shape}");
    }
    Ok((shape[0] as usize, shape[1] as usize))
}

/// Check that `indptr` starts at zero or above, never decreases and stays within `nnz`.
fn check_indptr(indptr: &[i64], nnz: usize) -> Result<(), Error> {
    if let Some(&first) = indptr.first() {
        if first < 0 {
            bail!("indptr starts at {first}");
        }
    }
    if let Some(w) = indptr.windows(2).find(|w| w[0] > w[1]) {
        bail!("indptr decreases from {} to {}", w[0], w[1]);
    }
    if indptr.last().copied().unwrap_or(0) as usize > nnz {
        bail!("indptr points past the end of the data");
    }
    Ok(())
}

/// Sort the minor indices (and their values) of every outer slice, as sprs requires.
fn sort_outer_slices(indptr: &[i64], indices: &mut [i64], data: &mut [f64]) {
    for w in indptr.windows(2) {
        let (start, end) = (w[0] as usize, w[1] as usize);
        let idx = &indices[start..end];
        if idx.windows(2).all(|p| p[0] < p[1]) {
            continue;
        }
        let mut pairs: Vec<(i64, f64)> = idx.iter().copied().zip(data[start..end].iter().copied()).collect();
        pairs.sort_by_key(|p| p.0);
        for (k, (i, v)) in pairs.into_iter().enumerate() {
            indices[start + k] = i;
            data[start + k] = v;
        }
    }
}

fn read_sparse(group: &Group) -> Result<SparseExpression, Error> {
    let format = sparse_format(group)?;
    let shape = sparse_shape(group)?;
    let mut data = group.dataset("data")?.read_1d::<f64>()?.to_vec();
    let mut indices = group.dataset("indices")?.read_1d::<i64>()?.to_vec();
    let indptr = group.dataset("indptr")?.read_1d::<i64>()?.to_vec();
    if indices.len() != data.len() {
        bail!("{} indices but {} values", indices.len(), data.len());
    }
    check_indptr(&indptr, indices.len())?;
    sort_outer_slices(&indptr, &mut indices, &mut data);

    debug!("reading {format:?} matrix {shape:?} with {} non-zeros", data.len());
    let matrix = match format {
        SparseFormat::Csr => SparseExpression::try_new(shape, indptr, indices, data),
        SparseFormat::Csc => SparseExpression::try_new_csc(shape, indptr, indices, data),
    };
    matrix.map_err(|(_, _, _, e)| format_err!("invalid sparse matrix {}: {e:?}", group.name()))
}

/// Read the expression matrix `name` under `parent`: a dense 2-d dataset or an encoded sparse group.
pub fn read_matrix(parent: &Group, name: &str) -> Result<ExpressionMatrix, Error> {
    if let Ok(group) = parent.group(name) {
        let matrix = read_sparse(&group).with_context(|| format!("reading sparse matrix {name}"))?;
        return Ok(ExpressionMatrix::Sparse(matrix));
    }
    let dataset = parent.dataset(name)?;
    if dataset.ndim() != 2 {
        bail!("expected a 2-d matrix {name}, found shape {:?}", dataset.shape());
    }
    Ok(ExpressionMatrix::Dense(dataset.read_2d::<f64>()?))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{example_expression, string_attribute, write_example_h5ad, write_legacy_h5ad};
    use ndarray::array;

    #[test]
    fn test_sort_outer_slices() {
        let indptr = vec![0, 3, 3, 5];
        let mut indices = vec![2, 0, 1, 4, 3];
        let mut data = vec![2.0, 0.5, 1.0, 4.0, 3.0];
        sort_outer_slices(&indptr, &mut indices, &mut data);
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(data, vec![0.5, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_check_indptr() {
        assert!(check_indptr(&[0, 1, 3, 4, 6], 6).is_ok());
        assert!(check_indptr(&[], 0).is_ok());
        assert!(check_indptr(&[0, 3, 1, 6], 6).is_err());
        assert!(check_indptr(&[-2, 1, 6], 6).is_err());
        assert!(check_indptr(&[0, 2, 7], 6).is_err());
    }

    #[test]
    fn test_corrupt_indptr_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.h5ad");
        let file = hdf5::File::create(&path).unwrap();
        let group = file.create_group("X").unwrap();
        string_attribute(&group, "encoding-type", "csr_matrix").unwrap();
        let shape = group.new_attr::<i64>().shape((2,)).create("shape").unwrap();
        shape.as_writer().write(&[2i64, 2][..]).unwrap();
        for (name, values) in [("indices", vec![1i64, 0]), ("indptr", vec![0i64, 2, 1])] {
            group
                .new_dataset::<i64>()
                .shape((values.len(),))
                .create(name)
                .unwrap()
                .as_writer()
                .write(&values[..])
                .unwrap();
        }
        group
            .new_dataset::<f64>()
            .shape((2,))
            .create("data")
            .unwrap()
            .as_writer()
            .write(&[1.0f64, 2.0][..])
            .unwrap();

        let err = read_matrix(&file, "X").unwrap_err();
        assert!(format!("{err:#}").contains("indptr decreases"), "{err:#}");
    }

    #[test]
    fn test_csc_encodings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.h5ad");
        write_legacy_h5ad(&path).unwrap();
        let file = hdf5::File::open(&path).unwrap();
        let expected = example_expression();

        // h5sparse_format / h5sparse_shape, then encoding-type csc_matrix
        for name in ["X", "X_csc"] {
            let matrix = read_matrix(&file, name).unwrap();
            let ExpressionMatrix::Sparse(sparse) = &matrix else {
                panic!("{name} should be sparse")
            };
            assert!(sparse.is_csc(), "{name}");
            assert_eq!(matrix.shape(), (4, 3));
            for gene in 0..3 {
                assert_eq!(matrix.column(gene).unwrap(), expected.column(gene), "{name}");
            }
        }
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let dir = tempfile::tempdir().unwrap();
        let dense_path = dir.path().join("dense.h5ad");
        let sparse_path = dir.path().join("sparse.h5ad");
        write_example_h5ad(&dense_path, false).unwrap();
        write_example_h5ad(&sparse_path, true).unwrap();

        let dense = read_matrix(&hdf5::File::open(&dense_path).unwrap(), "X").unwrap();
        let sparse = read_matrix(&hdf5::File::open(&sparse_path).unwrap(), "X").unwrap();
        assert!(matches!(dense, ExpressionMatrix::Dense(_)));
        assert!(matches!(sparse, ExpressionMatrix::Sparse(_)));
        assert_eq!(dense.shape(), (4, 3));
        assert_eq!(sparse.shape(), (4, 3));
        for gene in 0..3 {
            assert_eq!(dense.column(gene).unwrap(), sparse.column(gene).unwrap());
        }
        assert_eq!(sparse.column(1).unwrap(), array![0.0, 2.0, 3.5, 0.0]);
    }
}

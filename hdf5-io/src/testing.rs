//! Small h5ad files for tests, laid out the way anndata writes them.

use anyhow::Error;
use hdf5::types::{FixedAscii, VarLenUnicode};
use hdf5::{File, Group, H5Type, Location};
use ndarray::{array, Array2};
use std::path::Path;
use std::str::FromStr;

pub fn scalar_attribute<T: H5Type>(loc: &Location, name: &str, value: T) -> Result<(), Error> {
    let attr = loc.new_attr::<T>().shape(()).create(name)?;
    let v = ndarray::Array0::from_shape_vec((), vec![value])?;
    attr.as_writer().write(&v)?;
    Ok(())
}

pub fn string_attribute(loc: &Location, name: &str, value: &str) -> Result<(), Error> {
    scalar_attribute(loc, name, VarLenUnicode::from_str(value)?)
}

fn unicode(values: &[&str]) -> Result<Vec<VarLenUnicode>, Error> {
    Ok(values.iter().map(|v| VarLenUnicode::from_str(v)).collect::<Result<_, _>>()?)
}

fn write_col<T: H5Type>(group: &Group, name: &str, v: &[T]) -> Result<(), Error> {
    let ds = group.new_dataset::<T>().shape((v.len(),)).create(name)?;
    ds.as_writer().write(v)?;
    Ok(())
}

fn write_categorical(parent: &Group, name: &str, categories: &[&str], codes: &[i8]) -> Result<(), Error> {
    let group = parent.create_group(name)?;
    string_attribute(&group, "encoding-type", "categorical")?;
    write_col(&group, "categories", &unicode(categories)?)?;
    write_col(&group, "codes", codes)?;
    Ok(())
}

/// Expression values of the example file: 4 cells x 3 genes.
pub fn example_expression() -> Array2<f64> {
    array![[1.0, 0.0, 0.0], [0.0, 2.0, 0.5], [0.0, 3.5, 0.0], [4.0, 0.0, 1.0]]
}

/// Write a 4-cell, 3-gene h5ad with a typical Seurat-derived obs table and a UMAP embedding.
pub fn write_example_h5ad(path: &Path, sparse: bool) -> Result<(), Error> {
    let file = File::create(path)?;

    let obs = file.create_group("obs")?;
    string_attribute(&obs, "encoding-type", "dataframe")?;
    string_attribute(&obs, "_index", "_index")?;
    let columns = [
        "orig.ident",
        "nCount_RNA",
        "nFeature_RNA",
        "RNA_snn_res.0.5",
        "seurat_clusters",
        "is_doublet",
        "cell_type",
        "n_guides",
        "legacy_group",
        "bad_codes",
    ];
    let order = obs.new_attr::<VarLenUnicode>().shape((columns.len(),)).create("column-order")?;
    order.as_writer().write(&unicode(&columns)?)?;

    write_col(&obs, "_index", &unicode(&["AAAC-1", "AAAG-1", "AACT-1", "AAGT-1"])?)?;
    write_categorical(&obs, "orig.ident", &["pbmc3k"], &[0, 0, 0, 0])?;
    write_col(&obs, "nCount_RNA", &[1200.0f64, 850.0, 2100.0, 301.0])?;
    write_col(&obs, "nFeature_RNA", &[310i32, 208, 512, 97])?;
    write_categorical(&obs, "RNA_snn_res.0.5", &["0", "1"], &[0, 1, 1, 0])?;
    write_categorical(&obs, "seurat_clusters", &["0", "1"], &[0, 1, 1, 0])?;
    write_col(&obs, "is_doublet", &[false, false, true, false])?;
    write_col(&obs, "cell_type", &unicode(&["B", "T", "T", "Mono"])?)?;

    let guides = obs.create_group("n_guides")?;
    string_attribute(&guides, "encoding-type", "nullable-integer")?;
    write_col(&guides, "values", &[1i64, 0, 2, 0])?;
    write_col(&guides, "mask", &[false, true, false, false])?;

    let legacy = obs.create_group("__categories")?;
    write_col(&legacy, "legacy_group", &unicode(&["ctrl", "stim"])?)?;
    write_col(&obs, "legacy_group", &[1i8, 0, 1, 1])?;
    // one code short of the index
    write_categorical(&obs, "bad_codes", &["a", "b"], &[0, 1, 0])?;

    let var = file.create_group("var")?;
    string_attribute(&var, "encoding-type", "dataframe")?;
    string_attribute(&var, "_index", "_index")?;
    write_col(&var, "_index", &unicode(&["MS4A1", "CD8A", "CD14"])?)?;

    let obsm = file.create_group("obsm")?;
    let umap = array![[-1.0, 2.0], [3.5, 0.25], [3.0, 0.5], [-2.0, 1.5]];
    obsm.new_dataset::<f64>()
        .shape(umap.dim())
        .create("X_umap")?
        .as_writer()
        .write(umap.view())?;
    let pca = Array2::<f64>::ones((4, 5));
    obsm.new_dataset::<f64>()
        .shape(pca.dim())
        .create("X_pca")?
        .as_writer()
        .write(pca.view())?;

    let x = example_expression();
    if sparse {
        // CSR of `example_expression`, with one row stored out of order
        let group = file.create_group("X")?;
        string_attribute(&group, "encoding-type", "csr_matrix")?;
        let shape = group.new_attr::<i64>().shape((2,)).create("shape")?;
        shape.as_writer().write(&[4i64, 3][..])?;
        write_col(&group, "data", &[1.0f64, 0.5, 2.0, 3.5, 4.0, 1.0])?;
        write_col(&group, "indices", &[0i32, 2, 1, 1, 0, 2])?;
        write_col(&group, "indptr", &[0i32, 1, 3, 4, 6])?;
    } else {
        file.new_dataset::<f64>()
            .shape(x.dim())
            .create("X")?
            .as_writer()
            .write(x.view())?;
    }
    Ok(())
}

fn fixed_ascii(values: &[&str]) -> Result<Vec<FixedAscii<8>>, Error> {
    Ok(values.iter().map(|v| FixedAscii::<8>::from_ascii(v.as_bytes())).collect::<Result<_, _>>()?)
}

/// CSC layout of `example_expression`
fn write_csc(group: &Group) -> Result<(), Error> {
    write_col(group, "data", &[1.0f64, 4.0, 2.0, 3.5, 0.5, 1.0])?;
    write_col(group, "indices", &[0i64, 3, 1, 2, 1, 3])?;
    write_col(group, "indptr", &[0i64, 2, 4, 6])?;
    Ok(())
}

/// Write a 4-cell, 3-gene h5ad in the layout of older anndata and h5py writers:
///
/// * obs has no `_index` or `column-order` attributes, and its index is a fixed-length ASCII dataset named `index`
/// * obs columns: `batch` (legacy `__categories`), `cluster` (integer categories), `score` (float categories)
///   and `passed` (nullable-boolean)
/// * var has an empty float `column-order` next to an unlisted `gene_ids` column
/// * `X` is a CSC matrix tagged with `h5sparse_format`/`h5sparse_shape`; `X_csc` holds the same matrix
///   tagged with `encoding-type`
pub fn write_legacy_h5ad(path: &Path) -> Result<(), Error> {
    let file = File::create(path)?;

    let obs = file.create_group("obs")?;
    write_col(&obs, "index", &fixed_ascii(&["AAAC-1", "AAAG-1", "AACT-1", "AAGT-1"])?)?;
    let legacy = obs.create_group("__categories")?;
    write_col(&legacy, "batch", &fixed_ascii(&["ctrl", "stim"])?)?;
    write_col(&obs, "batch", &[0i8, 0, 1, 1])?;

    let cluster = obs.create_group("cluster")?;
    string_attribute(&cluster, "encoding-type", "categorical")?;
    write_col(&cluster, "categories", &[0i64, 3])?;
    write_col(&cluster, "codes", &[1i8, 0, 0, 1])?;

    let score = obs.create_group("score")?;
    string_attribute(&score, "encoding-type", "categorical")?;
    write_col(&score, "categories", &[0.5f64, 1.0])?;
    write_col(&score, "codes", &[0i8, 1, -1, 0])?;

    let passed = obs.create_group("passed")?;
    string_attribute(&passed, "encoding-type", "nullable-boolean")?;
    write_col(&passed, "values", &[true, false, true, false])?;
    write_col(&passed, "mask", &[false, false, true, false])?;

    let var = file.create_group("var")?;
    var.new_attr::<f64>().shape((0,)).create("column-order")?;
    write_col(&var, "index", &fixed_ascii(&["MS4A1", "CD8A", "CD14"])?)?;
    write_col(&var, "gene_ids", &unicode(&["ENSG1", "ENSG2", "ENSG3"])?)?;

    let x = file.create_group("X")?;
    string_attribute(&x, "h5sparse_format", "csc")?;
    let shape = x.new_attr::<i64>().shape((2,)).create("h5sparse_shape")?;
    shape.as_writer().write(&[4i64, 3][..])?;
    write_csc(&x)?;

    let x_csc = file.create_group("X_csc")?;
    string_attribute(&x_csc, "encoding-type", "csc_matrix")?;
    let shape = x_csc.new_attr::<i64>().shape((2,)).create("shape")?;
    shape.as_writer().write(&[4i64, 3][..])?;
    write_csc(&x_csc)?;

    let obsm = file.create_group("obsm")?;
    let umap = array![[-1.0, 2.0], [3.5, 0.25], [3.0, 0.5], [-2.0, 1.5]];
    obsm.new_dataset::<f64>()
        .shape(umap.dim())
        .create("X_umap")?
        .as_writer()
        .write(umap.view())?;
    Ok(())
}

use crate::dataframe::{read_dataframe, read_dataframe_index};
use crate::matrix::read_matrix;
use anyhow::{bail, Context, Error};
use hdf5::Group;
use log::{debug, info};
use ndarray::Array2;
use scan_types::AnnotatedMatrix;
use std::collections::BTreeMap;
use std::path::Path;

/// Read every 2-d numeric embedding under `obsm`. Other members are ignored.
fn read_obsm(obsm: &Group) -> Result<BTreeMap<String, Array2<f64>>, Error> {
    let mut embeddings = BTreeMap::new();
    for name in obsm.member_names()? {
        let Ok(dataset) = obsm.dataset(&name) else {
            debug!("skipping obsm/{name}: not a dataset");
            continue;
        };
        if dataset.ndim() != 2 {
            debug!("skipping obsm/{name}: shape {:?}", dataset.shape());
            continue;
        }
        match dataset.read_2d::<f64>() {
            Ok(values) => {
                embeddings.insert(name, values);
            }
            Err(e) => debug!("skipping obsm/{name}: {e}"),
        }
    }
    Ok(embeddings)
}

/// Load an h5ad file. The expression matrix `X` is only read when `with_expression` is set.
pub fn read_h5ad(path: impl AsRef<Path>, with_expression: bool) -> Result<AnnotatedMatrix, Error> {
    let path = path.as_ref();
    if !path.to_string_lossy().ends_with("h5ad") {
        bail!("Selected file must be of type h5ad: {}", path.display());
    }
    let file = hdf5::File::open(path).with_context(|| path.display().to_string())?;

    let (obs_names, obs) = read_dataframe(&file.group("obs")?).context("reading obs")?;
    let var_names = read_dataframe_index(&file.group("var")?).context("reading var")?;
    let obsm = if file.link_exists("obsm") {
        read_obsm(&file.group("obsm")?)?
    } else {
        BTreeMap::new()
    };
    let x = if with_expression {
        Some(read_matrix(&file, "X").context("reading X")?)
    } else {
        None
    };

    info!(
        "loaded {}: {} cells, {} genes, {} obs columns, obsm keys {:?}",
        path.display(),
        obs_names.len(),
        var_names.len(),
        obs.num_columns(),
        obsm.keys().collect::<Vec<_>>()
    );

    Ok(AnnotatedMatrix {
        obs_names,
        var_names,
        obs,
        obsm,
        x,
    })
}

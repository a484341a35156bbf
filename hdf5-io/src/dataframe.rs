use crate::{is_string_type, read_string_attr, read_strings};
use anyhow::{bail, Context, Error};
use hdf5::types::TypeDescriptor;
use hdf5::{Container, Dataset, Group};
use log::{debug, warn};
use scan_types::{ObsColumn, ObsFrame};

/// Group holding categories of anndata < 0.8 categorical columns
const LEGACY_CATEGORIES: &str = "__categories";

/// Name of the dataset holding the dataframe index.
fn index_name(group: &Group) -> Result<String, Error> {
    if let Some(name) = read_string_attr(group, "_index")? {
        return Ok(name);
    }
    for name in ["_index", "index"] {
        if group.link_exists(name) {
            return Ok(name.to_string());
        }
    }
    bail!("dataframe {} has no index", group.name())
}

/// Read only the row names of a dataframe group.
pub fn read_dataframe_index(group: &Group) -> Result<Vec<String>, Error> {
    let name = index_name(group)?;
    read_labels(&group.dataset(&name)?).with_context(|| format!("reading index {}/{name}", group.name()))
}

/// Column names in stored order, from the `column-order` attribute when present.
fn column_order(group: &Group, index: &str) -> Result<Vec<String>, Error> {
    if group.attr_names()?.iter().any(|n| n == "column-order") {
        let attr = group.attr("column-order")?;
        // an empty column order is written as an empty float array
        if attr.ndim() == 1 && is_string_type(&attr)? {
            return read_strings(&attr);
        }
        if attr.size() == 0 {
            return Ok(Vec::new());
        }
    }
    Ok(group
        .member_names()?
        .into_iter()
        .filter(|n| n != index && n != LEGACY_CATEGORIES)
        .collect())
}

/// Read a pandas dataframe group into its index and an `ObsFrame`.
/// Columns that cannot be read, or whose length does not match the index, are skipped.
pub fn read_dataframe(group: &Group) -> Result<(Vec<String>, ObsFrame), Error> {
    let index_name = index_name(group)?;
    let index = read_dataframe_index(group)?;
    let mut frame = ObsFrame::new(index.len());

    for name in column_order(group, &index_name)? {
        if !group.link_exists(&name) {
            warn!("column {name} listed in {} but not present", group.name());
            continue;
        }
        let pushed = read_column(group, &name).and_then(|column| frame.push(name.clone(), column));
        if let Err(e) = pushed {
            warn!("skipping column {name} of {}: {e:#}", group.name());
        }
    }
    debug!(
        "read {} columns x {} rows from {}",
        frame.num_columns(),
        frame.n_rows(),
        group.name()
    );
    Ok((index, frame))
}

fn read_column(parent: &Group, name: &str) -> Result<ObsColumn, Error> {
    if let Ok(group) = parent.group(name) {
        return read_encoded_column(&group);
    }
    let dataset = parent.dataset(name)?;

    if parent.link_exists(LEGACY_CATEGORIES) {
        let categories = parent.group(LEGACY_CATEGORIES)?;
        if categories.link_exists(name) {
            return Ok(ObsColumn::Categorical {
                categories: read_labels(&categories.dataset(name)?)?,
                codes: dataset.read_1d::<i32>()?.to_vec(),
            });
        }
    }
    read_plain_column(&dataset)
}

fn read_plain_column(dataset: &Dataset) -> Result<ObsColumn, Error> {
    if dataset.ndim() != 1 {
        bail!("expected a 1-d dataset, found shape {:?}", dataset.shape());
    }
    let is_string = is_string_type(dataset)?;
    Ok(match dataset.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            ObsColumn::Integer(dataset.read_1d::<i64>()?.iter().map(|&v| Some(v)).collect())
        }
        TypeDescriptor::Float(_) => ObsColumn::Float(dataset.read_1d::<f64>()?.to_vec()),
        TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => {
            ObsColumn::Boolean(dataset.read_1d::<bool>()?.iter().map(|&v| Some(v)).collect())
        }
        _ if is_string => ObsColumn::Text(read_strings(dataset)?),
        other => bail!("unsupported column type {other:?}"),
    })
}

/// Columns stored as groups, tagged by their `encoding-type` attribute.
fn read_encoded_column(group: &Group) -> Result<ObsColumn, Error> {
    let encoding = read_string_attr(group, "encoding-type")?.unwrap_or_default();
    match encoding.as_str() {
        "categorical" => Ok(ObsColumn::Categorical {
            categories: read_labels(&group.dataset("categories")?)?,
            codes: group.dataset("codes")?.read_1d::<i32>()?.to_vec(),
        }),
        "nullable-integer" => {
            let mask = group.dataset("mask")?.read_1d::<bool>()?;
            let values = group.dataset("values")?.read_1d::<i64>()?;
            Ok(ObsColumn::Integer(
                values
                    .iter()
                    .zip(mask.iter())
                    .map(|(&v, &missing)| (!missing).then_some(v))
                    .collect(),
            ))
        }
        "nullable-boolean" => {
            let mask = group.dataset("mask")?.read_1d::<bool>()?;
            let values = group.dataset("values")?.read_1d::<bool>()?;
            Ok(ObsColumn::Boolean(
                values
                    .iter()
                    .zip(mask.iter())
                    .map(|(&v, &missing)| (!missing).then_some(v))
                    .collect(),
            ))
        }
        "" => bail!("group {} has no encoding-type", group.name()),
        other => bail!("unsupported encoding-type {other}"),
    }
}

/// Read a 1-d dataset as display labels: strings as-is, numbers and booleans formatted.
pub fn read_labels(container: &Container) -> Result<Vec<String>, Error> {
    if is_string_type(container)? {
        return read_strings(container);
    }
    Ok(match container.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            container.read_1d::<i64>()?.iter().map(ToString::to_string).collect()
        }
        TypeDescriptor::Float(_) => container.read_1d::<f64>()?.iter().map(|v| format!("{v:?}")).collect(),
        TypeDescriptor::Boolean | TypeDescriptor::Enum(_) => container
            .read_1d::<bool>()?
            .iter()
            .map(|&b| if b { "True" } else { "False" }.to_string())
            .collect(),
        other => bail!("cannot read labels of type {other:?}"),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{write_example_h5ad, write_legacy_h5ad};

    #[test]
    fn test_read_obs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbmc.h5ad");
        write_example_h5ad(&path, false).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let (index, obs) = read_dataframe(&file.group("obs").unwrap()).unwrap();
        assert_eq!(index, vec!["AAAC-1", "AAAG-1", "AACT-1", "AAGT-1"]);
        assert_eq!(
            obs.names().collect::<Vec<_>>(),
            vec![
                "orig.ident",
                "nCount_RNA",
                "nFeature_RNA",
                "RNA_snn_res.0.5",
                "seurat_clusters",
                "is_doublet",
                "cell_type",
                "n_guides",
                "legacy_group",
            ]
        );

        assert_eq!(
            obs.column("seurat_clusters"),
            Some(&ObsColumn::Categorical {
                categories: vec!["0".to_string(), "1".to_string()],
                codes: vec![0, 1, 1, 0],
            })
        );
        assert_eq!(
            obs.column("nFeature_RNA"),
            Some(&ObsColumn::Integer(vec![Some(310), Some(208), Some(512), Some(97)]))
        );
        assert_eq!(
            obs.column("nCount_RNA"),
            Some(&ObsColumn::Float(vec![1200.0, 850.0, 2100.0, 301.0]))
        );
        assert_eq!(
            obs.column("is_doublet"),
            Some(&ObsColumn::Boolean(vec![Some(false), Some(false), Some(true), Some(false)]))
        );
        assert_eq!(
            obs.column("cell_type"),
            Some(&ObsColumn::Text(
                ["B", "T", "T", "Mono"].iter().map(ToString::to_string).collect()
            ))
        );
        assert_eq!(
            obs.column("n_guides"),
            Some(&ObsColumn::Integer(vec![Some(1), None, Some(2), Some(0)]))
        );
        assert_eq!(
            obs.column("legacy_group"),
            Some(&ObsColumn::Categorical {
                categories: vec!["ctrl".to_string(), "stim".to_string()],
                codes: vec![1, 0, 1, 1],
            })
        );
        // listed in column-order but one value short
        assert!(obs.column("bad_codes").is_none());
    }

    #[test]
    fn test_read_legacy_obs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.h5ad");
        write_legacy_h5ad(&path).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let (index, obs) = read_dataframe(&file.group("obs").unwrap()).unwrap();
        assert_eq!(index, vec!["AAAC-1", "AAAG-1", "AACT-1", "AAGT-1"]);
        // no column-order: member order, without the index and __categories
        assert_eq!(obs.names().collect::<Vec<_>>(), vec!["batch", "cluster", "passed", "score"]);

        assert_eq!(
            obs.column("batch"),
            Some(&ObsColumn::Categorical {
                categories: vec!["ctrl".to_string(), "stim".to_string()],
                codes: vec![0, 0, 1, 1],
            })
        );
        assert_eq!(
            obs.column("passed"),
            Some(&ObsColumn::Boolean(vec![Some(true), Some(false), None, Some(false)]))
        );

        let cluster = obs.column("cluster").unwrap();
        let labels: Vec<_> = (0..4).map(|cell| cluster.label(cell)).collect();
        assert_eq!(
            labels,
            vec![Some("3".to_string()), Some("0".to_string()), Some("0".to_string()), Some("3".to_string())]
        );
        let score = obs.column("score").unwrap();
        let labels: Vec<_> = (0..4).map(|cell| score.label(cell)).collect();
        assert_eq!(
            labels,
            vec![Some("0.5".to_string()), Some("1.0".to_string()), None, Some("0.5".to_string())]
        );
    }

    #[test]
    fn test_empty_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.h5ad");
        write_legacy_h5ad(&path).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let (genes, var) = read_dataframe(&file.group("var").unwrap()).unwrap();
        assert_eq!(genes, vec!["MS4A1", "CD8A", "CD14"]);
        assert_eq!(var.num_columns(), 0);
    }

    #[test]
    fn test_read_var_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbmc.h5ad");
        write_example_h5ad(&path, false).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let genes = read_dataframe_index(&file.group("var").unwrap()).unwrap();
        assert_eq!(genes, vec!["MS4A1", "CD8A", "CD14"]);
    }
}

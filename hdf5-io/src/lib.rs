//! io for AnnData (h5ad) files written by scanpy, anndata or Seurat conversion tools

#![deny(warnings)]

use anyhow::{bail, Error};
use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Container, Location};

/// io for pandas dataframes stored as h5ad groups (obs, var)
pub mod dataframe;
/// top-level h5ad reader
pub mod h5ad;
/// io for dense and sparse expression matrices (X)
pub mod matrix;

/// h5ad fixtures for tests in this and downstream crates
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use h5ad::read_h5ad;

/// Widest fixed-length string we read; shorter fixed strings are converted on read.
const FIXED_STRING_LEN: usize = 256;

/// Read a 1-d dataset or attribute of strings, whatever the string encoding.
pub fn read_strings(container: &Container) -> Result<Vec<String>, Error> {
    Ok(match container.dtype()?.to_descriptor()? {
        TypeDescriptor::VarLenUnicode => container
            .read_1d::<VarLenUnicode>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        TypeDescriptor::VarLenAscii => container
            .read_1d::<VarLenAscii>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        TypeDescriptor::FixedAscii(_) => container
            .read_1d::<FixedAscii<FIXED_STRING_LEN>>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        TypeDescriptor::FixedUnicode(_) => container
            .read_1d::<FixedUnicode<FIXED_STRING_LEN>>()?
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        other => bail!("expected strings, found {other:?}"),
    })
}

/// True if the container holds strings of any encoding.
pub fn is_string_type(container: &Container) -> Result<bool, Error> {
    Ok(matches!(
        container.dtype()?.to_descriptor()?,
        TypeDescriptor::VarLenUnicode
            | TypeDescriptor::VarLenAscii
            | TypeDescriptor::FixedAscii(_)
            | TypeDescriptor::FixedUnicode(_)
    ))
}

/// Read a scalar string attribute. Returns None if the attribute doesn't exist.
pub fn read_string_attr(loc: &Location, name: &str) -> Result<Option<String>, Error> {
    if !loc.attr_names()?.iter().any(|n| n == name) {
        return Ok(None);
    }
    let attr = loc.attr(name)?;
    let value = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::VarLenUnicode => attr.read_scalar::<VarLenUnicode>()?.to_string(),
        TypeDescriptor::VarLenAscii => attr.read_scalar::<VarLenAscii>()?.to_string(),
        TypeDescriptor::FixedAscii(_) => attr.read_scalar::<FixedAscii<FIXED_STRING_LEN>>()?.as_str().to_string(),
        TypeDescriptor::FixedUnicode(_) => attr
            .read_scalar::<FixedUnicode<FIXED_STRING_LEN>>()?
            .as_str()
            .to_string(),
        other => bail!("attribute {name} is not a string: {other:?}"),
    };
    Ok(Some(value))
}

use anyhow::{format_err, Context, Error};
use glob::{glob, Pattern};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Suffix of the column list written by the conversion script
pub const DROPDOWN_SUFFIX: &str = "_dropdown_data.txt";
/// Suffix of the AnnData file written by the conversion script
pub const H5AD_SUFFIX: &str = ".h5ad";

/// First regular file under `root` (recursively, in path order) whose name ends with `suffix`.
pub fn find_file_with_suffix(root: &Path, suffix: &str) -> Result<Option<PathBuf>, Error> {
    let root_str = root
        .to_str()
        .ok_or_else(|| format_err!("search path is not valid UTF-8: {}", root.display()))?;
    // directory names may contain glob metacharacters such as `[`
    let pattern = Path::new(&Pattern::escape(root_str))
        .join("**")
        .join(format!("*{}", Pattern::escape(suffix)));
    let pattern = pattern.to_string_lossy();

    for entry in glob(&pattern).with_context(|| pattern.to_string())? {
        match entry {
            Ok(path) => {
                let name_matches = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(suffix));
                if name_matches && path.is_file() {
                    return Ok(Some(path));
                }
            }
            Err(e) => debug!("skipping unreadable path {}: {}", e.path().display(), e.error()),
        }
    }
    Ok(None)
}

/// Files produced by the conversion script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionOutputs {
    pub dropdown: PathBuf,
    pub h5ad: PathBuf,
}

impl ConversionOutputs {
    pub fn discover(root: &Path) -> Result<ConversionOutputs, Error> {
        let find = |suffix: &str| -> Result<PathBuf, Error> {
            let path = find_file_with_suffix(root, suffix)?
                .ok_or_else(|| format_err!("no file ending in {suffix} found under {}", root.display()))?;
            info!("found {}", path.display());
            Ok(path)
        };
        Ok(ConversionOutputs {
            dropdown: find(DROPDOWN_SUFFIX)?,
            h5ad: find(H5AD_SUFFIX)?,
        })
    }
}

use anyhow::{Context, Error};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read the metadata columns to plot, one per line. Lines are trimmed and blank lines dropped.
pub fn read_dropdown_columns(path: &Path) -> Result<Vec<String>, Error> {
    let reader = BufReader::new(File::open(path).with_context(|| path.display().to_string())?);
    let mut columns = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| path.display().to_string())?;
        let name = line.trim();
        if !name.is_empty() {
            columns.push(name.to_string());
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbmc_dropdown_data.txt");
        std::fs::write(&path, "orig.ident\r\n  seurat_clusters \n\nRNA_snn_res.0.5\n   \n").unwrap();
        assert_eq!(
            read_dropdown_columns(&path).unwrap(),
            vec!["orig.ident", "seurat_clusters", "RNA_snn_res.0.5"]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = read_dropdown_columns(Path::new("/nonexistent/x_dropdown_data.txt")).unwrap_err();
        assert!(err.to_string().contains("x_dropdown_data.txt"));
    }
}

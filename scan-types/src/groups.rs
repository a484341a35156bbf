use anyhow::{format_err, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cells grouped by label. The cells of `labels[i]` are
/// `indices[offsets[i]..offsets[i + 1]]` (or up to the end for the last label).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CellGroups {
    pub labels: Vec<String>,
    pub offsets: Vec<i64>,
    pub indices: Vec<i64>,
}

impl CellGroups {
    pub fn new(labels: Vec<String>, offsets: Vec<i64>, indices: Vec<i64>) -> Result<CellGroups, Error> {
        if labels.len() != offsets.len() {
            return Err(format_err!("Label and offsets length unequal"));
        }
        Ok(CellGroups {
            labels,
            offsets,
            indices,
        })
    }

    /// Group cells by their label. Labels are kept in sorted order, cells within a group in cell order.
    pub fn from_cell_labels<S: AsRef<str>>(cell_labels: &[S]) -> CellGroups {
        let mut by_label: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
        for (cell, label) in cell_labels.iter().enumerate() {
            by_label.entry(label.as_ref()).or_default().push(cell as i64);
        }

        let mut groups = CellGroups::default();
        for (label, cells) in by_label {
            groups.labels.push(label.to_string());
            groups.offsets.push(groups.indices.len() as i64);
            groups.indices.extend(cells);
        }
        groups
    }

    fn get_label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|x| x == label)
    }

    /// Returns either the set of cell indices carrying the given label or None if the label doesn't exist.
    pub fn get_indices(&self, label: &str) -> Option<&[i64]> {
        self.get_label_index(label).map(|idx| {
            let offset = self.offsets[idx] as usize;
            if idx == self.offsets.len() - 1 {
                &self.indices[offset..]
            } else {
                let next_offset = self.offsets[idx + 1] as usize;
                &self.indices[offset..next_offset]
            }
        })
    }

    /// Number of cells carrying `label`, zero for unknown labels.
    pub fn size(&self, label: &str) -> usize {
        self.get_indices(label).map_or(0, <[i64]>::len)
    }

    pub fn num_groups(&self) -> usize {
        self.labels.len()
    }

    /// Size of the group each cell belongs to, in cell order.
    pub fn cell_group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.indices.len()];
        for label in &self.labels {
            let cells = self.get_indices(label).unwrap_or_default();
            for &cell in cells {
                sizes[cell as usize] = cells.len();
            }
        }
        sizes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn clusters() -> Vec<&'static str> {
        vec!["1", "0", "1", "2", "0", "1"]
    }

    #[test]
    fn test_from_cell_labels() {
        let groups = CellGroups::from_cell_labels(&clusters());
        assert_eq!(groups.labels, vec!["0", "1", "2"]);
        assert_eq!(groups.offsets, vec![0, 2, 5]);
        assert_eq!(groups.indices, vec![1, 4, 0, 2, 5, 3]);
        assert_eq!(groups.num_groups(), 3);
    }

    #[test]
    fn test_get_indices() {
        let groups = CellGroups::from_cell_labels(&clusters());
        assert_eq!(groups.get_indices("0"), Some(&[1i64, 4][..]));
        assert_eq!(groups.get_indices("1"), Some(&[0i64, 2, 5][..]));
        assert_eq!(groups.get_indices("2"), Some(&[3i64][..]));
        assert_eq!(groups.get_indices("7"), None);
        assert_eq!(groups.size("1"), 3);
        assert_eq!(groups.size("7"), 0);
    }

    #[test]
    fn test_cell_group_sizes() {
        let groups = CellGroups::from_cell_labels(&clusters());
        assert_eq!(groups.cell_group_sizes(), vec![3, 2, 3, 1, 2, 3]);
        assert!(CellGroups::from_cell_labels::<&str>(&[]).cell_group_sizes().is_empty());
    }

    #[test]
    fn test_new_checks_lengths() {
        assert!(CellGroups::new(vec!["a".to_string()], vec![], vec![]).is_err());
        assert!(CellGroups::new(vec!["a".to_string()], vec![0], vec![0, 1]).is_ok());
    }
}

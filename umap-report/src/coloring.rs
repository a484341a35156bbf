use anyhow::{bail, Error};
use log::warn;
use scan_types::ObsColumn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns with at least this many distinct values are hard to read as categories.
pub const MAX_CATEGORIES: usize = 40;

/// How plot points are colored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    /// One discrete color per distinct value, with a legend
    Categorical,
    /// A color gradient over numeric values, with a color bar
    #[default]
    Continuous,
}

impl FromStr for ColorScale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categorical" => Ok(ColorScale::Categorical),
            "continuous" => Ok(ColorScale::Continuous),
            _ => bail!("Color scale not recognized: {}", s),
        }
    }
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorScale::Categorical => "categorical",
            ColorScale::Continuous => "continuous",
        })
    }
}

/// Decide the color scale for a metadata column, overriding a categorical request for columns with
/// too many distinct values when they are all numeric.
///
/// Both outcomes of the distinct-value check only warn: the column is still plotted, on a continuous scale
/// when its values are numeric and on the requested categorical scale otherwise. Neither is an error.
pub fn determine_coloring(column: &ObsColumn, name: &str, requested: ColorScale) -> ColorScale {
    if requested != ColorScale::Categorical {
        return requested;
    }
    let n_unique = column.n_unique();
    if n_unique < MAX_CATEGORIES {
        return requested;
    }
    if column.is_numeric() {
        warn!(
            "{name} has {n_unique} unique numeric entries; color scaling was changed from categorical to continuous"
        );
        ColorScale::Continuous
    } else {
        warn!("{name} has {n_unique} unique non-numeric entries; the categorical legend will be hard to read");
        requested
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn numbers(n: usize) -> ObsColumn {
        ObsColumn::Float((0..n).map(|v| v as f64 * 0.5).collect())
    }

    fn words(n: usize) -> ObsColumn {
        ObsColumn::Text((0..n).map(|v| format!("cell type {v}")).collect())
    }

    #[test]
    fn test_parse() {
        assert_eq!("categorical".parse::<ColorScale>().unwrap(), ColorScale::Categorical);
        assert_eq!("continuous".parse::<ColorScale>().unwrap(), ColorScale::Continuous);
        assert!("Continuous".parse::<ColorScale>().is_err());
        assert_eq!(ColorScale::default(), ColorScale::Continuous);
        assert_eq!(ColorScale::Categorical.to_string(), "categorical");
    }

    #[test]
    fn test_keeps_small_categorical() {
        let col = numbers(MAX_CATEGORIES - 1);
        assert_eq!(determine_coloring(&col, "x", ColorScale::Categorical), ColorScale::Categorical);
    }

    #[test]
    fn test_many_numeric_values_become_continuous() {
        let col = numbers(MAX_CATEGORIES);
        assert_eq!(determine_coloring(&col, "x", ColorScale::Categorical), ColorScale::Continuous);

        // numbers stored as text still count as numeric
        let text = ObsColumn::Text((0..50).map(|v| v.to_string()).collect());
        assert_eq!(determine_coloring(&text, "x", ColorScale::Categorical), ColorScale::Continuous);
    }

    #[test]
    fn test_many_words_stay_categorical() {
        let col = words(60);
        assert_eq!(determine_coloring(&col, "x", ColorScale::Categorical), ColorScale::Categorical);
    }

    #[test]
    fn test_continuous_request_is_kept() {
        assert_eq!(determine_coloring(&words(3), "x", ColorScale::Continuous), ColorScale::Continuous);
        assert_eq!(determine_coloring(&numbers(100), "x", ColorScale::Continuous), ColorScale::Continuous);
    }
}

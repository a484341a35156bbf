use anyhow::{bail, format_err, Error};
use std::cmp::Ordering;
use std::collections::HashSet;

/// One per-cell annotation column, as stored in an AnnData `obs` dataframe.
#[derive(Clone, Debug, PartialEq)]
pub enum ObsColumn {
    /// Pandas categorical. A code of `-1` marks a missing value.
    Categorical { categories: Vec<String>, codes: Vec<i32> },
    Integer(Vec<Option<i64>>),
    /// NaN marks a missing value
    Float(Vec<f64>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<String>),
}

impl ObsColumn {
    pub fn len(&self) -> usize {
        match self {
            ObsColumn::Categorical { codes, .. } => codes.len(),
            ObsColumn::Integer(v) => v.len(),
            ObsColumn::Float(v) => v.len(),
            ObsColumn::Boolean(v) => v.len(),
            ObsColumn::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn category(&self, code: i32) -> Option<&str> {
        match self {
            ObsColumn::Categorical { categories, .. } if code >= 0 => categories.get(code as usize).map(String::as_str),
            _ => None,
        }
    }

    /// Display label of a cell's value, `None` if the value is missing.
    pub fn label(&self, cell: usize) -> Option<String> {
        match self {
            ObsColumn::Categorical { codes, .. } => self.category(codes[cell]).map(str::to_string),
            ObsColumn::Integer(v) => v[cell].map(|x| x.to_string()),
            ObsColumn::Float(v) if v[cell].is_nan() => None,
            ObsColumn::Float(v) => Some(format!("{:?}", v[cell])),
            ObsColumn::Boolean(v) => v[cell].map(|b| if b { "True" } else { "False" }.to_string()),
            ObsColumn::Text(v) => Some(v[cell].clone()),
        }
    }

    /// Numeric value of a cell, `None` if missing. Text and category labels must parse as numbers.
    pub fn numeric(&self, cell: usize) -> Result<Option<f64>, Error> {
        let text = match self {
            ObsColumn::Integer(v) => return Ok(v[cell].map(|x| x as f64)),
            ObsColumn::Float(v) => return Ok(Some(v[cell]).filter(|x| !x.is_nan())),
            ObsColumn::Boolean(v) => return Ok(v[cell].map(|b| if b { 1.0 } else { 0.0 })),
            ObsColumn::Categorical { codes, .. } => match self.category(codes[cell]) {
                Some(c) => c,
                None => return Ok(None),
            },
            ObsColumn::Text(v) => v[cell].as_str(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format_err!("unable to parse string \"{text}\" as a number"))
    }

    /// Numeric values for every cell; missing values become NaN.
    pub fn to_numeric(&self) -> Result<Vec<f64>, Error> {
        (0..self.len())
            .map(|cell| Ok(self.numeric(cell)?.unwrap_or(f64::NAN)))
            .collect()
    }

    /// True if every non-missing value can be read as a number.
    pub fn is_numeric(&self) -> bool {
        (0..self.len()).all(|cell| self.numeric(cell).is_ok())
    }

    /// Number of distinct non-missing values.
    pub fn n_unique(&self) -> usize {
        match self {
            ObsColumn::Categorical { codes, .. } => codes
                .iter()
                .filter(|&&c| self.category(c).is_some())
                .collect::<HashSet<_>>()
                .len(),
            ObsColumn::Float(v) => v
                .iter()
                .filter(|x| !x.is_nan())
                .map(|x| x.to_bits())
                .collect::<HashSet<_>>()
                .len(),
            _ => (0..self.len()).filter_map(|cell| self.label(cell)).collect::<HashSet<_>>().len(),
        }
    }

    /// Stable permutation of cell indices that orders the column by value, missing values last.
    /// Categoricals sort by category order rather than by label.
    pub fn sort_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        match self {
            ObsColumn::Categorical { categories, codes } => {
                let key = |c: usize| {
                    let code = codes[c];
                    if code >= 0 && (code as usize) < categories.len() {
                        code as i64
                    } else {
                        i64::MAX
                    }
                };
                order.sort_by_key(|&c| key(c));
            }
            ObsColumn::Integer(v) => order.sort_by(|&a, &b| missing_last(v[a].as_ref(), v[b].as_ref())),
            ObsColumn::Float(v) => {
                let value = |c: usize| Some(v[c]).filter(|x| !x.is_nan());
                order.sort_by(|&a, &b| match (value(a), value(b)) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (x, y) => missing_last(x.as_ref(), y.as_ref()),
                });
            }
            ObsColumn::Boolean(v) => order.sort_by(|&a, &b| missing_last(v[a].as_ref(), v[b].as_ref())),
            ObsColumn::Text(v) => order.sort_by(|&a, &b| v[a].cmp(&v[b])),
        }
        order
    }
}

fn missing_last<T: PartialOrd>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ordered, named per-cell annotation columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObsFrame {
    n_rows: usize,
    columns: Vec<(String, ObsColumn)>,
}

impl ObsFrame {
    pub fn new(n_rows: usize) -> ObsFrame {
        ObsFrame {
            n_rows,
            columns: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Append a column. Its length must match the frame and its name must be new.
    pub fn push(&mut self, name: impl Into<String>, column: ObsColumn) -> Result<(), Error> {
        let name = name.into();
        if column.len() != self.n_rows {
            bail!(
                "column {name} has {} values but the frame has {} rows",
                column.len(),
                self.n_rows
            );
        }
        if self.column(&name).is_some() {
            bail!("duplicate column {name}");
        }
        self.columns.push((name, column));
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&ObsColumn> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

use crate::error::{Result, SymstackError};
use polars::prelude::*;

/// Read-only numeric feature table, one column per variable
///
/// Stored column-major since evaluation pushes whole columns onto the
/// stack. Owned by the caller and passed by reference into evaluation; no
/// instruction mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Build from named columns; every column must have the same length
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(SymstackError::Data(format!(
                "{} names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != n_rows {
                return Err(SymstackError::Data(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    n_rows
                )));
            }
        }
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Build from row-major data, naming columns `x_0`, `x_1`, ...
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_columns = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut columns = vec![Vec::with_capacity(rows.len()); n_columns];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n_columns {
                return Err(SymstackError::Data(format!(
                    "row {} has {} values, expected {}",
                    r,
                    row.len(),
                    n_columns
                )));
            }
            for (c, value) in row.iter().enumerate() {
                columns[c].push(*value);
            }
        }
        let names = (0..n_columns).map(|c| format!("x_{}", c)).collect();
        Self::from_columns(names, columns)
    }

    /// Adapt a caller-supplied DataFrame
    ///
    /// Every column is cast to Float64; nulls become NaN (and are scrubbed
    /// to the sentinel the moment an instruction pushes them).
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut names = Vec::with_capacity(df.width());
        let mut columns = Vec::with_capacity(df.width());
        for col_name in df.get_column_names() {
            let series = df.column(col_name)?.cast(&DataType::Float64)?;
            let values = series.f64()?;
            let mut column = Vec::with_capacity(df.height());
            let mut nulls = 0usize;
            for i in 0..df.height() {
                match values.get(i) {
                    Some(v) => column.push(v),
                    None => {
                        nulls += 1;
                        column.push(f64::NAN);
                    }
                }
            }
            if nulls > 0 {
                log::warn!("column '{}' has {} null values, mapped to NaN", col_name, nulls);
            }
            names.push(col_name.to_string());
            columns.push(column);
        }
        Self::from_columns(names, columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column by position; an index past the table is a loud error
    pub fn column(&self, index: usize) -> Result<&[f64]> {
        self.columns
            .get(index)
            .map(|c| c.as_slice())
            .ok_or_else(|| {
                SymstackError::Evaluation(format!(
                    "feature index {} out of range ({} columns)",
                    index,
                    self.columns.len()
                ))
            })
    }

    /// Single cell lookup
    pub fn value(&self, row: usize, column: usize) -> Result<f64> {
        let col = self.column(column)?;
        col.get(row).copied().ok_or_else(|| {
            SymstackError::Evaluation(format!(
                "row {} out of range ({} rows)",
                row, self.n_rows
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_transposes() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_columns(), 2);
        assert_eq!(m.column(0).unwrap(), &[1.0, 3.0]);
        assert_eq!(m.column(1).unwrap(), &[2.0, 4.0]);
        assert_eq!(m.names(), &["x_0".to_string(), "x_1".to_string()]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, SymstackError::Data(_)));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = FeatureMatrix::from_columns(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0], vec![2.0, 3.0]],
        )
        .unwrap_err();
        assert!(matches!(err, SymstackError::Data(_)));
    }

    #[test]
    fn test_out_of_range_lookups_are_loud() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0]]).unwrap();
        assert!(m.column(1).is_err());
        assert!(m.value(1, 0).is_err());
    }

    #[test]
    fn test_from_dataframe_casts_and_keeps_nulls_as_nan() {
        let df = df! {
            "price" => [1.5f64, 2.5, 3.5],
            "count" => [1i64, 2, 3],
        }
        .unwrap();
        let m = FeatureMatrix::from_dataframe(&df).unwrap();
        assert_eq!(m.names(), &["price".to_string(), "count".to_string()]);
        assert_eq!(m.column(1).unwrap(), &[1.0, 2.0, 3.0]);

        let with_null = df! {
            "v" => [Some(1.0f64), None, Some(3.0)],
        }
        .unwrap();
        let m = FeatureMatrix::from_dataframe(&with_null).unwrap();
        assert!(m.value(1, 0).unwrap().is_nan());
    }
}

//! Run parameter (metadata) table.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use super::{parse_cell, semicolon_reader, LoadError};
use crate::config::defaults::PARAMETER_INDEX_COLUMN;
use crate::types::MetadataField;

/// Metadata rows keyed by run id, columns in file order (index excluded).
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    columns: Vec<String>,
    rows: HashMap<u32, Vec<String>>,
}

impl ParameterTable {
    /// Load the table. Absence is fatal for the whole batch.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::MissingParameterTable(path.to_path_buf()));
        }

        let csv_err = |source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = semicolon_reader(path)?;
        let headers = rdr.headers().map_err(csv_err)?.clone();

        let index = headers
            .iter()
            .position(|h| h == PARAMETER_INDEX_COLUMN)
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: PARAMETER_INDEX_COLUMN.to_string(),
            })?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows = HashMap::new();
        for record in rdr.records() {
            let record = record.map_err(csv_err)?;
            let Some(id) = record.get(index).and_then(parse_run_id) else {
                warn!(path = %path.display(), row = ?record.position().map(csv::Position::line), "Unreadable run id in parameter table, row ignored");
                continue;
            };
            let values: Vec<String> = record
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != index)
                .map(|(_, v)| v.to_string())
                .collect();
            rows.insert(id, values);
        }

        debug!(path = %path.display(), runs = rows.len(), "Loaded parameter table");
        Ok(Self { columns, rows })
    }

    /// Build a table in memory (column names exclude the index).
    pub fn from_rows(columns: Vec<String>, rows: impl IntoIterator<Item = (u32, Vec<String>)>) -> Self {
        Self {
            columns,
            rows: rows.into_iter().collect(),
        }
    }

    /// Metadata column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metadata fields of `run_id`; non-numeric cells parse as 0 but keep
    /// their raw text.
    pub fn metadata_for(&self, run_id: u32) -> Result<Vec<MetadataField>, LoadError> {
        let row = self
            .rows
            .get(&run_id)
            .ok_or(LoadError::MissingMetadata(run_id))?;

        Ok(self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let raw = row.get(i).cloned().unwrap_or_default();
                let value = parse_cell(&raw).unwrap_or(0.0);
                MetadataField {
                    name: name.clone(),
                    raw,
                    value,
                }
            })
            .collect())
    }
}

/// Accept `7` as well as `7.0`.
fn parse_run_id(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    cell.parse::<u32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
            .map(|v| v as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_table(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("Parameter_Simulation_01.csv");
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(contents.as_bytes()).expect("write");
        path
    }

    #[test]
    fn loads_rows_by_index_column() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_table(
            dir.path(),
            "No.;Diameter;Wall thickness;Mandrel\n1;40;2.5;1\n2.0;42;3;n/a\n",
        );
        let table = ParameterTable::load(&path).expect("load");

        assert_eq!(table.columns(), &["Diameter", "Wall thickness", "Mandrel"]);
        assert_eq!(table.len(), 2);

        let meta = table.metadata_for(2).expect("run 2");
        assert_eq!(meta[0].value, 42.0);
        assert_eq!(meta[2].raw, "n/a");
        assert_eq!(meta[2].value, 0.0);
    }

    #[test]
    fn missing_table_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ParameterTable::load(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::MissingParameterTable(_)));
    }

    #[test]
    fn missing_index_column_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_table(dir.path(), "Run;Diameter\n1;40\n");
        let err = ParameterTable::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn unknown_run_has_no_metadata() {
        let table = ParameterTable::from_rows(vec!["Diameter".into()], [(1, vec!["40".into()])]);
        assert!(matches!(table.metadata_for(9), Err(LoadError::MissingMetadata(9))));
    }
}

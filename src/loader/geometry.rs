//! Before/after springback geometry tables.

use std::path::Path;

use tracing::warn;

use super::{folder_name, parse_cell, semicolon_reader, LoadError};
use crate::types::{GeometrySample, GeometryTable, Springback, GEOMETRY_ANGLE_COLUMN};

/// Load one geometry table of `run_id`.
///
/// Rows whose angle cell is not numeric carry no position to window on and
/// are dropped with a warning.
pub fn load_geometry(
    base_dir: &Path,
    folder_prefix: &str,
    run_id: u32,
    variant: Springback,
) -> Result<GeometryTable, LoadError> {
    let folder = folder_name(folder_prefix, run_id);
    let path = base_dir.join(&folder).join(variant.file_name(&folder));
    if !path.is_file() {
        return Err(LoadError::MissingFile(path));
    }

    let csv_err = |source| LoadError::Csv {
        path: path.clone(),
        source,
    };
    let mut rdr = semicolon_reader(&path)?;
    let header: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let angle_idx = header
        .iter()
        .position(|h| h == GEOMETRY_ANGLE_COLUMN)
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.clone(),
            column: GEOMETRY_ANGLE_COLUMN.to_string(),
        })?;

    let mut samples = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        match record.get(angle_idx).and_then(parse_cell) {
            Some(angle) => samples.push(GeometrySample {
                angle,
                fields: record.iter().map(str::to_string).collect(),
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(run = run_id, %variant, dropped, "Geometry rows without a numeric angle dropped");
    }

    Ok(GeometryTable {
        variant,
        header,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_geometry(base: &Path, variant: Springback, contents: &str) {
        let folder = folder_name("SIM_V12-", 12);
        let dir = base.join(&folder);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(variant.file_name(&folder)), contents).expect("write");
    }

    #[test]
    fn loads_angles_in_source_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_geometry(
            tmp.path(),
            Springback::After,
            "Angle[degree];Radius[mm];Ovality[%]\n30.0;80;1.2\n10.5;81;1.1\nbad;0;0\n20;79;1.4\n",
        );

        let table = load_geometry(tmp.path(), "SIM_V12-", 12, Springback::After).expect("load");
        assert_eq!(table.variant, Springback::After);
        assert_eq!(table.angles().collect::<Vec<_>>(), vec![30.0, 10.5, 20.0]);
        assert_eq!(table.field(&table.samples[1], "Radius[mm]"), Some("81"));
    }

    #[test]
    fn missing_geometry_file_is_reported() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_geometry(tmp.path(), Springback::Before, "Angle[degree]\n1\n");
        let err = load_geometry(tmp.path(), "SIM_V12-", 12, Springback::After).unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(p) if p.ends_with("SIM_V12-12_geometry_after_springback.csv")));
    }

    #[test]
    fn missing_angle_column_is_reported() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_geometry(tmp.path(), Springback::Before, "Angle;Radius\n1;2\n");
        let err = load_geometry(tmp.path(), "SIM_V12-", 12, Springback::Before).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }
}

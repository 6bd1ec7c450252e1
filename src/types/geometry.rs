//! Geometry (springback) sample types

use serde::Serialize;

/// Column holding the bend angle in geometry tables.
pub const GEOMETRY_ANGLE_COLUMN: &str = "Angle[degree]";

/// Which geometry table of a run: measured before or after springback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Springback {
    Before,
    After,
}

impl Springback {
    pub const ALL: [Springback; 2] = [Springback::Before, Springback::After];

    /// Label used in file names (`before_springback` / `after_springback`).
    pub const fn label(self) -> &'static str {
        match self {
            Springback::Before => "before_springback",
            Springback::After => "after_springback",
        }
    }

    /// Geometry file name inside a run folder.
    pub fn file_name(self, folder: &str) -> String {
        format!("{folder}_geometry_{}.csv", self.label())
    }
}

impl std::fmt::Display for Springback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a geometry table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometrySample {
    /// Bend angle in degrees
    pub angle: f64,
    /// Raw cells of the row in header order, angle included
    pub fields: Vec<String>,
}

/// A before- or after-springback geometry table, rows in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryTable {
    pub variant: Springback,
    pub header: Vec<String>,
    pub samples: Vec<GeometrySample>,
}

impl GeometryTable {
    /// Angle values in source order.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.angle)
    }

    /// Raw auxiliary cell of a sample by column name.
    #[cfg(test)]
    pub fn field<'a>(&self, sample: &'a GeometrySample, column: &str) -> Option<&'a str> {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|i| sample.fields.get(i))
            .map(String::as_str)
    }
}

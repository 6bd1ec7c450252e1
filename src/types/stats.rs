//! Window statistic types

use serde::Serialize;

/// Min / max / mean of one column over one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stat {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl Stat {
    pub const NAN: Stat = Stat {
        min: f64::NAN,
        max: f64::NAN,
        avg: f64::NAN,
    };

    pub const fn constant(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            avg: value,
        }
    }
}

/// Statistics for one geometry angle sample whose window was non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatistic {
    /// The geometry angle the window was centred on (degrees)
    pub angle: f64,
    /// Rows of the run that fell inside the window
    pub sample_count: usize,
    /// One entry per column of [`WindowStatistics::columns`]
    pub stats: Vec<Stat>,
}

/// All window statistics of one run against one geometry table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatistics {
    /// Column names, aligned with every row's `stats`
    pub columns: Vec<String>,
    pub rows: Vec<WindowStatistic>,
}

impl WindowStatistics {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Statistic of a named column in a row.
    pub fn stat(&self, row: usize, column: &str) -> Option<Stat> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.stats.get(col)).copied()
    }
}

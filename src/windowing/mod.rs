//! Windowed Aggregation Engine
//!
//! Maps every geometry angle sample onto an interval of the run's bend-angle
//! series and reduces the rows inside that interval to per-column
//! min / max / mean.
//!
//! ## Window policies
//!
//! | policy               | half-width | interval        |
//! |----------------------|-----------:|-----------------|
//! | `before`             | 1.0°       | `[a - w, a]`    |
//! | `after`              | 1.0°       | `[a, a + w]`    |
//! | `middle_small`       | 0.5°       | `[a - w, a + w]`|
//! | `middle_large`       | 2.0°       | `[a - w, a + w]`|
//! | `middle_extra_large` | 3.0°       | `[a - w, a + w]`|
//!
//! Bounds are inclusive. Angles whose window selects no rows produce no
//! statistic at all.
//!
//! ## NaN handling
//!
//! A NaN anywhere inside a column's window poisons that column's min, max
//! and mean. A NaN bend angle never falls inside any window.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{ColumnData, SampleTable, Stat, WindowStatistic, WindowStatistics};

/// How the window around a geometry angle is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Window ends at the geometry angle
    Before,
    /// Window starts at the geometry angle
    After,
    MiddleSmall,
    MiddleLarge,
    MiddleExtraLarge,
}

impl WindowPolicy {
    pub const ALL: [WindowPolicy; 5] = [
        WindowPolicy::Before,
        WindowPolicy::After,
        WindowPolicy::MiddleSmall,
        WindowPolicy::MiddleLarge,
        WindowPolicy::MiddleExtraLarge,
    ];

    /// Half-width of the window in degrees.
    pub const fn half_width(self) -> f64 {
        match self {
            WindowPolicy::Before | WindowPolicy::After => 1.0,
            WindowPolicy::MiddleSmall => 0.5,
            WindowPolicy::MiddleLarge => 2.0,
            WindowPolicy::MiddleExtraLarge => 3.0,
        }
    }

    /// Inclusive `(lower, upper)` bounds around `angle`.
    pub fn bounds(self, angle: f64) -> (f64, f64) {
        let w = self.half_width();
        match self {
            WindowPolicy::Before => (angle - w, angle),
            WindowPolicy::After => (angle, angle + w),
            WindowPolicy::MiddleSmall
            | WindowPolicy::MiddleLarge
            | WindowPolicy::MiddleExtraLarge => (angle - w, angle + w),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            WindowPolicy::Before => "before",
            WindowPolicy::After => "after",
            WindowPolicy::MiddleSmall => "middle_small",
            WindowPolicy::MiddleLarge => "middle_large",
            WindowPolicy::MiddleExtraLarge => "middle_extra_large",
        }
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        WindowPolicy::MiddleSmall
    }
}

impl std::fmt::Display for WindowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised window policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown window policy '{0}' (expected one of: before, after, middle_small, middle_large, middle_extra_large)")]
pub struct UnknownPolicy(pub String);

impl FromStr for WindowPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowPolicy::ALL
            .into_iter()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

/// Aggregate one run against a sequence of geometry angles.
///
/// Output rows follow the order of `angles`; angles with an empty window are
/// dropped.
pub fn aggregate<I>(table: &SampleTable<'_>, angles: I, policy: WindowPolicy) -> WindowStatistics
where
    I: IntoIterator<Item = f64>,
{
    let columns: Vec<String> = table.columns.iter().map(|c| c.name.to_string()).collect();
    let mut rows = Vec::new();
    let mut selected: Vec<usize> = Vec::new();

    for angle in angles {
        let (lower, upper) = policy.bounds(angle);

        selected.clear();
        selected.extend(
            table
                .angle
                .iter()
                .enumerate()
                .filter(|&(_, &a)| a >= lower && a <= upper)
                .map(|(i, _)| i),
        );

        if selected.is_empty() {
            tracing::trace!(angle, lower, upper, "empty window");
            continue;
        }

        let stats = table
            .columns
            .iter()
            .map(|c| reduce(c.data, &selected))
            .collect();

        rows.push(WindowStatistic {
            angle,
            sample_count: selected.len(),
            stats,
        });
    }

    WindowStatistics { columns, rows }
}

/// Min / max / mean of `data` over the selected row indices (non-empty).
fn reduce(data: ColumnData<'_>, rows: &[usize]) -> Stat {
    match data {
        ColumnData::Broadcast(v) if v.is_nan() => return Stat::NAN,
        ColumnData::Broadcast(v) => return Stat::constant(v),
        ColumnData::Series(_) => {}
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &i in rows {
        let v = data.value_at(i);
        if v.is_nan() {
            return Stat::NAN;
        }
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }

    Stat {
        min,
        max,
        avg: sum / rows.len() as f64,
    }
}

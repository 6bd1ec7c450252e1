//! Simulation run types

use serde::Serialize;

use super::channels::{ANGLE_CHANNEL, RAW_CHANNELS, RAW_CHANNEL_COUNT, TIME_COLUMN};

/// One scalar metadata attribute of a run (diameter, wall thickness, ...).
///
/// The raw cell text is kept next to the parsed value so that emitted
/// tables and captions reproduce the parameter table verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataField {
    pub name: String,
    pub raw: String,
    pub value: f64,
}

/// One simulation run: twelve aligned channel series plus broadcast metadata.
///
/// Stored column-wise. Every series in `channels` has the same length as
/// `time`, in [`RAW_CHANNELS`] order, with the angle channel in degrees.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub id: u32,
    pub time: Vec<f64>,
    pub channels: Vec<Vec<f64>>,
    pub metadata: Vec<MetadataField>,
    /// Cells that failed numeric coercion and were replaced by 0
    pub coerced_cells: usize,
}

impl Run {
    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Bend angle series in degrees.
    pub fn angle(&self) -> &[f64] {
        &self.channels[0]
    }

    /// Look up a raw channel series by name.
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        RAW_CHANNELS
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| self.channels.get(i))
            .map(Vec::as_slice)
    }

    /// View the run as a merged sample table.
    ///
    /// Column order matches the merged run table: `Time` (only when
    /// `include_time`), the eleven non-angle raw channels, then every
    /// metadata field broadcast over all samples.
    pub fn sample_table(&self, include_time: bool) -> SampleTable<'_> {
        let mut columns = Vec::with_capacity(RAW_CHANNEL_COUNT + self.metadata.len());
        if include_time {
            columns.push(Column::series(TIME_COLUMN, &self.time));
        }
        for (channel, values) in RAW_CHANNELS.iter().zip(&self.channels) {
            if channel.name != ANGLE_CHANNEL {
                columns.push(Column::series(channel.name, values));
            }
        }
        for field in &self.metadata {
            columns.push(Column {
                name: &field.name,
                data: ColumnData::Broadcast(field.value),
            });
        }
        SampleTable {
            angle: self.angle(),
            columns,
        }
    }
}

/// Values of one sample-table column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnData<'a> {
    /// One value per sample
    Series(&'a [f64]),
    /// The same value on every sample (run metadata)
    Broadcast(f64),
}

impl ColumnData<'_> {
    pub fn value_at(&self, index: usize) -> f64 {
        match *self {
            ColumnData::Series(values) => values[index],
            ColumnData::Broadcast(value) => value,
        }
    }
}

/// A named column borrowed from a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column<'a> {
    pub name: &'a str,
    pub data: ColumnData<'a>,
}

impl<'a> Column<'a> {
    pub const fn series(name: &'a str, values: &'a [f64]) -> Self {
        Self {
            name,
            data: ColumnData::Series(values),
        }
    }
}

/// Borrowed, time-aligned view of a run: the angle series plus every other
/// column that window statistics are computed over.
#[derive(Debug, Clone)]
pub struct SampleTable<'a> {
    pub angle: &'a [f64],
    pub columns: Vec<Column<'a>>,
}

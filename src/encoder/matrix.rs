//! Fixed 20-channel input matrix for the encoder.

use std::io::Read;
use std::path::Path;

use crate::types::{Run, ENCODER_CHANNEL_COUNT, TIME_COLUMN};

/// Run samples laid out in the canonical encoder schema.
///
/// Column `i` of the merged run table feeds channel `i`. Columns past the
/// twentieth are ignored, absent columns read as 0, and cells that are not
/// finite numbers are coerced to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMatrix {
    channels: Vec<Vec<f64>>,
    len: usize,
    /// Raw cells of the first data row, used for the caption
    first_row: Vec<String>,
    coerced: usize,
}

impl ChannelMatrix {
    /// Build from raw text rows (header already removed).
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut channels = vec![Vec::new(); ENCODER_CHANNEL_COUNT];
        let mut first_row = None;
        let mut coerced = 0;
        let mut len = 0;

        for row in rows {
            let row: Vec<R::Item> = row.into_iter().collect();
            if first_row.is_none() {
                first_row = Some(row.iter().map(|c| c.as_ref().to_string()).collect());
            }
            for (i, channel) in channels.iter_mut().enumerate() {
                let value = match row.get(i) {
                    Some(cell) => coerce(cell.as_ref()).unwrap_or_else(|| {
                        coerced += 1;
                        0.0
                    }),
                    None => 0.0,
                };
                channel.push(value);
            }
            len += 1;
        }

        Self {
            channels,
            len,
            first_row: first_row.unwrap_or_default(),
            coerced,
        }
    }

    /// Read a merged run table (`Simulation_<id>.csv`, comma-delimited).
    ///
    /// A leading `Time` column is dropped so the channel layout is the same
    /// whether or not the table was written with time retained.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let skip = usize::from(
            rdr.headers()?
                .get(0)
                .is_some_and(|h| h.trim() == TIME_COLUMN),
        );

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().skip(skip).map(str::to_string).collect::<Vec<_>>());
        }
        Ok(Self::from_rows(rows))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// Lay out a loaded run: the twelve raw channels followed by its
    /// metadata fields, exactly as the merged table stores them.
    pub fn from_run(run: &Run) -> Self {
        let mut coerced = 0;
        let mut sanitize = |v: f64| {
            if v.is_finite() {
                v
            } else {
                coerced += 1;
                0.0
            }
        };

        let mut channels: Vec<Vec<f64>> = Vec::with_capacity(ENCODER_CHANNEL_COUNT);
        let mut first_row = Vec::new();
        for series in &run.channels {
            if let Some(v) = series.first() {
                first_row.push(v.to_string());
            }
            channels.push(series.iter().map(|&v| sanitize(v)).collect());
        }
        for field in &run.metadata {
            first_row.push(field.raw.clone());
            channels.push(vec![sanitize(field.value); run.len()]);
        }

        channels.truncate(ENCODER_CHANNEL_COUNT);
        channels.resize(ENCODER_CHANNEL_COUNT, vec![0.0; run.len()]);

        Self {
            channels,
            len: run.len(),
            first_row,
            coerced,
        }
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Series of channel `index`.
    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub fn first_row(&self) -> &[String] {
        &self.first_row
    }

    /// Cells replaced by 0 during coercion.
    pub fn coerced_cells(&self) -> usize {
        self.coerced
    }
}

fn coerce(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

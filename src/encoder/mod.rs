//! Channel Normalization & Quantization Encoder
//!
//! Re-encodes a run's twenty display channels into small integers for the
//! visualization client:
//!
//! 1. per-channel extrema over the whole run
//! 2. extrema merged across the torque group and the distance group;
//!    other channels keep their own span
//! 3. `quant * ((v - min) / span - 0.5)` truncated toward zero, or 0 for a
//!    zero span
//! 4. plus a fixed vertical band offset per channel index
//!
//! With the default `quant = 100` every channel lands in `offset ± 50`, so
//! the stacked traces share one axis.

mod caption;
mod groups;
mod matrix;

pub use caption::{caption, CLEARANCE_CAPTION_FROM};
pub use groups::{band_offset, group_of, members, ChannelGroup, CHANNEL_GROUPS};
pub use matrix::ChannelMatrix;

use serde::Serialize;

use crate::config::defaults::DEFAULT_QUANT;
use crate::types::{ENCODER_CHANNEL_COUNT, ENCODER_CHANNEL_NAMES};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("run has no samples, extrema are undefined")]
    EmptyRun,
    #[error("quantization step must be positive, got {0}")]
    InvalidQuant(i64),
}

/// Minimum and maximum of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    fn of(values: &[f64]) -> Self {
        values.iter().fold(
            Extrema {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |acc, &v| Extrema {
                min: acc.min.min(v),
                max: acc.max.max(v),
            },
        )
    }

    fn merge(self, other: Extrema) -> Self {
        Extrema {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `(minimum, span)` used for rescaling.
    pub fn span(self) -> Span {
        Span {
            min: self.min,
            span: self.max - self.min,
        }
    }
}

/// Rescaling origin and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f64,
    pub span: f64,
}

/// Normalization spans for every channel of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpans {
    pub torque: Span,
    pub distance: Span,
    pub per_channel: Vec<Span>,
}

impl ChannelSpans {
    /// Compute group and individual spans from a non-empty matrix.
    pub fn compute(matrix: &ChannelMatrix) -> Result<Self, EncodeError> {
        if matrix.is_empty() {
            return Err(EncodeError::EmptyRun);
        }

        let extrema: Vec<Extrema> = matrix.channels().iter().map(|c| Extrema::of(c)).collect();
        let group_extrema = |group| {
            members(group)
                .map(|i| extrema[i])
                .reduce(Extrema::merge)
                .unwrap_or(Extrema { min: 0.0, max: 0.0 })
        };

        let torque = group_extrema(ChannelGroup::Torque).span();
        let distance = group_extrema(ChannelGroup::Distance).span();

        let per_channel = extrema
            .iter()
            .enumerate()
            .map(|(i, e)| match group_of(i) {
                ChannelGroup::Torque => torque,
                ChannelGroup::Distance => distance,
                ChannelGroup::Individual => e.span(),
            })
            .collect();

        Ok(Self {
            torque,
            distance,
            per_channel,
        })
    }
}

/// One encoded channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantizedChannel {
    pub name: &'static str,
    pub values: Vec<i64>,
}

/// All twenty encoded channels of a run, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedChannels {
    pub channels: Vec<QuantizedChannel>,
}

impl EncodedChannels {
    pub fn get(&self, name: &str) -> Option<&[i64]> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }
}

/// Quantize one value against its span, before the band offset.
///
/// The fraction is truncated toward zero, so `-16.7` becomes `-16`.
pub fn quantize(value: f64, span: Span, quant: i64) -> i64 {
    if span.span == 0.0 {
        return 0;
    }
    (quant as f64 * ((value - span.min) / span.span - 0.5)).trunc() as i64
}

/// Encode a run with an explicit quantization step.
pub fn encode_with(matrix: &ChannelMatrix, quant: i64) -> Result<EncodedChannels, EncodeError> {
    if quant <= 0 {
        return Err(EncodeError::InvalidQuant(quant));
    }
    let spans = ChannelSpans::compute(matrix)?;

    let channels = (0..ENCODER_CHANNEL_COUNT)
        .map(|i| {
            let span = spans.per_channel[i];
            let offset = band_offset(i);
            QuantizedChannel {
                name: ENCODER_CHANNEL_NAMES[i],
                values: matrix
                    .channel(i)
                    .iter()
                    .map(|&v| quantize(v, span, quant) + offset)
                    .collect(),
            }
        })
        .collect();

    Ok(EncodedChannels { channels })
}

/// Encode a run with the default quantization step.
pub fn encode(matrix: &ChannelMatrix) -> Result<EncodedChannels, EncodeError> {
    encode_with(matrix, DEFAULT_QUANT)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Matrix whose channel `c` has `values[c]` and all other channels zero.
    fn matrix(len: usize, set: &[(usize, Vec<f64>)]) -> ChannelMatrix {
        let rows = (0..len).map(|r| {
            let mut row = vec!["0".to_string(); ENCODER_CHANNEL_COUNT];
            for (c, values) in set {
                row[*c] = values[r].to_string();
            }
            row
        });
        ChannelMatrix::from_rows(rows)
    }

    #[test]
    fn quantize_concrete_scenario() {
        let span = Span { min: 10.0, span: 20.0 };
        assert_eq!(quantize(10.0, span, 100), -50);
        assert_eq!(quantize(20.0, span, 100), 0);
        assert_eq!(quantize(30.0, span, 100), 50);
    }

    #[test]
    fn quantize_truncates_toward_zero() {
        let span = Span { min: 0.0, span: 3.0 };
        // 100 * (1/3 - 0.5) = -16.67, 100 * (2/3 - 0.5) = 16.67
        assert_eq!(quantize(1.0, span, 100), -16);
        assert_eq!(quantize(2.0, span, 100), 16);
    }

    #[test]
    fn torque_channel_in_zero_band() {
        // channel 18 is torque-like with offset 0; other torque channels stay 0
        // so they widen the group extrema to include 0
        let m = matrix(3, &[(18, vec![10.0, 20.0, 30.0])]);
        let spans = ChannelSpans::compute(&m).expect("spans");
        assert_eq!(spans.torque, Span { min: 0.0, span: 30.0 });

        let enc = encode(&m).expect("encode");
        let clamp = enc.get("clampLatT").expect("clampLatT");
        assert_eq!(clamp, &[-16, 16, 50]);
    }

    #[test]
    fn group_span_uses_union_of_member_extrema() {
        let mut set: Vec<(usize, Vec<f64>)> = members(ChannelGroup::Torque)
            .map(|i| (i, vec![10.0, 20.0, 30.0]))
            .collect();
        set.push((3, vec![-5.0, 0.0, 5.0]));
        let m = matrix(3, &set);
        let spans = ChannelSpans::compute(&m).expect("spans");

        assert_eq!(spans.torque, Span { min: 10.0, span: 20.0 });
        assert_eq!(spans.distance, Span { min: -5.0, span: 10.0 });

        let enc = encode(&m).expect("encode");
        assert_eq!(enc.get("clampLatT"), Some(&[-50, 0, 50][..]));
        assert_eq!(enc.get("bendDieLatT"), Some(&[400, 450, 500][..]));
    }

    #[test]
    fn individual_channel_uses_own_span() {
        let m = matrix(2, &[(10, vec![100.0, 300.0]), (0, vec![0.0, 1e6])]);
        let enc = encode(&m).expect("encode");
        assert_eq!(enc.get("mandrelAxLoad"), Some(&[170, 270][..]));
    }

    #[test]
    fn zero_span_emits_band_offset_only() {
        let m = matrix(4, &[]);
        let enc = encode(&m).expect("encode");
        for (i, ch) in enc.channels.iter().enumerate() {
            assert!(ch.values.iter().all(|&v| v == band_offset(i)), "{}", ch.name);
        }
    }

    #[test]
    fn twenty_channels_of_run_length() {
        let m = matrix(7, &[(4, (0..7).map(f64::from).collect())]);
        let enc = encode(&m).expect("encode");
        assert_eq!(enc.channels.len(), ENCODER_CHANNEL_COUNT);
        assert!(enc.channels.iter().all(|c| c.values.len() == 7));
        let names: Vec<&str> = enc.channels.iter().map(|c| c.name).collect();
        assert_eq!(names, ENCODER_CHANNEL_NAMES);
    }

    #[test]
    fn values_stay_within_band() {
        let set: Vec<(usize, Vec<f64>)> = (0..ENCODER_CHANNEL_COUNT)
            .map(|c| (c, (0..50).map(|r| ((r * 7 + c * 13) % 37) as f64 * 1.3 - 11.0).collect()))
            .collect();
        let m = matrix(50, &set);
        let enc = encode(&m).expect("encode");
        for (i, ch) in enc.channels.iter().enumerate() {
            let offset = band_offset(i);
            for &v in &ch.values {
                assert!((offset - 51..=offset + 51).contains(&v), "{} = {v}", ch.name);
            }
        }
    }

    #[test]
    fn encode_is_idempotent() {
        let m = matrix(5, &[(2, vec![1.0, 5.0, 3.0, 2.0, 4.0]), (9, vec![0.1, 0.2, 0.3, 0.4, 0.5])]);
        assert_eq!(encode(&m), encode(&m));
    }

    #[test]
    fn spans_are_non_negative() {
        let m = matrix(3, &[(0, vec![-3.0, -9.0, -1.0]), (3, vec![4.0, 4.0, 4.0])]);
        let spans = ChannelSpans::compute(&m).expect("spans");
        assert!(spans.torque.span >= 0.0);
        assert!(spans.distance.span >= 0.0);
    }

    #[test]
    fn empty_run_is_rejected() {
        let m = ChannelMatrix::from_rows(Vec::<Vec<String>>::new());
        assert_eq!(encode(&m), Err(EncodeError::EmptyRun));
    }

    #[test]
    fn non_positive_quant_is_rejected() {
        let m = matrix(1, &[]);
        assert_eq!(encode_with(&m, 0), Err(EncodeError::InvalidQuant(0)));
    }
}

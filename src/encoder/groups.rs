//! Static channel grouping and display bands.
//!
//! Channels in the same group share one normalization span so that
//! physically comparable signals (torques, distances) keep their relative
//! amplitude on screen.

use crate::types::ENCODER_CHANNEL_COUNT;

/// Normalization group of an encoder channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    /// Torque / force-like channels sharing one span
    Torque,
    /// Distance / movement-like channels sharing one span
    Distance,
    /// Normalized on its own extrema
    Individual,
}

use ChannelGroup::{Distance as D, Individual as I, Torque as T};

/// Group of every encoder channel, by index.
pub const CHANNEL_GROUPS: [ChannelGroup; ENCODER_CHANNEL_COUNT] = [
    T, T, T, D, D, D, // bend die
    T, T, D, D, // collet
    I, D, // mandrel
    T, T, T, D, D, D, // pressure die
    T, D, // clamp
];

/// Vertical display bands as `(exclusive upper channel index, offset)`.
/// Offsets must stay in step with the quantization range.
const OFFSET_BANDS: [(usize, i64); 6] = [
    (3, 450),
    (6, 400),
    (10, 300),
    (12, 220),
    (18, 100),
    (usize::MAX, 0),
];

/// Group of channel `index`; indices outside the schema are individual.
pub fn group_of(index: usize) -> ChannelGroup {
    CHANNEL_GROUPS
        .get(index)
        .copied()
        .unwrap_or(ChannelGroup::Individual)
}

/// Indices belonging to `group`.
pub fn members(group: ChannelGroup) -> impl Iterator<Item = usize> {
    CHANNEL_GROUPS
        .iter()
        .enumerate()
        .filter(move |&(_, &g)| g == group)
        .map(|(i, _)| i)
}

/// Display offset added to every quantized value of channel `index`.
pub fn band_offset(index: usize) -> i64 {
    OFFSET_BANDS
        .iter()
        .find(|&&(end, _)| index < end)
        .map_or(0, |&(_, offset)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_membership_matches_display_layout() {
        let torque: Vec<usize> = members(ChannelGroup::Torque).collect();
        let distance: Vec<usize> = members(ChannelGroup::Distance).collect();
        let individual: Vec<usize> = members(ChannelGroup::Individual).collect();

        assert_eq!(torque, vec![0, 1, 2, 6, 7, 12, 13, 14, 18]);
        assert_eq!(distance, vec![3, 4, 5, 8, 9, 11, 15, 16, 17, 19]);
        assert_eq!(individual, vec![10]);
        assert_eq!(group_of(25), ChannelGroup::Individual);
    }

    #[test]
    fn band_offsets_per_index() {
        let offsets: Vec<i64> = (0..ENCODER_CHANNEL_COUNT).map(band_offset).collect();
        assert_eq!(
            offsets,
            vec![
                450, 450, 450, 400, 400, 400, 300, 300, 300, 300, 220, 220, 100, 100, 100, 100,
                100, 100, 0, 0
            ]
        );
    }

    #[test]
    fn bands_descend_with_channel_index() {
        for pair in OFFSET_BANDS.windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(pair[0].1 > pair[1].1);
        }
    }
}

//! Run caption shown next to the encoded channels.
//!
//! Built from fixed metadata positions of the merged run table:
//! 12 = diameter, 13 = wall thickness, 14 = mandrel, 15 = collet boost,
//! 16 = clearance. Runs from 89 onward were varied on clearance instead of
//! mandrel, so the caption switches attributes at that id.

const DIAMETER: usize = 12;
const WALL: usize = 13;
const MANDREL: usize = 14;
const COLLET_BOOST: usize = 15;
const CLEARANCE: usize = 16;

/// First run id captioned with clearance instead of mandrel.
pub const CLEARANCE_CAPTION_FROM: u32 = 89;

/// Build the caption for `run_id` from the raw cells of its first data row.
///
/// Missing cells render as empty text.
pub fn caption(run_id: u32, first_row: &[String]) -> String {
    let cell = |i: usize| first_row.get(i).map_or("", String::as_str);

    let attr1 = if run_id < CLEARANCE_CAPTION_FROM {
        format!("Mandrel: {}", cell(MANDREL))
    } else {
        format!("Clearance: {} mm", cell(CLEARANCE))
    };
    let attr2 = format!("Collet Boost: {}", cell(COLLET_BOOST));

    format!(
        "Process ID: {run_id}<br/>D: {}mm | W: {}mm<br/>{attr1}<br/>{attr2}",
        cell(DIAMETER),
        cell(WALL)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Vec<String> {
        let mut row: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        row.extend(["40", "2.5", "1", "0.8", "0.15"].map(String::from));
        row
    }

    #[test]
    fn run_88_captions_mandrel() {
        assert_eq!(
            caption(88, &row()),
            "Process ID: 88<br/>D: 40mm | W: 2.5mm<br/>Mandrel: 1<br/>Collet Boost: 0.8"
        );
    }

    #[test]
    fn run_89_captions_clearance() {
        assert_eq!(
            caption(89, &row()),
            "Process ID: 89<br/>D: 40mm | W: 2.5mm<br/>Clearance: 0.15 mm<br/>Collet Boost: 0.8"
        );
    }

    #[test]
    fn missing_cells_render_empty() {
        assert_eq!(
            caption(1, &[]),
            "Process ID: 1<br/>D: mm | W: mm<br/>Mandrel: <br/>Collet Boost: "
        );
    }
}

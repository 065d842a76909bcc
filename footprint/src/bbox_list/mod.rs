//! Decomposing a footprint into rectangles.


use std::io::{self, Write};

use hashbrown::HashMap;

use crate::footprint::Footprint;
use crate::math::Box2I;
use crate::span::normalize_spans;

/// Disjoint boxes whose union is exactly the footprint's pixels.
///
/// Runs with the same column extent on consecutive rows share one box.
/// Boxes are ordered by their bottom row, then left column.
pub fn footprint_to_bbox_list(footprint: &Footprint) -> Vec<Box2I> {
    let mut spans = footprint.spans().to_vec();
    if !footprint.is_normalized() {
        normalize_spans(&mut spans);
    }

    let mut boxes: Vec<Box2I> = Vec::new();
    // (x0, x1) -> index of the box that reached the previous row.
    let mut open: HashMap<(i32, i32), usize> = HashMap::new();
    let mut next_open = HashMap::new();
    let mut row = None;

    for span in &spans {
        if row != Some(span.y()) {
            open = std::mem::take(&mut next_open);
            open.retain(|_, &mut idx| boxes[idx].y_max == span.y() - 1);
            row = Some(span.y());
        }

        let key = (span.x0(), span.x1());
        let idx = match open.get(&key) {
            Some(&idx) => {
                boxes[idx].y_max = span.y();
                idx
            }
            None => {
                boxes.push(Box2I::new(span.x0(), span.x1(), span.y(), span.y()));
                boxes.len() - 1
            }
        };
        next_open.insert(key, idx);
    }

    boxes.sort_by_key(|b| (b.y_min, b.x_min));
    boxes
}

/// Write the box decomposition of `footprint` as a list of `Defects` blocks.
pub fn write_footprint_as_defects<W: Write>(
    writer: &mut W,
    footprint: &Footprint,
) -> io::Result<()> {
    for bbox in footprint_to_bbox_list(footprint) {
        let fields = [
            ("x0:    ", bbox.x_min, "Starting column"),
            ("width: ", bbox.width() as i32, "number of columns"),
            ("y0:    ", bbox.y_min, "Starting row"),
            ("height:", bbox.height() as i32, "number of rows"),
        ];
        writeln!(writer, "Defects: {{")?;
        for (label, value, note) in fields {
            writeln!(writer, "    {label} {value:4}                         # {note}")?;
        }
        writeln!(writer, "}}")?;
    }
    Ok(())
}

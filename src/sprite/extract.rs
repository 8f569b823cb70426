use crate::error::AssetError;

use super::{CellRect, Frame, FrameSequence, SpriteSheet};

/// Slice a sheet into `columns * rows` frames, row-major.
///
/// Frame `k` is the cell at column `k % columns`, row `k / columns`. No pixels
/// are copied; each frame references the sheet's image.
pub fn extract(
    sheet: &SpriteSheet,
    cell_width: u32,
    cell_height: u32,
    columns: u32,
    rows: u32,
) -> Result<FrameSequence, AssetError> {
    if cell_width == 0 || cell_height == 0 || columns == 0 || rows == 0 {
        return Err(AssetError::EmptyGrid {
            path: sheet.path().to_path_buf(),
            cell_width,
            cell_height,
            columns,
            rows,
        });
    }

    // u64 so a silly config can't overflow the bounds check
    let needed_w = u64::from(columns) * u64::from(cell_width);
    let needed_h = u64::from(rows) * u64::from(cell_height);
    if u64::from(sheet.width()) < needed_w || u64::from(sheet.height()) < needed_h {
        return Err(AssetError::Undersized {
            path: sheet.path().to_path_buf(),
            actual_width: sheet.width(),
            actual_height: sheet.height(),
            cell_width,
            cell_height,
            columns,
            rows,
        });
    }

    let mut frames = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for col in 0..columns {
            frames.push(Frame::new(
                sheet.image().clone(),
                CellRect {
                    x: col * cell_width,
                    y: row * cell_height,
                    width: cell_width,
                    height: cell_height,
                },
            ));
        }
    }

    log::debug!(
        "Extracted {} frames ({}x{} cells of {}x{}) from {}",
        frames.len(),
        columns,
        rows,
        cell_width,
        cell_height,
        sheet.path().display()
    );

    // Non-empty: the grid check above guarantees at least one cell.
    FrameSequence::new(frames).ok_or_else(|| AssetError::EmptyGrid {
        path: sheet.path().to_path_buf(),
        cell_width,
        cell_height,
        columns,
        rows,
    })
}

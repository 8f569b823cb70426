//! Sprite sheets and the frames sliced out of them.
//!
//! A [`Frame`] is a rectangle into a shared sheet, never a copy of its pixels.
//! The renderer turns that rectangle into UV coordinates on the sheet's texture.

pub mod extract;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

pub use self::extract::extract;

/// Index of a decoded image in the asset store. Also the GPU texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

/// Shared handle to a decoded, read-only RGBA image.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    id: ImageId,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(id: ImageId, pixels: Arc<RgbaImage>) -> Self {
        Self { id, pixels }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// An image treated as a uniform grid of animation cells.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    image: ImageHandle,
    path: PathBuf,
}

impl SpriteSheet {
    pub fn new(image: ImageHandle, path: impl Into<PathBuf>) -> Self {
        Self {
            image,
            path: path.into(),
        }
    }

    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// Where the sheet was loaded from (used in diagnostics).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.image.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.image.pixels.height()
    }
}

/// Pixel rectangle inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One still image of an animation: a view into a sheet.
#[derive(Debug, Clone)]
pub struct Frame {
    image: ImageHandle,
    rect: CellRect,
}

impl Frame {
    pub fn new(image: ImageHandle, rect: CellRect) -> Self {
        Self { image, rect }
    }

    pub fn image_id(&self) -> ImageId {
        self.image.id
    }

    #[cfg(test)]
    pub fn rect(&self) -> CellRect {
        self.rect
    }

    /// Borrowed pixel view of this cell.
    #[cfg(test)]
    pub fn view(&self) -> image::SubImage<&RgbaImage> {
        use image::GenericImageView;
        let r = self.rect;
        self.image.pixels().view(r.x, r.y, r.width, r.height)
    }

    /// Normalized texture coordinates `(min, max)` of this cell on its sheet.
    pub fn uv(&self) -> ([f32; 2], [f32; 2]) {
        let (w, h) = self.image.dimensions();
        let (w, h) = (w as f32, h as f32);
        let r = self.rect;
        (
            [r.x as f32 / w, r.y as f32 / h],
            [(r.x + r.width) as f32 / w, (r.y + r.height) as f32 / h],
        )
    }
}

/// Ordered, non-empty, cheaply clonable list of frames.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Arc<[Frame]>,
}

impl FrameSequence {
    /// Returns `None` for an empty list; every sequence has at least one frame.
    pub fn new(frames: Vec<Frame>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            frames: frames.into(),
        })
    }

    /// One-frame sequence (e.g. a still pose aliased from another strip).
    pub fn single(frame: Frame) -> Self {
        Self {
            frames: Arc::from(vec![frame]),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

impl std::ops::Index<usize> for FrameSequence {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.frames[index]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    /// Sheet whose every cell is filled with a color encoding its (col, row).
    pub(crate) fn grid_sheet(cell: u32, columns: u32, rows: u32) -> SpriteSheet {
        let img = RgbaImage::from_fn(cell * columns, cell * rows, |x, y| {
            Rgba([(x / cell) as u8, (y / cell) as u8, 0, 255])
        });
        SpriteSheet::new(ImageHandle::new(ImageId(0), Arc::new(img)), "test.png")
    }

    #[test]
    fn frame_uv_covers_its_cell() {
        let sheet = grid_sheet(30, 3, 2);
        let frame = Frame::new(
            sheet.image().clone(),
            CellRect {
                x: 30,
                y: 30,
                width: 30,
                height: 30,
            },
        );
        let (min, max) = frame.uv();
        assert_eq!(min, [1.0 / 3.0, 0.5]);
        assert_eq!(max, [2.0 / 3.0, 1.0]);
    }

    #[test]
    fn frame_view_borrows_cell_pixels() {
        let sheet = grid_sheet(4, 2, 2);
        let frame = Frame::new(
            sheet.image().clone(),
            CellRect {
                x: 4,
                y: 4,
                width: 4,
                height: 4,
            },
        );
        let view = frame.view();
        assert_eq!(view.dimensions(), (4, 4));
        assert_eq!(view.get_pixel(0, 0), Rgba([1, 1, 0, 255]));
        assert_eq!(view.get_pixel(3, 3), Rgba([1, 1, 0, 255]));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(FrameSequence::new(Vec::new()).is_none());
    }
}

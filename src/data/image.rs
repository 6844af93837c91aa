use image::{ImageBuffer, Luma};

use crate::error::{DataError, DataResult};
use crate::event::{EventBus, ImageChange};

/// A single 16-bit grayscale slice
pub type Frame = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Contract the data store needs from an image.
///
/// Pixel representation is up to the implementor; the store only appends
/// slices and listens to the image's change bus.
pub trait SliceImage {
    /// Number of slices/frames currently held
    fn slice_count(&self) -> usize;

    /// Grow the image with the slices of `other`.
    /// Implementations emit [`ImageChange::SliceAppended`] for every appended slice.
    fn append_slice(&mut self, other: Self) -> DataResult<()>
    where
        Self: Sized;

    /// Bus on which the image publishes its own changes
    fn change_bus(&self) -> &EventBus<ImageChange>;
}

/// Multi-frame image backed by an ordered list of equally sized frames
pub struct FrameStack {
    frames: Vec<Frame>,
    changes: EventBus<ImageChange>,
}

impl std::fmt::Debug for FrameStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStack")
            .field("frames", &self.frames.len())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

impl FrameStack {
    pub fn new(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
            changes: EventBus::new(),
        }
    }

    /// Creates a blank stack of `slices` frames filled with `value`
    pub fn filled(width: u32, height: u32, slices: usize, value: u16) -> Self {
        let frames = (0..slices.max(1))
            .map(|_| ImageBuffer::from_pixel(width, height, Luma([value])))
            .collect();
        Self {
            frames,
            changes: EventBus::new(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].dimensions()
    }

    pub fn frame(&self, slice_index: usize) -> Option<&Frame> {
        self.frames.get(slice_index)
    }

    pub fn pixel(&self, slice_index: usize, x: u32, y: u32) -> Option<u16> {
        let frame = self.frames.get(slice_index)?;
        if x >= frame.width() || y >= frame.height() {
            return None;
        }
        Some(frame.get_pixel(x, y).0[0])
    }

    /// Write a single pixel. Returns false when the position is out of range.
    pub fn set_pixel(&mut self, slice_index: usize, x: u32, y: u32, value: u16) -> bool {
        let Some(frame) = self.frames.get_mut(slice_index) else {
            return false;
        };
        if x >= frame.width() || y >= frame.height() {
            return false;
        }
        frame.put_pixel(x, y, Luma([value]));
        self.changes.emit(ImageChange::ContentChanged { slice_index });
        true
    }
}

impl SliceImage for FrameStack {
    fn slice_count(&self) -> usize {
        self.frames.len()
    }

    fn append_slice(&mut self, other: Self) -> DataResult<()> {
        let expected = self.dimensions();
        let actual = other.dimensions();
        if expected != actual {
            return Err(DataError::SliceMismatch { expected, actual });
        }
        for frame in other.frames {
            self.frames.push(frame);
            self.changes.emit(ImageChange::SliceAppended {
                slice_index: self.frames.len() - 1,
            });
        }
        Ok(())
    }

    fn change_bus(&self) -> &EventBus<ImageChange> {
        &self.changes
    }
}

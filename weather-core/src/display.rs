use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::render::Frame;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Frame is {actual_width}x{actual_height}, display is {expected_width}x{expected_height}")]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Display output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A fixed-size RGB matrix the station presents frames on.
///
/// `set_image` stages a frame, `update_display` pushes whatever is staged
/// to the panel (and to any preview consumer). Calling `update_display`
/// without a new image re-presents the previous frame.
pub trait MatrixDisplay {
    fn size(&self) -> Size;

    fn clear(&mut self);

    fn set_image(&mut self, frame: Frame) -> Result<(), DisplayError>;

    fn update_display(&mut self) -> Result<(), DisplayError>;
}

/// Reject frames that do not match the panel.
pub fn check_frame_size(display_size: Size, frame: &Frame) -> Result<(), DisplayError> {
    if frame.width() != display_size.width || frame.height() != display_size.height {
        return Err(DisplayError::SizeMismatch {
            expected_width: display_size.width,
            expected_height: display_size.height,
            actual_width: frame.width(),
            actual_height: frame.height(),
        });
    }
    Ok(())
}

/// In-memory display for previews and tests.
///
/// The state is shared so a caller can keep a [`MemoryDisplay::handle`]
/// after handing the display itself to a station.
#[derive(Debug, Clone)]
pub struct MemoryDisplay {
    size: Size,
    state: Arc<Mutex<MemoryDisplayState>>,
}

#[derive(Debug, Clone)]
pub struct MemoryDisplayState {
    /// Staged image.
    pub image: Frame,
    /// Last image pushed by `update_display`.
    pub presented: Option<Frame>,
    pub clear_count: usize,
    pub set_image_count: usize,
    pub update_count: usize,
}

impl MemoryDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            state: Arc::new(Mutex::new(MemoryDisplayState {
                image: Frame::new(width, height),
                presented: None,
                clear_count: 0,
                set_image_count: 0,
                update_count: 0,
            })),
        }
    }

    pub fn handle(&self) -> Arc<Mutex<MemoryDisplayState>> {
        Arc::clone(&self.state)
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> MemoryDisplayState {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, MemoryDisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MatrixDisplay for MemoryDisplay {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        let mut state = self.state();
        state.image.fill(Rgb888::BLACK);
        state.clear_count += 1;
    }

    fn set_image(&mut self, frame: Frame) -> Result<(), DisplayError> {
        check_frame_size(self.size, &frame)?;
        let mut state = self.state();
        state.image = frame;
        state.set_image_count += 1;
        Ok(())
    }

    fn update_display(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state();
        state.presented = Some(state.image.clone());
        state.update_count += 1;
        Ok(())
    }
}

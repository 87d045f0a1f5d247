//! Terminal preview of the matrix using ANSI truecolor half blocks.
//!
//! Each character cell shows two pixel rows: the upper half block takes the
//! top pixel as foreground and the bottom pixel as background.

use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use std::fmt::Write as _;
use std::io::{self, Write};

use weather_matrix_core::display::{DisplayError, MatrixDisplay, check_frame_size};
use weather_matrix_core::render::Frame;

const UPPER_HALF: char = '\u{2580}';

pub struct TerminalDisplay<W: Write> {
    size: Size,
    staged: Frame,
    out: W,
    /// Redraw in place instead of scrolling.
    in_place: bool,
    presented: usize,
}

impl TerminalDisplay<io::Stdout> {
    pub fn stdout(width: u32, height: u32, in_place: bool) -> Self {
        Self::new(io::stdout(), width, height, in_place)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, width: u32, height: u32, in_place: bool) -> Self {
        Self {
            size: Size::new(width, height),
            staged: Frame::new(width, height),
            out,
            in_place,
            presented: 0,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// ANSI text for `frame`, one line per two pixel rows.
pub fn render_ansi(frame: &Frame) -> String {
    let mut out = String::new();
    for y in (0..frame.height()).step_by(2) {
        for x in 0..frame.width() {
            let top = frame.pixel(x, y).unwrap_or(Rgb888::BLACK);
            let bottom = frame.pixel(x, y + 1).unwrap_or(Rgb888::BLACK);
            let _ = write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{UPPER_HALF}",
                top.r(),
                top.g(),
                top.b(),
                bottom.r(),
                bottom.g(),
                bottom.b()
            );
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

impl<W: Write> MatrixDisplay for TerminalDisplay<W> {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.staged.fill(Rgb888::BLACK);
    }

    fn set_image(&mut self, frame: Frame) -> Result<(), DisplayError> {
        check_frame_size(self.size, &frame)?;
        self.staged = frame;
        Ok(())
    }

    fn update_display(&mut self) -> Result<(), DisplayError> {
        let mut text = String::new();
        if self.in_place && self.presented > 0 {
            // cursor back up over the previous frame
            let rows = self.size.height.div_ceil(2);
            let _ = write!(text, "\x1b[{rows}A");
        }
        text.push_str(&render_ansi(&self.staged));

        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_pixel_rows_per_line() {
        let mut frame = Frame::new(2, 3);
        frame.fill(Rgb888::new(10, 20, 30));

        let text = render_ansi(&frame);
        assert_eq!(text.lines().count(), 2);
        assert_eq!(text.matches(UPPER_HALF).count(), 4);
        assert!(text.contains("\x1b[38;2;10;20;30m"));
        // odd height pads the last row with black
        assert!(text.contains("\x1b[48;2;0;0;0m"));
    }

    #[test]
    fn in_place_redraw_moves_cursor_up() {
        let mut display = TerminalDisplay::new(Vec::new(), 4, 4, true);
        display.update_display().unwrap();
        display.update_display().unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out.matches("\x1b[2A").count(), 1);
    }

    #[test]
    fn rejects_frames_of_the_wrong_size() {
        let mut display = TerminalDisplay::new(Vec::new(), 4, 4, false);
        assert!(display.set_image(Frame::new(8, 4)).is_err());
    }
}

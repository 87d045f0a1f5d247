use core::convert::Infallible;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;

/// A runtime-sized RGB framebuffer for embedded-graphics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    buf: Vec<Rgb888>,
    w: usize,
    h: usize,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            buf: vec![Rgb888::BLACK; w * h],
            w,
            h,
        }
    }

    pub fn width(&self) -> u32 {
        self.w as u32
    }

    pub fn height(&self) -> u32 {
        self.h as u32
    }

    pub fn pixels(&self) -> &[Rgb888] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        self.offset(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    pub fn fill(&mut self, color: Rgb888) {
        self.buf.fill(color);
    }

    /// Pixels that are not black.
    pub fn lit_pixels(&self) -> usize {
        self.buf.iter().filter(|c| **c != Rgb888::BLACK).count()
    }

    /// Row-major `R, G, B` bytes, `width * height * 3` long.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.buf.iter().flat_map(|c| [c.r(), c.g(), c.b()]).collect()
    }

    /// Row-major buffer offset of `p`, `None` outside the frame.
    fn offset(&self, p: Point) -> Option<usize> {
        let x = usize::try_from(p.x).ok().filter(|x| *x < self.w)?;
        let y = usize::try_from(p.y).ok().filter(|y| *y < self.h)?;
        Some(y * self.w + x)
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.offset(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

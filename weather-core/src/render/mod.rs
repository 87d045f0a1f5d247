//! Pixel rendering of the weather screens onto an RGB [`Frame`].

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, iso_8859_1};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

pub mod frame;
pub mod icons;
pub mod screens;

pub use frame::Frame;

/// Labels, temperatures and the no-data message.
pub const SMALL_FONT: &MonoFont<'static> = &iso_8859_1::FONT_5X8;
/// Bottom metric row and daily low/high.
pub const EXTRA_SMALL_FONT: &MonoFont<'static> = &iso_8859_1::FONT_4X6;

pub mod palette {
    use embedded_graphics::pixelcolor::Rgb888;

    pub const TEXT: Rgb888 = Rgb888::new(255, 255, 255);
    pub const HIGHLIGHT: Rgb888 = Rgb888::new(255, 200, 0);
    pub const DIM: Rgb888 = Rgb888::new(180, 180, 180);
    pub const NO_DATA: Rgb888 = Rgb888::new(200, 200, 200);

    pub const UV_LOW: Rgb888 = Rgb888::new(0, 150, 0);
    pub const UV_MODERATE: Rgb888 = Rgb888::new(255, 200, 0);
    pub const UV_HIGH: Rgb888 = Rgb888::new(255, 120, 0);
    pub const UV_VERY_HIGH: Rgb888 = Rgb888::new(200, 0, 0);
    pub const UV_EXTREME: Rgb888 = Rgb888::new(150, 0, 200);

    // icon colours
    pub const SUN: Rgb888 = Rgb888::new(255, 200, 0);
    pub const MOON: Rgb888 = Rgb888::new(220, 220, 160);
    pub const CLOUD: Rgb888 = Rgb888::new(200, 200, 200);
    pub const STORM_CLOUD: Rgb888 = Rgb888::new(100, 100, 100);
    pub const RAIN: Rgb888 = Rgb888::new(0, 150, 255);
    pub const SNOW: Rgb888 = Rgb888::new(200, 200, 255);
    pub const LIGHTNING: Rgb888 = Rgb888::new(255, 255, 0);
}

/// Colour band for a UV index value.
pub fn uv_color(uvi: f64) -> Rgb888 {
    if uvi <= 2.0 {
        palette::UV_LOW
    } else if uvi <= 5.0 {
        palette::UV_MODERATE
    } else if uvi <= 7.0 {
        palette::UV_HIGH
    } else if uvi <= 10.0 {
        palette::UV_VERY_HIGH
    } else {
        palette::UV_EXTREME
    }
}

/// 8-point compass direction for a wind bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = (degrees / 45.0).round_ties_even() as i64;
    DIRECTIONS[index.rem_euclid(8) as usize]
}

/// Rendered width of `text` in pixels.
pub fn text_width(text: &str, font: &MonoFont<'_>) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * font.character_size.width + (chars - 1) * font.character_spacing
}

/// Draw `text` with its top-left corner at (x, y).
pub fn draw_text<D>(target: &mut D, text: &str, x: i32, y: i32, font: &MonoFont<'_>, color: Rgb888)
where
    D: DrawTarget<Color = Rgb888>,
{
    Text::with_baseline(text, Point::new(x, y), MonoTextStyle::new(font, color), Baseline::Top)
        .draw(target)
        .ok();
}

/// Draw `text` horizontally centred on `center_x`.
pub fn draw_text_centered<D>(
    target: &mut D,
    text: &str,
    center_x: i32,
    y: i32,
    font: &MonoFont<'_>,
    color: Rgb888,
) where
    D: DrawTarget<Color = Rgb888>,
{
    let x = center_x - text_width(text, font) as i32 / 2;
    draw_text(target, text, x, y, font, color);
}

/// Draw `text` so it ends one pixel before the right edge.
pub fn draw_text_right<D>(target: &mut D, text: &str, y: i32, font: &MonoFont<'_>, color: Rgb888)
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    let x = target.size().width as i32 - text_width(text, font) as i32 - 1;
    draw_text(target, text, x, y, font, color);
}

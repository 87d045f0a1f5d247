//! Weather icons drawn from primitives, keyed by OpenWeather icon codes.
//!
//! See <https://openweathermap.org/weather-conditions#Icon-list>.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, Polyline, PrimitiveStyle, Rectangle};
use log::debug;

use super::palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Overcast,
    Drizzle,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Wind,
    NotAvailable,
}

impl IconKind {
    pub fn from_code(code: &str) -> Self {
        let kind = match code {
            "01d" => IconKind::ClearDay,
            "01n" => IconKind::ClearNight,
            "02d" => IconKind::PartlyCloudyDay,
            "02n" => IconKind::PartlyCloudyNight,
            "03d" | "03n" => IconKind::Cloudy,
            "04d" | "04n" => IconKind::Overcast,
            "09d" | "09n" => IconKind::Drizzle,
            "10d" | "10n" => IconKind::Rain,
            "11d" | "11n" => IconKind::Thunderstorm,
            "13d" | "13n" => IconKind::Snow,
            "50d" | "50n" => IconKind::Mist,
            "tornado" | "hurricane" | "wind" => IconKind::Wind,
            _ => IconKind::NotAvailable,
        };
        debug!("Mapping icon code '{code}' to {kind:?}");
        kind
    }
}

/// Draw the icon for `code` inside the `size` x `size` square at `top_left`.
pub fn draw_weather_icon<D>(target: &mut D, code: &str, top_left: Point, size: u32)
where
    D: DrawTarget<Color = Rgb888>,
{
    draw_icon(target, IconKind::from_code(code), top_left, size);
}

pub fn draw_icon<D>(target: &mut D, kind: IconKind, top_left: Point, size: u32)
where
    D: DrawTarget<Color = Rgb888>,
{
    let s = size as i32;
    let Point { x, y } = top_left;

    match kind {
        IconKind::ClearDay => draw_sun(target, x, y, s),
        IconKind::ClearNight => draw_moon(target, x, y, s),
        IconKind::PartlyCloudyDay => {
            draw_sun(target, x - s / 6, y - s / 6, s * 5 / 6);
            draw_cloud(target, x, y + s / 8, s, palette::CLOUD);
        }
        IconKind::PartlyCloudyNight => {
            draw_moon(target, x - s / 6, y - s / 6, s * 5 / 6);
            draw_cloud(target, x, y + s / 8, s, palette::CLOUD);
        }
        IconKind::Cloudy => draw_cloud(target, x, y, s, palette::CLOUD),
        IconKind::Overcast => {
            draw_cloud(target, x - s / 8, y - s / 8, s, palette::STORM_CLOUD);
            draw_cloud(target, x + s / 8, y + s / 12, s, palette::CLOUD);
        }
        IconKind::Drizzle => draw_rain(target, x, y, s, s / 6),
        IconKind::Rain => draw_rain(target, x, y, s, s / 4),
        IconKind::Thunderstorm => draw_thunderstorm(target, x, y, s),
        IconKind::Snow => draw_snow(target, x, y, s),
        IconKind::Mist => draw_mist(target, x, y, s),
        IconKind::Wind => draw_wind(target, x, y, s),
        IconKind::NotAvailable => {
            Rectangle::new(Point::new(x, y), Size::new_equal(size))
                .into_styled(stroke(palette::DIM, 1))
                .draw(target)
                .ok();
        }
    }
}

fn stroke(color: Rgb888, width: u32) -> PrimitiveStyle<Rgb888> {
    PrimitiveStyle::with_stroke(color, width)
}

fn line<D>(target: &mut D, from: (i32, i32), to: (i32, i32), style: PrimitiveStyle<Rgb888>)
where
    D: DrawTarget<Color = Rgb888>,
{
    Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
        .into_styled(style)
        .draw(target)
        .ok();
}

fn disc<D>(target: &mut D, center: (i32, i32), radius: i32, color: Rgb888)
where
    D: DrawTarget<Color = Rgb888>,
{
    if radius <= 0 {
        return;
    }
    Circle::with_center(Point::new(center.0, center.1), (radius * 2) as u32)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
        .ok();
}

fn draw_sun<D>(target: &mut D, x: i32, y: i32, s: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    let (cx, cy) = (x + s / 2, y + s / 2);
    let radius = (s / 5).max(1);
    disc(target, (cx, cy), radius, palette::SUN);

    let inner = (radius + 1) as f32;
    let outer = (radius + 1 + s / 5) as f32;
    let width = if s >= 20 { 2 } else { 1 };
    for step in 0..8 {
        let rad = (step as f32 * 45.0).to_radians();
        let (cos, sin) = (rad.cos(), rad.sin());
        line(
            target,
            (cx + (inner * cos) as i32, cy + (inner * sin) as i32),
            (cx + (outer * cos) as i32, cy + (outer * sin) as i32),
            stroke(palette::SUN, width),
        );
    }
}

fn draw_moon<D>(target: &mut D, x: i32, y: i32, s: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    let (cx, cy) = (x + s / 2, y + s / 2);
    let radius = (s / 3).max(1);
    disc(target, (cx, cy), radius, palette::MOON);
    // bite out a crescent
    disc(target, (cx + radius / 2, cy - radius / 3), radius * 3 / 4, Rgb888::BLACK);
}

fn draw_cloud<D>(target: &mut D, x: i32, y: i32, s: i32, color: Rgb888)
where
    D: DrawTarget<Color = Rgb888>,
{
    let diameter = (s / 2).max(1) as u32;
    for (px, py) in [(x + s / 4, y + s / 3), (x + s / 2, y + s / 3), (x + s / 3, y + s / 6)] {
        Circle::new(Point::new(px, py), diameter)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(target)
            .ok();
    }
}

fn draw_rain<D>(target: &mut D, x: i32, y: i32, s: i32, drop_length: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    draw_cloud(target, x, y - s / 8, s, palette::CLOUD);

    let spacing = s / 4;
    let top = y + s * 2 / 3;
    for i in 0..3 {
        let dx = x + s / 4 + i * spacing + s / 8;
        line(target, (dx, top), (dx - 2, top + drop_length), stroke(palette::RAIN, 1));
    }
}

fn draw_snow<D>(target: &mut D, x: i32, y: i32, s: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    draw_cloud(target, x, y - s / 8, s, palette::CLOUD);

    let flake = (s / 8).max(1) as f32;
    let spacing = s / 4;
    let cy = y + s * 5 / 6;
    for i in 0..3 {
        let cx = x + s / 4 + i * spacing + s / 8;
        for step in 0..6 {
            let rad = (step as f32 * 60.0).to_radians();
            line(
                target,
                (cx, cy),
                (cx + (flake * rad.cos()) as i32, cy + (flake * rad.sin()) as i32),
                stroke(palette::SNOW, 1),
            );
        }
    }
}

fn draw_thunderstorm<D>(target: &mut D, x: i32, y: i32, s: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    draw_cloud(target, x, y - s / 8, s, palette::STORM_CLOUD);

    let mid = x + s / 2;
    let points = [
        Point::new(mid + s / 12, y + s / 2),
        Point::new(mid - s / 6, y + s * 3 / 4),
        Point::new(mid, y + s * 3 / 4),
        Point::new(mid - s / 6, y + s - 1),
    ];
    Polyline::new(&points)
        .into_styled(stroke(palette::LIGHTNING, 2))
        .draw(target)
        .ok();
}

fn draw_mist<D>(target: &mut D, x: i32, y: i32, s: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    let spacing = (s / 5).max(2);
    for i in 0..3 {
        let wy = y + s / 3 + i * spacing;
        let indent = if i % 2 == 0 { s / 6 } else { s / 4 };
        line(target, (x + indent, wy), (x + s - indent, wy), stroke(palette::CLOUD, 2));
    }
}

fn draw_wind<D>(target: &mut D, x: i32, y: i32, s: i32)
where
    D: DrawTarget<Color = Rgb888>,
{
    let spacing = (s / 5).max(2);
    for (i, len) in [s * 3 / 4, s - s / 6, s / 2].into_iter().enumerate() {
        let wy = y + s / 3 + i as i32 * spacing;
        line(target, (x + s / 8, wy), (x + s / 8 + len - 1, wy), stroke(palette::DIM, 1));
    }
}

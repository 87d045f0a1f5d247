//! The three weather screens and the no-data placeholder.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use super::{
    EXTRA_SMALL_FONT, SMALL_FONT, draw_text, draw_text_centered, draw_text_right,
    icons::draw_weather_icon, palette, text_width, uv_color, wind_direction,
};
use crate::{
    cycler::DisplayMode,
    model::{DailyEntry, HourlyEntry, WeatherReport, WeatherSnapshot},
};

const ICON_EXTRA_LARGE: u32 = 40;
const ICON_LARGE: u32 = 30;

const HOURS_SHOWN: usize = 4;
const DAYS_SHOWN: usize = 3;

/// Draw the screen for `mode`. Missing forecast data falls back to the
/// no-data placeholder.
pub fn render_mode<D>(target: &mut D, mode: DisplayMode, report: &WeatherReport)
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    match mode {
        DisplayMode::Current => render_current(target, &report.current),
        DisplayMode::Hourly if !report.hourly.is_empty() => render_hourly(target, &report.hourly),
        DisplayMode::Daily => render_daily(target, &report.daily),
        DisplayMode::Hourly => render_no_data(target),
    }
}

pub fn render_no_data<D>(target: &mut D)
where
    D: DrawTarget<Color = Rgb888>,
{
    target.clear(Rgb888::BLACK).ok();
    draw_text(target, "No Weather", 5, 12, SMALL_FONT, palette::NO_DATA);
    draw_text(target, "Data", 5, 20, SMALL_FONT, palette::NO_DATA);
}

/// Icon top-left, condition and temperatures right-aligned, and a bottom
/// row with UV index, humidity and wind.
pub fn render_current<D>(target: &mut D, weather: &WeatherSnapshot)
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    target.clear(Rgb888::BLACK).ok();
    let Size { width, height } = target.size();
    let (width, height) = (width as i32, height as i32);

    // icon centred vertically in the top two thirds
    let icon_size = ICON_EXTRA_LARGE as i32;
    let available_height = height * 2 / 3;
    let icon_y = (available_height - icon_size) / 2;
    draw_weather_icon(target, &weather.icon, Point::new(1, icon_y), ICON_EXTRA_LARGE);

    let condition_y = 1;
    draw_text_right(target, &weather.condition, condition_y, SMALL_FONT, palette::TEXT);

    let temp_y = condition_y + 8;
    let temp_text = format!("{}°", weather.temp.round() as i64);
    draw_text_right(target, &temp_text, temp_y, SMALL_FONT, palette::HIGHLIGHT);

    let high_low_y = temp_y + 8;
    let high_low_text = format!(
        "{}°/{}°",
        weather.temp_min.round() as i64,
        weather.temp_max.round() as i64
    );
    draw_text_right(target, &high_low_text, high_low_y, SMALL_FONT, palette::DIM);

    let section_width = width / 3;
    let y = height - 7;
    let font = EXTRA_SMALL_FONT;

    // UV: dim prefix, value coloured by band
    let uv_prefix = "UV:";
    let uv_value = format!("{:.0}", weather.uvi);
    let prefix_width = text_width(uv_prefix, font) as i32;
    let total_width = prefix_width + text_width(&uv_value, font) as i32;
    let start_x = (section_width - total_width) / 2;
    draw_text(target, uv_prefix, start_x, y, font, palette::DIM);
    draw_text(target, &uv_value, start_x + prefix_width, y, font, uv_color(weather.uvi));

    let humidity_text = format!("H:{}%", weather.humidity);
    let humidity_x = section_width + section_width / 2;
    draw_text_centered(target, &humidity_text, humidity_x, y, font, palette::DIM);

    let wind_text = format!("W:{:.0}{}", weather.wind_speed, wind_direction(weather.wind_deg));
    let wind_x = 2 * section_width + section_width / 2;
    draw_text_centered(target, &wind_text, wind_x, y, font, palette::DIM);
}

/// Up to four columns: hour, icon, temperature.
pub fn render_hourly<D>(target: &mut D, hourly: &[HourlyEntry])
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    target.clear(Rgb888::BLACK).ok();
    let shown = hourly.len().min(HOURS_SHOWN);
    if shown == 0 {
        render_no_data(target);
        return;
    }

    let Size { width, height } = target.size();
    let section_width = width / shown as u32;
    let icon_size = ICON_LARGE.min(section_width).min(height);
    let bottom_y = height as i32 - 8;

    for (i, forecast) in hourly.iter().take(shown).enumerate() {
        let center_x = (i as u32 * section_width + section_width / 2) as i32;

        let icon_y = height as i32 / 2 - icon_size as i32 / 2;
        let icon_x = center_x - icon_size as i32 / 2;
        draw_weather_icon(target, &forecast.icon, Point::new(icon_x, icon_y), icon_size);

        draw_text_centered(target, &forecast.short_label(), center_x, 1, SMALL_FONT, palette::TEXT);

        let temp_text = format!("{}°", forecast.temp);
        draw_text_centered(target, &temp_text, center_x, bottom_y, SMALL_FONT, palette::TEXT);
    }
}

/// Up to three columns: weekday, icon, low / high.
pub fn render_daily<D>(target: &mut D, daily: &[DailyEntry])
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    target.clear(Rgb888::BLACK).ok();
    let shown = daily.len().min(DAYS_SHOWN);
    if shown == 0 {
        draw_text(target, "No daily forecast", 2, 2, SMALL_FONT, palette::DIM);
        return;
    }

    let Size { width, height } = target.size();
    let section_width = width / shown as u32;
    let icon_size = ICON_LARGE.min(section_width).min(height);
    let bottom_y = height as i32 - 8;

    for (i, forecast) in daily.iter().take(shown).enumerate() {
        let center_x = (i as u32 * section_width + section_width / 2) as i32;

        let icon_y = height as i32 / 2 - icon_size as i32 / 2;
        let icon_x = center_x - icon_size as i32 / 2;
        draw_weather_icon(target, &forecast.icon, Point::new(icon_x, icon_y), icon_size);

        draw_text_centered(target, &forecast.day_label, center_x, 1, SMALL_FONT, palette::TEXT);

        let temp_text = format!("{} / {}", forecast.temp_low, forecast.temp_high);
        draw_text_centered(target, &temp_text, center_x, bottom_y, EXTRA_SMALL_FONT, palette::TEXT);
    }
}

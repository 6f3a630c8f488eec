//! Plain-text rendering of a screen, for `weather show`.

use std::fmt::Write;
use weather_core::Screen;

pub fn render_text(screen: &Screen) -> String {
    let mut out = String::new();

    if let Some(panel) = &screen.current {
        let [location, temperature, condition, humidity, wind] = panel.rows();
        let _ = writeln!(out, "📍 {}", location.1);
        let _ = writeln!(out, "🌡 {}: {}", temperature.0, temperature.1);
        let _ = writeln!(out, "🌤 {}: {}", condition.0, condition.1);
        let _ = writeln!(out, "💧 {}: {}", humidity.0, humidity.1);
        let _ = writeln!(out, "🌬 {}: {}", wind.0, wind.1);
    }

    if let Some(rows) = &screen.forecast {
        out.push_str("\n3-Day Forecast\n");
        for row in rows {
            let _ = writeln!(out, "  {}", row.text);
        }
    }

    out
}

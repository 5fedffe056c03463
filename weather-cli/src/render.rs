use weather_screen_core::{Alert, ImageKey, Notifier, ViewModel};

const WIND_GLYPH: &str = "💨";

fn glyph(key: ImageKey) -> &'static str {
    match key {
        ImageKey::Sun => "☀️",
        ImageKey::Rain => "🌧️",
        ImageKey::Cloud => "☁️",
        ImageKey::Snow => "❄️",
    }
}

/// Draw one frame of the screen.
pub fn render_frame(vm: &ViewModel) -> String {
    let mut lines = Vec::new();

    if vm.show_spinner {
        lines.push("⏳ Fetching weather...".to_string());
    }

    if let Some(shown) = &vm.show_result {
        let r = &shown.reading;
        let image = vm.image_key.map(glyph).unwrap_or(" ");
        let wind = if vm.show_wind_icon { format!(" {WIND_GLYPH}") } else { String::new() };

        lines.push(shown.city.clone());
        lines.push(format!("  {image}  {}°C  {}", r.temperature_c, r.condition));
        lines.push(format!("  Humidity: {}%", r.humidity_pct));
        lines.push(format!("  Wind: {} km/h{wind}", r.wind_speed_kmh));
    }

    if let Some(msg) = &vm.show_error {
        lines.push(format!("⚠ {msg}"));
    }

    if lines.is_empty() {
        lines.push("Enter a city to see the weather.".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_alert(alert: &Alert) -> String {
    let body = format!(" {}: {} ", alert.title, alert.message);
    let bar = "─".repeat(body.chars().count());
    format!("┌{bar}┐\n│{body}│\n└{bar}┘")
}

/// Prints alerts to stderr. In interactive mode each alert waits for an
/// acknowledgement before the screen continues.
#[derive(Debug)]
pub struct TerminalNotifier {
    pub interactive: bool,
}

impl Notifier for TerminalNotifier {
    fn alert(&self, alert: &Alert) {
        eprintln!("{}", render_alert(alert));

        if !self.interactive {
            return;
        }
        if let Err(e) = inquire::Select::new("", vec!["OK"]).prompt() {
            tracing::debug!(error = %e, "alert dismissed without acknowledgement");
        }
    }
}

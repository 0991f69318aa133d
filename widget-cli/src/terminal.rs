use chrono::Local;
use weather_widget_core::{AlertSink, DisplaySlots};

/// Alerts go to stderr so they stay visible when stdout is piped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn alert(&self, message: &str) {
        eprintln!("\n  [!] {message}\n");
    }
}

pub fn format_slots(slots: &DisplaySlots) -> String {
    let mut out = String::new();
    out.push_str(&format!("  場所: {}\n", slots.location));
    out.push_str(&format!("  気温: {}°C\n", slots.temperature));
    out.push_str(&format!("  天気: {}\n", slots.description));
    out.push_str(&format!("  湿度: {}%\n", slots.humidity));
    if slots.icon.alt.is_empty() {
        out.push_str(&format!("  icon: {}\n", slots.icon.src));
    } else {
        out.push_str(&format!("  icon: {} ({})\n", slots.icon.src, slots.icon.alt));
    }
    if let Some(at) = slots.updated_at {
        out.push_str(&format!("  更新: {}\n", at.with_timezone(&Local).format("%Y-%m-%d %H:%M")));
    }
    out
}

pub fn print_slots(slots: &DisplaySlots) {
    print!("{}", format_slots(slots));
}

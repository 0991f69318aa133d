use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{WeatherDocument, WeatherReport};

/// Shown in the icon slot before anything is loaded and after failures.
pub const DEFAULT_ICON_URL: &str = "https://openweathermap.org/img/wn/02d@2x.png";
/// Shown in numeric and description slots after failures.
pub const PLACEHOLDER: &str = "--";

pub const LOCATION_ERROR_TEXT: &str = "エラーが発生しました";
pub const LOCATING_TEXT: &str = "位置情報を取得中...";
pub const DEFAULT_CITY_TEXT: &str = "デフォルトの都市";

/// Image URL for an OpenWeather condition icon code such as `10d`.
pub fn icon_url(code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{code}@2x.png")
}

/// Nearest integer, ties toward positive infinity (21.5 -> 22, -2.5 -> -2).
pub fn round_temperature(celsius: f64) -> i64 {
    let rounded = celsius.round();
    // `f64::round` sends negative ties away from zero.
    (if celsius - rounded == 0.5 { rounded + 1.0 } else { rounded }) as i64
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("weather document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("weather document has no condition entries")]
    NoConditions,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    dt: Option<i64>,
}

impl TryFrom<&WeatherDocument> for WeatherReport {
    type Error = RenderError;

    fn try_from(doc: &WeatherDocument) -> Result<Self, Self::Error> {
        let parsed = OwCurrentResponse::deserialize(&doc.0)?;
        let condition = parsed.weather.into_iter().next().ok_or(RenderError::NoConditions)?;

        Ok(WeatherReport {
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            description: condition.description,
            humidity_pct: parsed.main.humidity,
            icon_code: condition.icon,
            observation_time: parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSlot {
    pub src: String,
    pub alt: String,
}

impl Default for IconSlot {
    fn default() -> Self {
        Self { src: DEFAULT_ICON_URL.to_string(), alt: String::new() }
    }
}

/// The five output regions of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySlots {
    pub location: String,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub icon: IconSlot,
    /// When the slots last showed a successful result.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for DisplaySlots {
    fn default() -> Self {
        Self {
            location: String::new(),
            temperature: PLACEHOLDER.to_string(),
            description: PLACEHOLDER.to_string(),
            humidity: PLACEHOLDER.to_string(),
            icon: IconSlot::default(),
            updated_at: None,
        }
    }
}

impl DisplaySlots {
    /// Writes every field of `report` into the slots.
    pub fn show(&mut self, report: &WeatherReport) {
        self.location = report.location_name.clone();
        self.temperature = round_temperature(report.temperature_c).to_string();
        self.description = report.description.clone();
        self.humidity = report.humidity_pct.to_string();
        self.icon = IconSlot { src: icon_url(&report.icon_code), alt: report.description.clone() };
        self.updated_at = Some(Utc::now());
    }

    /// Replaces every slot with its error placeholder.
    pub fn show_error(&mut self) {
        self.location = LOCATION_ERROR_TEXT.to_string();
        self.temperature = PLACEHOLDER.to_string();
        self.description = PLACEHOLDER.to_string();
        self.humidity = PLACEHOLDER.to_string();
        self.icon = IconSlot::default();
        self.updated_at = None;
    }
}

//! Mock weather forecasts for the demo host.

use axum::extract::State;
use axum::Json;
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;

use crate::http::server::AppState;

const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

const FORECAST_DAYS: u64 = 5;

/// One day's forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub temperature_f: i32,
    pub summary: Option<&'static str>,
}

impl WeatherForecast {
    pub fn new(date: NaiveDate, temperature_c: i32, summary: Option<&'static str>) -> Self {
        Self {
            date,
            temperature_c,
            temperature_f: 32 + (temperature_c as f64 / 0.5556) as i32,
            summary,
        }
    }
}

/// Forecasts for the next five days starting tomorrow.
pub fn generate(today: NaiveDate) -> Vec<WeatherForecast> {
    (1..=FORECAST_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            WeatherForecast::new(
                date,
                fastrand::i32(-20..55),
                Some(SUMMARIES[fastrand::usize(..SUMMARIES.len())]),
            )
        })
        .collect()
}

/// GET /weatherforecast
pub async fn get_forecast(State(state): State<AppState>) -> Json<Vec<WeatherForecast>> {
    let forecast = generate(Local::now().date_naive());
    crate::log_info!(state.logger, "Received a request for weather forecast");
    Json(forecast)
}

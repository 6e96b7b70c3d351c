//! BLS public time-series API integration.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::CollectorConfig;
use crate::data::SeriesSource;
use crate::domain::{Observation, Period, SeriesDef};
use crate::error::AppError;

pub const USER_AGENT: &str = concat!("labor-dash/", env!("CARGO_PKG_VERSION"));

pub struct BlsClient {
    client: Client,
    base_url: String,
}

impl BlsClient {
    pub fn new(config: &CollectorConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn series_url(&self, series_id: &str) -> String {
        format!("{}/{series_id}", self.base_url)
    }
}

impl SeriesSource for BlsClient {
    fn fetch(&self, series: &SeriesDef, start_year: i32, end_year: i32) -> Result<Vec<Observation>, AppError> {
        let url = self.series_url(&series.id);
        tracing::debug!(%url, start_year, end_year, "requesting series");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("startyear", start_year.to_string()),
                ("endyear", end_year.to_string()),
            ])
            .send()
            .map_err(|e| AppError::data_source(&series.id, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data_source(
                &series.id,
                format!("request failed with status {}", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::data_source(&series.id, format!("failed to read response: {e}")))?;

        parse_response(series, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results")]
    results: Option<ApiResults>,
}

#[derive(Debug, Deserialize)]
struct ApiResults {
    series: Option<Vec<ApiSeries>>,
}

#[derive(Debug, Deserialize)]
struct ApiSeries {
    #[serde(default)]
    data: Vec<ApiPoint>,
}

#[derive(Debug, Deserialize)]
struct ApiPoint {
    year: String,
    period: String,
    #[serde(rename = "periodName", default)]
    period_name: String,
    value: String,
}

/// Parse a raw API body into monthly observations for `series`.
///
/// Fails when the `Results.series` envelope is missing or empty. Non-monthly
/// periods and unparseable values are dropped.
pub fn parse_response(series: &SeriesDef, body: &str) -> Result<Vec<Observation>, AppError> {
    let resp: ApiResponse = serde_json::from_str(body)
        .map_err(|e| AppError::data_source(&series.id, format!("invalid JSON response: {e}")))?;

    let Some(mut api_series) = resp.results.and_then(|r| r.series).filter(|s| !s.is_empty()) else {
        return Err(AppError::data_source(
            &series.id,
            envelope_failure(resp.status.as_deref(), &resp.message),
        ));
    };

    // One series per request; only the first entry is meaningful.
    let points = std::mem::take(&mut api_series[0].data);

    let mut out = Vec::with_capacity(points.len());
    for point in points {
        match Period::parse(&point.period) {
            Period::Month(_) => {}
            Period::AnnualAverage | Period::Other => continue,
        }
        let Ok(year) = point.year.trim().parse::<i32>() else {
            tracing::debug!(series = %series.id, year = %point.year, "skipping row with invalid year");
            continue;
        };
        let Some(value) = parse_value(&point.value) else {
            tracing::debug!(
                series = %series.id,
                year,
                period = %point.period,
                value = %point.value,
                "skipping row with non-numeric value"
            );
            continue;
        };
        if let Some(obs) = Observation::monthly(series, year, &point.period, &point.period_name, value) {
            out.push(obs);
        }
    }

    Ok(out)
}

fn envelope_failure(status: Option<&str>, messages: &[String]) -> String {
    let mut msg = "response is missing the Results.series envelope".to_string();
    if let Some(status) = status {
        msg.push_str(&format!(" (status: {status})"));
    }
    let notes: Vec<&str> = messages.iter().map(|m| m.trim()).filter(|m| !m.is_empty()).collect();
    if !notes.is_empty() {
        msg.push_str(&format!(": {}", notes.join("; ")));
    }
    msg
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let v = trimmed.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Unit;
    use chrono::NaiveDate;

    fn unemployment() -> SeriesDef {
        SeriesDef::new("LNS14000000", "Unemployment Rate", Unit::Percentage)
    }

    const SAMPLE: &str = r#"{
        "status": "REQUEST_SUCCEEDED",
        "responseTime": 120,
        "message": [],
        "Results": {
            "series": [{
                "seriesID": "LNS14000000",
                "data": [
                    {"year": "2024", "period": "M13", "periodName": "Annual", "value": "4.0"},
                    {"year": "2024", "period": "M02", "periodName": "February", "value": "3.9", "latest": "true"},
                    {"year": "2024", "period": "M01", "periodName": "January", "value": "3.7"},
                    {"year": "2023", "period": "M12", "periodName": "December", "value": "-"}
                ]
            }]
        }
    }"#;

    #[test]
    fn parses_monthly_rows_and_drops_annual_average() {
        let rows = parse_response(&unemployment(), SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.period != "M13"));

        let feb = &rows[0];
        assert_eq!(feb.series_id, "LNS14000000");
        assert_eq!(feb.series_name, "Unemployment Rate");
        assert_eq!(feb.period_name, "February");
        assert_eq!(feb.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!((feb.value - 3.9).abs() < 1e-12);
    }

    #[test]
    fn missing_envelope_is_a_data_source_error() {
        let body = r#"{"status": "REQUEST_NOT_PROCESSED", "message": ["daily threshold reached"]}"#;
        let err = parse_response(&unemployment(), body).unwrap_err();
        match &err {
            AppError::DataSource { series_id, message } => {
                assert_eq!(series_id, "LNS14000000");
                assert!(message.contains("REQUEST_NOT_PROCESSED"));
                assert!(message.contains("daily threshold reached"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_series_list_is_a_data_source_error() {
        let body = r#"{"status": "REQUEST_SUCCEEDED", "Results": {"series": []}}"#;
        assert!(matches!(
            parse_response(&unemployment(), body),
            Err(AppError::DataSource { .. })
        ));
    }

    #[test]
    fn invalid_json_is_a_data_source_error() {
        assert!(matches!(
            parse_response(&unemployment(), "<html>oops</html>"),
            Err(AppError::DataSource { .. })
        ));
    }

    #[test]
    fn parse_value_handles_placeholders() {
        assert_eq!(parse_value("158,450"), Some(158450.0));
        assert_eq!(parse_value(" 3.7 "), Some(3.7));
        assert_eq!(parse_value("-"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn series_url_appends_id() {
        let client = BlsClient::new(&CollectorConfig {
            base_url: "https://example.test/data/".to_string(),
            ..CollectorConfig::default()
        })
        .unwrap();
        assert_eq!(client.series_url("LNS14000000"), "https://example.test/data/LNS14000000");
    }
}

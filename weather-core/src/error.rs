use thiserror::Error;

/// Failures while refreshing weather data.
///
/// None of these are fatal: the station turns every one of them into a
/// backoff delay and a throttled log line.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not find coordinates for {0}")]
    LocationNotFound(String),

    #[error("Missing weather data: {0}")]
    MissingData(&'static str),

    #[error(
        "No valid OpenWeatherMap API key configured.\n\
         Hint: run `weather-matrix configure` and enter your API key."
    )]
    MissingApiKey,

    #[error("Weather cache error: {0}")]
    Cache(String),
}

/// Shorten a response body before it ends up in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

// Request parameters, shared by query strings and JSON bodies

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::downloader::DownloadError;

/// Boolean flag as clients actually send it: `true`, `"true"`, `1` or `"1"`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Number(n) => *n == 1,
            Flag::Text(s) => {
                let s = s.trim();
                s == "1" || s.eq_ignore_ascii_case("true")
            }
        }
    }
}

pub fn flag_set(flag: &Option<Flag>) -> bool {
    flag.as_ref().is_some_and(Flag::is_set)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfoParams {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadVideoParams {
    pub url: Option<String>,
    pub format_id: Option<String>,
    pub merged: Option<Flag>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadAudioParams {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadSubtitleParams {
    pub url: Option<String>,
    pub language: Option<String>,
    pub auto: Option<Flag>,
}

/// JSON request body. An empty body means "no fields"; a body that is
/// present but malformed is rejected.
pub fn parse_body<T>(body: &Bytes) -> Result<T, DownloadError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| DownloadError::invalid(format!("Invalid JSON body: {}", e)))
}

/// Trimmed, non-empty value of a required field
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

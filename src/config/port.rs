//! Custom serde module for database ports given as `""`, `"3306"` or `3306`.

use serde::{self, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Number(u64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawPort> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawPort::Number(n)) => u16::try_from(n)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("port out of range: {}", n))),
        Some(RawPort::Text(s)) => parse_port(&s).map_err(serde::de::Error::custom),
    }
}

/// An empty string means "backend default".
pub(crate) fn parse_port(s: &str) -> Result<Option<u16>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    s.parse::<u16>()
        .map(Some)
        .map_err(|_| format!("invalid port: {}", s))
}

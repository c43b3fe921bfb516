use crate::config::TimelineConfig;
use crate::error::TimelineError;

/// Accepts only positive integers; anything else is a client error.
pub fn parse_user_id(raw: &str) -> Result<u64, TimelineError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TimelineError::InvalidUserId {
            raw: raw.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    /// Lenient parsing: unparseable input falls back to the default and
    /// numeric input is clamped, so this never fails.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>, config: &TimelineConfig) -> Self {
        let limit = match limit.and_then(parse_integer) {
            Some(value) => value.clamp(i64::from(config.min_limit), i64::from(config.max_limit)),
            None => i64::from(config.default_limit),
        };
        let offset = offset.and_then(parse_integer).unwrap_or(0).max(0);

        Self {
            limit: usize::try_from(limit).unwrap_or(usize::MAX),
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    // "10.7" reads as 10, matching how query strings are usually coerced.
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}

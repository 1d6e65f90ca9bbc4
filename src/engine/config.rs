//! Quiz configuration: the loose wire request and its coerced, typed form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ClubId, QuizCategory, QuizMode, SeasonId};

/// Answers returned when `limit` is missing or unusable.
pub const DEFAULT_LIMIT: usize = 10;

/// Quiz request as it arrives over the wire.
///
/// Numeric fields are kept as raw JSON so that strings like `"5"` and
/// garbage like `"ten"` can be coerced instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub mode: Option<QuizMode>,
    #[serde(default)]
    pub category: Option<QuizCategory>,
    #[serde(default)]
    pub club_id: Option<Value>,
    #[serde(default)]
    pub season_id: Option<Value>,
    #[serde(default)]
    pub limit: Option<Value>,
}

/// Typed quiz configuration; also echoed back in every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    pub mode: QuizMode,
    pub category: QuizCategory,
    pub limit: usize,
    pub club_id: Option<ClubId>,
    pub season_id: Option<SeasonId>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            mode: QuizMode::default(),
            category: QuizCategory::default(),
            limit: DEFAULT_LIMIT,
            club_id: None,
            season_id: None,
        }
    }
}

impl QuizConfig {
    pub fn new(mode: QuizMode, category: QuizCategory) -> Self {
        Self {
            mode,
            category,
            ..Self::default()
        }
    }

    pub fn club(mut self, id: ClubId) -> Self {
        self.club_id = Some(id);
        self
    }

    pub fn season(mut self, id: SeasonId) -> Self {
        self.season_id = Some(id);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl From<QuizRequest> for QuizConfig {
    fn from(req: QuizRequest) -> Self {
        Self {
            mode: req.mode.unwrap_or_default(),
            category: req.category.unwrap_or_default(),
            limit: req
                .limit
                .as_ref()
                .and_then(coerce_int)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(DEFAULT_LIMIT),
            club_id: req.club_id.as_ref().and_then(coerce_id),
            season_id: req.season_id.as_ref().and_then(coerce_id),
        }
    }
}

/// Integer view of a loosely typed JSON value.
///
/// Floats truncate toward zero, strings are trimmed and parsed, anything
/// else (bool, null, arrays, objects, unparsable text) yields `None`.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_id(value: &Value) -> Option<u64> {
    coerce_int(value).and_then(|n| u64::try_from(n).ok())
}

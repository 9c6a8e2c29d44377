//! Rows stored by the [`Database`](super::Database).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_COLOR: &str = "#3B82F6";

/// A named pursuit tracked toward the mastery goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_main: bool,
    pub color: String,
    pub created_at: NaiveDateTime,
}

/// Input for creating an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl NewActivity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
            is_main: false,
            color: default_color(),
        }
    }

    pub fn main(mut self) -> Self {
        self.is_main = true;
        self
    }

    /// Trim the name and check the color.
    pub(crate) fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = validate_name(&self.name)?;
        validate_color(&self.color)?;
        Ok(self)
    }
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_main: Option<bool>,
    pub color: Option<String>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.is_main.is_none()
            && self.color.is_none()
    }

    pub(crate) fn validated(mut self) -> Result<Self, ValidationError> {
        if let Some(name) = &self.name {
            self.name = Some(validate_name(name)?);
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(self)
    }
}

/// One recorded duration of practice, joined with its activity name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: i64,
    pub activity_id: i64,
    pub activity_name: String,
    pub hours: f64,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
}

impl EntryRecord {
    /// Calendar day the entry counts toward.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Filter for listing entries. Bounds are inclusive calendar days.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryQuery {
    pub activity_id: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl EntryQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_activity(activity_id: i64) -> Self {
        Self {
            activity_id: Some(activity_id),
            ..Self::default()
        }
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Marker that cumulative hours for an activity crossed a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub activity_id: i64,
    pub hours_reached: u32,
    pub reached_at: NaiveDateTime,
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "color".into(),
            message: format!("expected #RRGGBB, got '{color}'"),
        })
    }
}

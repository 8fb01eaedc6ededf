//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies are parsed here and converted into service-layer inputs.
//! Response bodies reuse the `api` types, which already serialize with the
//! camelCase wire format.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

// Re-export the types that appear directly in responses.
pub use crate::api::{Lesson, Schedule, ScheduleItem, ScheduleItemWithLesson};
pub use crate::db::services::ScheduleWithItems;

use crate::api::{CourseId, LessonId, StartTime};
use crate::db::services::{CreateScheduleInput, CreateScheduleItemInput};
use crate::models::{DEFAULT_HOURS_PER_DAY, DEFAULT_STUDY_DAYS_PER_WEEK};

/// Request body for creating a schedule from a validated draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(deserialize_with = "flexible_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "flexible_date")]
    pub end_date: NaiveDate,
    #[serde(default = "default_study_days_per_week")]
    pub study_days_per_week: u8,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: u8,
    pub items: Vec<CreateScheduleItemRequest>,
}

/// One calendar placement inside [`CreateScheduleRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleItemRequest {
    pub lesson_id: LessonId,
    #[serde(deserialize_with = "flexible_date")]
    pub scheduled_date: NaiveDate,
    pub start_time: StartTime,
    pub duration_minutes: u32,
}

fn default_study_days_per_week() -> u8 {
    DEFAULT_STUDY_DAYS_PER_WEEK
}

fn default_hours_per_day() -> u8 {
    DEFAULT_HOURS_PER_DAY
}

/// Accept a plain ISO date or a full ISO-8601 timestamp; only the calendar
/// day is retained. Original clients sent both forms.
fn flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid date '{}', expected YYYY-MM-DD or an ISO-8601 timestamp",
                raw
            ))
        })
}

impl From<CreateScheduleItemRequest> for CreateScheduleItemInput {
    fn from(request: CreateScheduleItemRequest) -> Self {
        Self {
            lesson_id: request.lesson_id,
            scheduled_date: request.scheduled_date,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
        }
    }
}

impl From<CreateScheduleRequest> for CreateScheduleInput {
    fn from(request: CreateScheduleRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            course_id: request.course_id,
            start_date: request.start_date,
            end_date: request.end_date,
            study_days_per_week: request.study_days_per_week,
            hours_per_day: request.hours_per_day,
            items: request.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request body for toggling an item's completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemCompletionRequest {
    pub completed: bool,
}

/// Response for schedule creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleResponse {
    pub schedule: Schedule,
}

/// Response for the schedule listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    pub schedules: Vec<Schedule>,
    pub total: usize,
}

/// Response for the completion toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCompletionResponse {
    pub item: ScheduleItem,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

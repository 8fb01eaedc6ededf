//! Public API surface for the Rust backend.
//!
//! This file consolidates the domain types shared by the repository layer and
//! the HTTP API. All types serialize to the camelCase JSON the frontend
//! consumes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;
pub use crate::models::StartTime;

define_id_type!(i64, CourseId);
define_id_type!(i64, SectionId);
define_id_type!(i64, LessonId);
define_id_type!(i64, ScheduleId);
define_id_type!(i64, ScheduleItemId);

/// Catalog lesson. Owned by the catalog-sync pipeline; this subsystem only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub section_id: SectionId,
    pub title: String,
    pub slug: String,
    /// Order of the lesson within its section.
    pub position: i32,
    /// Length of the attached video, when the lesson has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_duration_minutes: Option<u32>,
}

/// Input for creating a schedule. Field invariants are checked once, at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<CourseId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub study_days_per_week: u8,
    pub hours_per_day: u8,
}

impl NewSchedule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        description: Option<String>,
        course_id: Option<CourseId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        study_days_per_week: u8,
        hours_per_day: u8,
    ) -> Result<Self, String> {
        if title.trim().is_empty() {
            return Err("Schedule title cannot be empty".to_string());
        }
        if start_date >= end_date {
            return Err("Start date must be before end date".to_string());
        }
        Ok(Self {
            title,
            description,
            course_id,
            start_date,
            end_date,
            study_days_per_week,
            hours_per_day,
        })
    }
}

/// Persisted study schedule.
///
/// `course_id` is `None` for manual schedules assembled from lessons of
/// several courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<CourseId>,
    /// First day of the study period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the study period (inclusive).
    pub end_date: NaiveDate,
    pub study_days_per_week: u8,
    pub hours_per_day: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Number of days spanned by the study period.
    pub fn duration_in_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// Input for creating a schedule item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleItem {
    pub lesson_id: LessonId,
    pub scheduled_date: NaiveDate,
    pub start_time: StartTime,
    pub duration_minutes: u32,
}

impl NewScheduleItem {
    pub fn new(
        lesson_id: LessonId,
        scheduled_date: NaiveDate,
        start_time: StartTime,
        duration_minutes: u32,
    ) -> Result<Self, String> {
        if duration_minutes < 1 {
            return Err("Schedule item duration must be at least 1 minute".to_string());
        }
        Ok(Self {
            lesson_id,
            scheduled_date,
            start_time,
            duration_minutes,
        })
    }
}

/// Persisted schedule item: one lesson placed on one day/time slot.
///
/// `completed` is the only field that changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: ScheduleItemId,
    pub schedule_id: ScheduleId,
    pub lesson_id: LessonId,
    pub scheduled_date: NaiveDate,
    pub start_time: StartTime,
    pub duration_minutes: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleItem {
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// An item is overdue when its day has passed and it was never completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.scheduled_date < today
    }
}

/// Schedule item enriched with its lesson, as returned by the detail
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemWithLesson {
    pub id: ScheduleItemId,
    pub schedule_id: ScheduleId,
    pub lesson_id: LessonId,
    pub scheduled_date: NaiveDate,
    pub start_time: StartTime,
    pub duration_minutes: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lesson: Lesson,
}

impl ScheduleItemWithLesson {
    pub fn new(item: ScheduleItem, lesson: Lesson) -> Self {
        Self {
            id: item.id,
            schedule_id: item.schedule_id,
            lesson_id: item.lesson_id,
            scheduled_date: item.scheduled_date,
            start_time: item.start_time,
            duration_minutes: item.duration_minutes,
            completed: item.completed,
            created_at: item.created_at,
            updated_at: item.updated_at,
            lesson,
        }
    }
}

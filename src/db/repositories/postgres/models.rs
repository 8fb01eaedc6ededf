use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{lessons, schedule_items, schedules};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LessonRow {
    pub lesson_id: i64,
    pub section_id: i64,
    pub title: String,
    pub slug: String,
    pub position: i32,
    pub video_duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = lessons)]
// None must clear a stale duration on re-sync, not preserve it.
#[diesel(treat_none_as_null = true)]
pub struct NewLessonRow {
    pub lesson_id: i64,
    pub section_id: i64,
    pub title: String,
    pub slug: String,
    pub position: i32,
    pub video_duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduleRow {
    pub schedule_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub study_days_per_week: i16,
    pub hours_per_day: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedules)]
pub struct NewScheduleRow {
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub study_days_per_week: i16,
    pub hours_per_day: i16,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedule_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduleItemRow {
    pub item_id: i64,
    pub schedule_id: i64,
    pub lesson_id: i64,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub duration_minutes: i32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedule_items)]
pub struct NewScheduleItemRow {
    pub schedule_id: i64,
    pub lesson_id: i64,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub duration_minutes: i32,
    pub completed: bool,
}

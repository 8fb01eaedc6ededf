//! Service layer: the schedule use cases.
//!
//! High-level functions over any [`FullRepository`] implementation. Handlers
//! and bindings call these instead of talking to repositories directly.

use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::api::{
    CourseId, LessonId, NewSchedule, NewScheduleItem, Schedule, ScheduleId, ScheduleItem,
    ScheduleItemId, ScheduleItemWithLesson, StartTime,
};
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};

/// One calendar placement submitted for persistence.
#[derive(Debug, Clone)]
pub struct CreateScheduleItemInput {
    pub lesson_id: LessonId,
    pub scheduled_date: NaiveDate,
    pub start_time: StartTime,
    pub duration_minutes: u32,
}

/// Validated-draft payload for [`create_schedule`].
#[derive(Debug, Clone)]
pub struct CreateScheduleInput {
    pub title: String,
    pub description: Option<String>,
    pub course_id: Option<CourseId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub study_days_per_week: u8,
    pub hours_per_day: u8,
    pub items: Vec<CreateScheduleItemInput>,
}

/// A schedule plus its items, each enriched with its lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWithItems {
    pub schedule: Schedule,
    pub items: Vec<ScheduleItemWithLesson>,
}

/// Persist a schedule assembled from a validated draft.
///
/// Every referenced lesson is resolved against the catalog concurrently; a
/// single `NotFound` names all missing ids. The schedule row and its items
/// are written in one transaction, so a failure never leaves an item-less
/// schedule behind.
pub async fn create_schedule(
    repo: &dyn FullRepository,
    input: CreateScheduleInput,
) -> RepositoryResult<Schedule> {
    if input.items.is_empty() {
        return Err(
            RepositoryError::validation("At least one lesson must be scheduled")
                .with_operation("create_schedule"),
        );
    }

    let lesson_ids: Vec<LessonId> = input.items.iter().map(|item| item.lesson_id).collect();
    debug!("Resolving {} lesson id(s) for new schedule", lesson_ids.len());
    let lookups = join_all(lesson_ids.iter().map(|id| repo.find_lesson(*id))).await;

    let mut missing = Vec::new();
    for (lesson_id, lookup) in lesson_ids.iter().zip(lookups) {
        if lookup?.is_none() {
            missing.push(lesson_id.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(
            RepositoryError::not_found(format!("Lessons not found: {}", missing.join(", ")))
                .with_operation("create_schedule"),
        );
    }

    let schedule = NewSchedule::new(
        input.title,
        input.description,
        input.course_id,
        input.start_date,
        input.end_date,
        input.study_days_per_week,
        input.hours_per_day,
    )
    .map_err(RepositoryError::validation)?;

    let items = input
        .items
        .into_iter()
        .map(|item| {
            NewScheduleItem::new(
                item.lesson_id,
                item.scheduled_date,
                item.start_time,
                item.duration_minutes,
            )
        })
        .collect::<Result<Vec<_>, String>>()
        .map_err(RepositoryError::validation)?;

    info!(
        "Creating schedule '{}' with {} item(s)",
        schedule.title,
        items.len()
    );
    repo.create_schedule_with_items(schedule, items).await
}

/// Fetch one schedule with its items enriched by their lessons, items in
/// scheduled-date order.
///
/// A dangling lesson id on a stored item is a storage integrity violation
/// and surfaces as an internal error, not a user-facing 404.
pub async fn get_schedule_with_items(
    repo: &dyn FullRepository,
    schedule_id: ScheduleId,
) -> RepositoryResult<ScheduleWithItems> {
    let schedule = repo
        .get_schedule(schedule_id)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found("Schedule not found")
                .with_operation("get_schedule_with_items")
        })?;

    let items = repo.get_items_for_schedule(schedule_id).await?;

    let lookups = join_all(items.iter().map(|item| repo.find_lesson(item.lesson_id))).await;
    let mut enriched = Vec::with_capacity(items.len());
    for (item, lookup) in items.into_iter().zip(lookups) {
        let lesson = lookup?.ok_or_else(|| {
            RepositoryError::internal_with_context(
                format!(
                    "Lesson {} not found for schedule item {}",
                    item.lesson_id, item.id
                ),
                ErrorContext::new("get_schedule_with_items")
                    .with_entity("lesson")
                    .with_entity_id(item.lesson_id),
            )
        })?;
        enriched.push(ScheduleItemWithLesson::new(item, lesson));
    }

    Ok(ScheduleWithItems {
        schedule,
        items: enriched,
    })
}

/// All schedules, newest first.
pub async fn list_schedules(repo: &dyn FullRepository) -> RepositoryResult<Vec<Schedule>> {
    repo.list_schedules().await
}

/// Delete a schedule and all of its items.
pub async fn delete_schedule(
    repo: &dyn FullRepository,
    schedule_id: ScheduleId,
) -> RepositoryResult<()> {
    if repo.get_schedule(schedule_id).await?.is_none() {
        return Err(
            RepositoryError::not_found("Schedule not found").with_operation("delete_schedule")
        );
    }

    info!("Deleting schedule {} and its items", schedule_id);
    repo.delete_schedule(schedule_id).await
}

/// Mark one item of a schedule as done (or not done again).
pub async fn set_item_completed(
    repo: &dyn FullRepository,
    schedule_id: ScheduleId,
    item_id: ScheduleItemId,
    completed: bool,
) -> RepositoryResult<ScheduleItem> {
    repo.set_item_completed(schedule_id, item_id, completed)
        .await
}

/// Verify the storage backend is reachable.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

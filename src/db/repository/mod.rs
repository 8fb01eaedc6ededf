//! Repository abstractions for the persistence layer.
//!
//! The storage surface is split by concern: [`CatalogRepository`] is the
//! read-only view of the lesson catalog (owned by the sync pipeline, consumed
//! here), [`ScheduleRepository`] is the read/write surface for schedules and
//! their items. [`FullRepository`] is the combined object the application is
//! wired against.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::api::{
    Lesson, LessonId, NewSchedule, NewScheduleItem, Schedule, ScheduleId, ScheduleItem,
    ScheduleItemId, SectionId,
};

/// Read-only lesson lookup.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch one lesson; `None` when the id is unknown.
    async fn find_lesson(&self, lesson_id: LessonId) -> RepositoryResult<Option<Lesson>>;

    /// Lessons of one section, in position order.
    async fn list_lessons_by_section(&self, section_id: SectionId)
        -> RepositoryResult<Vec<Lesson>>;
}

/// Persistence operations for schedules and their items.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Create a schedule together with all of its items, atomically: either
    /// the schedule row and every item land, or nothing does.
    async fn create_schedule_with_items(
        &self,
        schedule: NewSchedule,
        items: Vec<NewScheduleItem>,
    ) -> RepositoryResult<Schedule>;

    /// Fetch one schedule; `None` when the id is unknown.
    async fn get_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Option<Schedule>>;

    /// All schedules, newest first.
    async fn list_schedules(&self) -> RepositoryResult<Vec<Schedule>>;

    /// Items of one schedule, ordered by scheduled date.
    async fn get_items_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<Vec<ScheduleItem>>;

    /// Flip the completion flag of one item, scoped to its schedule so an id
    /// from another schedule cannot be touched. Returns the updated item;
    /// `NotFound` when no such item exists under that schedule.
    async fn set_item_completed(
        &self,
        schedule_id: ScheduleId,
        item_id: ScheduleItemId,
        completed: bool,
    ) -> RepositoryResult<ScheduleItem>;

    /// Delete a schedule and cascade-delete its items.
    async fn delete_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<()>;
}

/// Complete persistence surface: catalog reads plus schedule writes.
pub trait FullRepository: CatalogRepository + ScheduleRepository {}

impl<T: CatalogRepository + ScheduleRepository> FullRepository for T {}

impl std::fmt::Debug for dyn FullRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FullRepository")
    }
}

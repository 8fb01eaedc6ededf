//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMaps, providing fast, deterministic, and isolated
//! execution.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::api::{
    Lesson, LessonId, NewSchedule, NewScheduleItem, Schedule, ScheduleId, ScheduleItem,
    ScheduleItemId, SectionId,
};
use crate::db::repository::{
    CatalogRepository, RepositoryError, RepositoryResult, ScheduleRepository,
};

/// In-memory local repository.
///
/// Ideal for unit tests and local development that need isolation and speed.
/// The catalog starts empty; seed lessons with [`LocalRepository::insert_lesson`].
///
/// # Example
/// ```ignore
/// use studyplan_rust::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.insert_lesson(lesson);
///
/// let found = repo.find_lesson(lesson_id).await?;
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    lessons: HashMap<LessonId, Lesson>,
    schedules: HashMap<ScheduleId, Schedule>,
    items: HashMap<ScheduleItemId, ScheduleItem>,

    // ID counters
    next_schedule_id: i64,
    next_item_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            lessons: HashMap::new(),
            schedules: HashMap::new(),
            items: HashMap::new(),
            next_schedule_id: 1,
            next_item_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Seed one catalog lesson. Overwrites a lesson with the same id.
    pub fn insert_lesson(&self, lesson: Lesson) {
        let mut data = self.data.write();
        data.lessons.insert(lesson.id, lesson);
    }

    /// Drop a lesson from the catalog, for simulating dangling references.
    pub fn remove_lesson(&self, lesson_id: LessonId) {
        let mut data = self.data.write();
        data.lessons.remove(&lesson_id);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..LocalData::default()
        };
    }

    /// Number of schedules stored.
    pub fn schedule_count(&self) -> usize {
        self.data.read().schedules.len()
    }

    /// Number of schedule items stored, across all schedules.
    pub fn item_count(&self) -> usize {
        self.data.read().items.len()
    }

    pub fn has_schedule(&self, schedule_id: ScheduleId) -> bool {
        self.data.read().schedules.contains_key(&schedule_id)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn find_lesson(&self, lesson_id: LessonId) -> RepositoryResult<Option<Lesson>> {
        self.check_health()?;
        Ok(self.data.read().lessons.get(&lesson_id).cloned())
    }

    async fn list_lessons_by_section(
        &self,
        section_id: SectionId,
    ) -> RepositoryResult<Vec<Lesson>> {
        self.check_health()?;

        let data = self.data.read();
        let mut lessons: Vec<Lesson> = data
            .lessons
            .values()
            .filter(|lesson| lesson.section_id == section_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|lesson| (lesson.position, lesson.id));
        Ok(lessons)
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_schedule_with_items(
        &self,
        schedule: NewSchedule,
        items: Vec<NewScheduleItem>,
    ) -> RepositoryResult<Schedule> {
        self.check_health()?;

        // One write guard covers the schedule row and every item, which is
        // the in-memory equivalent of a transaction.
        let mut data = self.data.write();
        let now = Utc::now();

        let schedule_id = ScheduleId::new(data.next_schedule_id);
        data.next_schedule_id += 1;

        let stored = Schedule {
            id: schedule_id,
            title: schedule.title,
            description: schedule.description,
            course_id: schedule.course_id,
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            study_days_per_week: schedule.study_days_per_week,
            hours_per_day: schedule.hours_per_day,
            created_at: now,
            updated_at: now,
        };
        data.schedules.insert(schedule_id, stored.clone());

        for item in items {
            let item_id = ScheduleItemId::new(data.next_item_id);
            data.next_item_id += 1;
            data.items.insert(
                item_id,
                ScheduleItem {
                    id: item_id,
                    schedule_id,
                    lesson_id: item.lesson_id,
                    scheduled_date: item.scheduled_date,
                    start_time: item.start_time,
                    duration_minutes: item.duration_minutes,
                    completed: false,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        Ok(stored)
    }

    async fn get_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Option<Schedule>> {
        self.check_health()?;
        Ok(self.data.read().schedules.get(&schedule_id).cloned())
    }

    async fn list_schedules(&self) -> RepositoryResult<Vec<Schedule>> {
        self.check_health()?;

        let data = self.data.read();
        let mut schedules: Vec<Schedule> = data.schedules.values().cloned().collect();
        schedules.sort_by_key(|schedule| Reverse((schedule.created_at, schedule.id)));
        Ok(schedules)
    }

    async fn get_items_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<Vec<ScheduleItem>> {
        self.check_health()?;

        let data = self.data.read();
        let mut items: Vec<ScheduleItem> = data
            .items
            .values()
            .filter(|item| item.schedule_id == schedule_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.scheduled_date, item.start_time, item.id));
        Ok(items)
    }

    async fn set_item_completed(
        &self,
        schedule_id: ScheduleId,
        item_id: ScheduleItemId,
        completed: bool,
    ) -> RepositoryResult<ScheduleItem> {
        self.check_health()?;

        let mut data = self.data.write();
        match data.items.get_mut(&item_id) {
            Some(item) if item.schedule_id == schedule_id => {
                item.completed = completed;
                item.updated_at = Utc::now();
                Ok(item.clone())
            }
            _ => Err(RepositoryError::not_found("Schedule item not found")),
        }
    }

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<()> {
        self.check_health()?;

        let mut data = self.data.write();
        data.schedules.remove(&schedule_id);
        data.items.retain(|_, item| item.schedule_id != schedule_id);
        Ok(())
    }
}

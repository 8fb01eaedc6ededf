//! In-memory draft of a study schedule under construction.
//!
//! The draft tracks which courses/sections/lessons the user has picked and
//! where each selected lesson was placed on the calendar. It is owned by a
//! single UI session and mutated only through synchronous transitions; no
//! locking, no I/O. [`crate::services::validate_draft`] is the consistency
//! gate before submission.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{CourseId, Lesson, LessonId, SectionId};
use crate::models::StartTime;

pub const DEFAULT_STUDY_DAYS_PER_WEEK: u8 = 5;
pub const DEFAULT_HOURS_PER_DAY: u8 = 2;

/// Fallback slot length when a lesson has no video to take it from.
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

/// Calendar placement of one selected lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub lesson_id: LessonId,
    /// Day the lesson is studied. Day-level only; time of day lives in
    /// `start_time`.
    pub scheduled_date: NaiveDate,
    pub start_time: StartTime,
    pub duration_minutes: u32,
}

impl Allocation {
    pub fn new(
        lesson_id: LessonId,
        scheduled_date: NaiveDate,
        start_time: StartTime,
        duration_minutes: u32,
    ) -> Self {
        Self {
            lesson_id,
            scheduled_date,
            start_time,
            duration_minutes,
        }
    }

    /// Placement for a lesson dropped on the calendar: the slot length
    /// defaults to the lesson's video duration, else one hour.
    pub fn for_lesson(lesson: &Lesson, scheduled_date: NaiveDate, start_time: StartTime) -> Self {
        Self {
            lesson_id: lesson.id,
            scheduled_date,
            start_time,
            duration_minutes: lesson.video_duration_minutes.unwrap_or(DEFAULT_SLOT_MINUTES),
        }
    }
}

/// Field-wise update for an existing allocation. Unset fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct AllocationPatch {
    pub scheduled_date: Option<NaiveDate>,
    pub start_time: Option<StartTime>,
    pub duration_minutes: Option<u32>,
}

/// Draft state of a manual schedule.
///
/// Allocations are keyed by lesson id, so a lesson has at most one placement
/// and re-allocating overwrites. Nothing prevents two different lessons from
/// sharing a (date, start time) slot; overlapping placements are allowed and
/// left to the user.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDraft {
    pub title: String,
    pub description: Option<String>,
    /// Inclusive date bounds of the study period.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub study_days_per_week: u8,
    pub hours_per_day: u8,
    pub selected_courses: HashSet<CourseId>,
    pub expanded_sections: HashSet<SectionId>,
    pub selected_lessons: HashMap<LessonId, Lesson>,
    /// Keys are always a subset of `selected_lessons` keys; every mutation
    /// here preserves that.
    pub allocations: HashMap<LessonId, Allocation>,
}

impl ScheduleDraft {
    pub fn new() -> Self {
        Self {
            study_days_per_week: DEFAULT_STUDY_DAYS_PER_WEEK,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            ..Self::default()
        }
    }

    /// Select or deselect a course in the course picker.
    pub fn toggle_course(&mut self, course_id: CourseId) {
        if !self.selected_courses.remove(&course_id) {
            self.selected_courses.insert(course_id);
        }
    }

    /// Expand or collapse a section in the lesson tree.
    pub fn toggle_section(&mut self, section_id: SectionId) {
        if !self.expanded_sections.remove(&section_id) {
            self.expanded_sections.insert(section_id);
        }
    }

    /// Select or deselect a single lesson. Selecting expands the lesson's
    /// section; deselecting drops any placement the lesson had.
    pub fn toggle_lesson(&mut self, lesson: &Lesson) {
        if self.selected_lessons.remove(&lesson.id).is_some() {
            self.allocations.remove(&lesson.id);
        } else {
            self.selected_lessons.insert(lesson.id, lesson.clone());
            self.expanded_sections.insert(lesson.section_id);
        }
    }

    /// Bulk toggle for a section's lessons: deselect all when every one is
    /// already selected, otherwise select all and expand the section.
    pub fn toggle_all_lessons_in_section(&mut self, section_id: SectionId, lessons: &[Lesson]) {
        let all_selected = lessons
            .iter()
            .all(|lesson| self.selected_lessons.contains_key(&lesson.id));

        if all_selected {
            for lesson in lessons {
                self.selected_lessons.remove(&lesson.id);
                self.allocations.remove(&lesson.id);
            }
        } else {
            for lesson in lessons {
                self.selected_lessons.insert(lesson.id, lesson.clone());
            }
            self.expanded_sections.insert(section_id);
        }
    }

    /// Drop every selected lesson together with its placement.
    pub fn clear_selected_lessons(&mut self) {
        self.selected_lessons.clear();
        self.allocations.clear();
    }

    /// Place (or re-place) a selected lesson on the calendar. Last write
    /// wins; the target slot is not checked for collisions. Ignored when the
    /// lesson is not selected.
    pub fn allocate(&mut self, allocation: Allocation) {
        if self.selected_lessons.contains_key(&allocation.lesson_id) {
            self.allocations.insert(allocation.lesson_id, allocation);
        }
    }

    /// Merge a partial update into an existing placement. No-op when the
    /// lesson has none.
    pub fn update_allocation(&mut self, lesson_id: LessonId, patch: AllocationPatch) {
        if let Some(allocation) = self.allocations.get_mut(&lesson_id) {
            if let Some(scheduled_date) = patch.scheduled_date {
                allocation.scheduled_date = scheduled_date;
            }
            if let Some(start_time) = patch.start_time {
                allocation.start_time = start_time;
            }
            if let Some(duration_minutes) = patch.duration_minutes {
                allocation.duration_minutes = duration_minutes;
            }
        }
    }

    /// Take a lesson off the calendar. It stays selected and becomes
    /// unallocated.
    pub fn remove_allocation(&mut self, lesson_id: LessonId) {
        self.allocations.remove(&lesson_id);
    }

    /// Selected lessons still waiting for a calendar placement, in catalog
    /// order.
    pub fn unallocated_lessons(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self
            .selected_lessons
            .values()
            .filter(|lesson| !self.allocations.contains_key(&lesson.id))
            .collect();
        lessons.sort_by_key(|lesson| (lesson.section_id, lesson.position, lesson.id));
        lessons
    }

    /// Remove placements that fell outside the date bounds, returning how
    /// many were dropped. An unset bound does not constrain. Idempotent;
    /// callers run this right after editing `start_date`/`end_date`.
    pub fn clean_orphaned_allocations(&mut self) -> usize {
        let before = self.allocations.len();
        let start = self.start_date;
        let end = self.end_date;
        self.allocations.retain(|_, allocation| {
            let after_start = start.is_none_or(|s| allocation.scheduled_date >= s);
            let before_end = end.is_none_or(|e| allocation.scheduled_date <= e);
            after_start && before_end
        });
        before - self.allocations.len()
    }

    pub fn is_course_selected(&self, course_id: CourseId) -> bool {
        self.selected_courses.contains(&course_id)
    }

    pub fn is_section_expanded(&self, section_id: SectionId) -> bool {
        self.expanded_sections.contains(&section_id)
    }

    pub fn is_lesson_selected(&self, lesson_id: LessonId) -> bool {
        self.selected_lessons.contains_key(&lesson_id)
    }

    pub fn is_lesson_allocated(&self, lesson_id: LessonId) -> bool {
        self.allocations.contains_key(&lesson_id)
    }
}

//! End-to-end flow tests: from a draft to a persisted schedule.
//!
//! These tests drive the same path the frontend does: assemble a draft
//! against a lesson catalog, validate it, turn the allocations into a
//! creation payload and hand it to the service layer backed by the in-memory
//! repository. Per-function service behavior is covered next to the service
//! module; this file chains the steps.

use chrono::NaiveDate;
use studyplan_rust::api::{Lesson, LessonId, SectionId};
use studyplan_rust::db::repositories::LocalRepository;
use studyplan_rust::db::services::{self, CreateScheduleInput, CreateScheduleItemInput};
use studyplan_rust::db::RepositoryError;
use studyplan_rust::models::{Allocation, ScheduleDraft, StartTime};
use studyplan_rust::services::validate_draft;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(s: &str) -> StartTime {
    StartTime::parse(s).unwrap()
}

fn catalog() -> Vec<Lesson> {
    let lesson = |id: i64, section: i64, position: i32, title: &str| Lesson {
        id: LessonId::new(id),
        section_id: SectionId::new(section),
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        position,
        video_duration_minutes: Some(20),
    };
    vec![
        lesson(1, 10, 1, "Introdução"),
        lesson(2, 10, 2, "Ownership"),
        lesson(3, 20, 1, "Structs"),
    ]
}

fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    for lesson in catalog() {
        repo.insert_lesson(lesson);
    }
    repo
}

/// Draft with every catalog lesson selected and placed on consecutive days.
fn fully_allocated_draft(title: &str) -> ScheduleDraft {
    let mut draft = ScheduleDraft::new();
    draft.title = title.to_string();
    draft.start_date = Some(date(2025, 3, 1));
    draft.end_date = Some(date(2025, 3, 31));
    for (offset, lesson) in catalog().iter().enumerate() {
        draft.toggle_lesson(lesson);
        draft.allocate(Allocation::new(
            lesson.id,
            date(2025, 3, 3 + offset as u32),
            time("19:00"),
            20,
        ));
    }
    draft
}

/// What the frontend submits after validation: the draft's allocations in
/// calendar order.
fn submission_payload(draft: &ScheduleDraft) -> CreateScheduleInput {
    let mut items: Vec<CreateScheduleItemInput> = draft
        .allocations
        .values()
        .map(|allocation| CreateScheduleItemInput {
            lesson_id: allocation.lesson_id,
            scheduled_date: allocation.scheduled_date,
            start_time: allocation.start_time,
            duration_minutes: allocation.duration_minutes,
        })
        .collect();
    items.sort_by_key(|item| (item.scheduled_date, item.start_time));

    CreateScheduleInput {
        title: draft.title.clone(),
        description: draft.description.clone(),
        course_id: None,
        start_date: draft.start_date.unwrap(),
        end_date: draft.end_date.unwrap(),
        study_days_per_week: draft.study_days_per_week,
        hours_per_day: draft.hours_per_day,
        items,
    }
}

#[tokio::test]
async fn test_validated_draft_round_trips_through_persistence() {
    let repo = seeded_repo();
    let draft = fully_allocated_draft("Rust básico");
    assert!(validate_draft(&draft).is_valid);

    let created = services::create_schedule(&repo, submission_payload(&draft))
        .await
        .unwrap();
    assert_eq!(created.title, "Rust básico");
    assert_eq!(created.study_days_per_week, 5);
    assert_eq!(created.hours_per_day, 2);

    let stored = services::get_schedule_with_items(&repo, created.id)
        .await
        .unwrap();
    assert_eq!(stored.schedule.id, created.id);
    assert_eq!(stored.items.len(), 3);

    // Items come back in calendar order, each carrying its lesson.
    let titles: Vec<&str> = stored
        .items
        .iter()
        .map(|item| item.lesson.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Introdução", "Ownership", "Structs"]);
    assert!(stored.items.iter().all(|item| !item.completed));
    assert!(stored
        .items
        .windows(2)
        .all(|pair| pair[0].scheduled_date <= pair[1].scheduled_date));
}

#[tokio::test]
async fn test_stale_catalog_reference_persists_nothing() {
    let repo = seeded_repo();
    let draft = fully_allocated_draft("Plano com aula removida");

    // The catalog changed between drafting and submitting: lesson 2 is gone
    // from the repo but still placed in the draft.
    repo.remove_lesson(LessonId::new(2));
    assert!(validate_draft(&draft).is_valid);

    let err = services::create_schedule(&repo, submission_payload(&draft))
        .await
        .unwrap_err();
    match err {
        RepositoryError::NotFound { message, .. } => {
            assert_eq!(message, "Lessons not found: 2");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    // The failed submission left nothing behind.
    assert_eq!(repo.schedule_count(), 0);
    assert_eq!(repo.item_count(), 0);
    assert!(services::list_schedules(&repo).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_completion_lifecycle_over_persisted_plan() {
    let repo = seeded_repo();
    let created = services::create_schedule(
        &repo,
        submission_payload(&fully_allocated_draft("Plano de revisão")),
    )
    .await
    .unwrap();

    let stored = services::get_schedule_with_items(&repo, created.id)
        .await
        .unwrap();
    let first = &stored.items[0];

    // Done, then undone again.
    let updated = services::set_item_completed(&repo, created.id, first.id, true)
        .await
        .unwrap();
    assert!(updated.completed);
    assert!(updated.updated_at >= first.updated_at);

    let updated = services::set_item_completed(&repo, created.id, first.id, false)
        .await
        .unwrap();
    assert!(!updated.completed);

    // Only the toggled item ever changed.
    let stored = services::get_schedule_with_items(&repo, created.id)
        .await
        .unwrap();
    assert!(stored.items.iter().all(|item| !item.completed));
}

#[tokio::test]
async fn test_item_completion_is_scoped_to_its_schedule() {
    let repo = seeded_repo();
    let first = services::create_schedule(
        &repo,
        submission_payload(&fully_allocated_draft("Primeiro plano")),
    )
    .await
    .unwrap();
    let second = services::create_schedule(
        &repo,
        submission_payload(&fully_allocated_draft("Segundo plano")),
    )
    .await
    .unwrap();

    let items_of_first = services::get_schedule_with_items(&repo, first.id)
        .await
        .unwrap()
        .items;

    // Patching an item through the wrong schedule id must not touch it.
    let err = services::set_item_completed(&repo, second.id, items_of_first[0].id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let stored = services::get_schedule_with_items(&repo, first.id)
        .await
        .unwrap();
    assert!(!stored.items[0].completed);
}

#[tokio::test]
async fn test_deleting_one_plan_leaves_others_intact() {
    let repo = seeded_repo();
    let first = services::create_schedule(
        &repo,
        submission_payload(&fully_allocated_draft("Fica")),
    )
    .await
    .unwrap();
    let second = services::create_schedule(
        &repo,
        submission_payload(&fully_allocated_draft("Sai")),
    )
    .await
    .unwrap();
    assert_eq!(repo.item_count(), 6);

    services::delete_schedule(&repo, second.id).await.unwrap();

    let remaining = services::list_schedules(&repo).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, first.id);
    assert_eq!(repo.item_count(), 3);

    // Deleting again is a user-visible 404, not silent success.
    let err = services::delete_schedule(&repo, second.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_plans_list_newest_first_across_submissions() {
    let repo = seeded_repo();
    for title in ["Primeiro", "Segundo", "Terceiro"] {
        services::create_schedule(&repo, submission_payload(&fully_allocated_draft(title)))
            .await
            .unwrap();
    }

    let titles: Vec<String> = services::list_schedules(&repo)
        .await
        .unwrap()
        .into_iter()
        .map(|schedule| schedule.title)
        .collect();
    assert_eq!(titles, vec!["Terceiro", "Segundo", "Primeiro"]);
}

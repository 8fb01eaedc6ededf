//! Tests for the service layer, run against the in-memory repository.

use crate::api::{CourseId, Lesson, LessonId, ScheduleId, ScheduleItemId, SectionId};
use crate::db::repositories::LocalRepository;
use crate::db::repository::RepositoryError;
use crate::db::services::{
    create_schedule, delete_schedule, get_schedule_with_items, health_check, list_schedules,
    set_item_completed, CreateScheduleInput, CreateScheduleItemInput,
};

fn lesson(id: i64, section_id: i64, position: i32, title: &str) -> Lesson {
    Lesson {
        id: LessonId::new(id),
        section_id: SectionId::new(section_id),
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        position,
        video_duration_minutes: Some(30),
    }
}

fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_lesson(lesson(1, 10, 1, "Introdução"));
    repo.insert_lesson(lesson(2, 10, 2, "Variáveis"));
    repo.insert_lesson(lesson(3, 11, 1, "Funções"));
    repo
}

fn item_input(lesson_id: i64, date: &str, time: &str) -> CreateScheduleItemInput {
    CreateScheduleItemInput {
        lesson_id: LessonId::new(lesson_id),
        scheduled_date: date.parse().unwrap(),
        start_time: time.parse().unwrap(),
        duration_minutes: 60,
    }
}

fn plan_input(title: &str, items: Vec<CreateScheduleItemInput>) -> CreateScheduleInput {
    CreateScheduleInput {
        title: title.to_string(),
        description: None,
        course_id: Some(CourseId::new(7)),
        start_date: "2025-03-01".parse().unwrap(),
        end_date: "2025-03-31".parse().unwrap(),
        study_days_per_week: 5,
        hours_per_day: 2,
        items,
    }
}

#[tokio::test]
async fn create_schedule_rejects_empty_items() {
    let repo = seeded_repo();

    let err = create_schedule(&repo, plan_input("Plano", vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert!(err
        .to_string()
        .contains("At least one lesson must be scheduled"));
    assert_eq!(list_schedules(&repo).await.unwrap().len(), 0);
}

#[tokio::test]
async fn create_schedule_reports_all_missing_lessons() {
    let repo = seeded_repo();
    let items = vec![
        item_input(1, "2025-03-03", "09:00"),
        item_input(42, "2025-03-04", "09:00"),
        item_input(99, "2025-03-05", "09:00"),
    ];

    let err = create_schedule(&repo, plan_input("Plano", items))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert!(err.to_string().contains("Lessons not found: 42, 99"));
    assert_eq!(repo.schedule_count(), 0);
    assert_eq!(repo.item_count(), 0);
}

#[tokio::test]
async fn create_schedule_rejects_blank_title() {
    let repo = seeded_repo();
    let items = vec![item_input(1, "2025-03-03", "09:00")];

    let err = create_schedule(&repo, plan_input("   ", items))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert!(err.to_string().contains("Schedule title cannot be empty"));
    assert_eq!(repo.schedule_count(), 0);
}

#[tokio::test]
async fn create_schedule_rejects_inverted_dates() {
    let repo = seeded_repo();
    let mut input = plan_input("Plano", vec![item_input(1, "2025-03-03", "09:00")]);
    input.start_date = "2025-03-31".parse().unwrap();
    input.end_date = "2025-03-01".parse().unwrap();

    let err = create_schedule(&repo, input).await.unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert!(err
        .to_string()
        .contains("Start date must be before end date"));
}

#[tokio::test]
async fn create_schedule_persists_schedule_and_items() {
    let repo = seeded_repo();
    let items = vec![
        item_input(1, "2025-03-03", "09:00"),
        item_input(2, "2025-03-05", "14:30"),
    ];

    let schedule = create_schedule(&repo, plan_input("Python em 30 dias", items))
        .await
        .unwrap();

    assert!(schedule.id.value() > 0);
    assert_eq!(schedule.title, "Python em 30 dias");
    assert_eq!(schedule.study_days_per_week, 5);
    assert_eq!(schedule.hours_per_day, 2);
    assert_eq!(repo.schedule_count(), 1);
    assert_eq!(repo.item_count(), 2);

    let stored = get_schedule_with_items(&repo, schedule.id).await.unwrap();
    assert_eq!(stored.items.len(), 2);
    assert!(stored.items.iter().all(|item| !item.completed));
}

#[tokio::test]
async fn get_schedule_with_items_enriches_and_orders_items() {
    let repo = seeded_repo();
    // Submitted out of calendar order on purpose.
    let items = vec![
        item_input(3, "2025-03-10", "10:00"),
        item_input(1, "2025-03-03", "09:00"),
        item_input(2, "2025-03-05", "14:30"),
    ];
    let schedule = create_schedule(&repo, plan_input("Plano", items))
        .await
        .unwrap();

    let stored = get_schedule_with_items(&repo, schedule.id).await.unwrap();

    let titles: Vec<&str> = stored
        .items
        .iter()
        .map(|item| item.lesson.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Introdução", "Variáveis", "Funções"]);
    assert!(stored
        .items
        .windows(2)
        .all(|pair| pair[0].scheduled_date <= pair[1].scheduled_date));
}

#[tokio::test]
async fn get_schedule_with_items_unknown_id_is_not_found() {
    let repo = seeded_repo();

    let err = get_schedule_with_items(&repo, ScheduleId::new(999))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert!(err.to_string().contains("Schedule not found"));
}

#[tokio::test]
async fn get_schedule_with_items_dangling_lesson_is_internal_error() {
    let repo = seeded_repo();
    let schedule = create_schedule(
        &repo,
        plan_input("Plano", vec![item_input(1, "2025-03-03", "09:00")]),
    )
    .await
    .unwrap();

    repo.remove_lesson(LessonId::new(1));
    let err = get_schedule_with_items(&repo, schedule.id)
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::InternalError { .. }));
}

#[tokio::test]
async fn delete_schedule_cascades_to_items() {
    let repo = seeded_repo();
    let schedule = create_schedule(
        &repo,
        plan_input(
            "Plano",
            vec![
                item_input(1, "2025-03-03", "09:00"),
                item_input(2, "2025-03-05", "14:30"),
            ],
        ),
    )
    .await
    .unwrap();
    assert_eq!(repo.item_count(), 2);

    delete_schedule(&repo, schedule.id).await.unwrap();

    assert!(!repo.has_schedule(schedule.id));
    assert_eq!(repo.item_count(), 0);
    let err = get_schedule_with_items(&repo, schedule.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn delete_schedule_unknown_id_is_not_found() {
    let repo = seeded_repo();

    let err = delete_schedule(&repo, ScheduleId::new(404)).await.unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert!(err.to_string().contains("Schedule not found"));
}

#[tokio::test]
async fn set_item_completed_round_trips() {
    let repo = seeded_repo();
    let schedule = create_schedule(
        &repo,
        plan_input("Plano", vec![item_input(1, "2025-03-03", "09:00")]),
    )
    .await
    .unwrap();
    let stored = get_schedule_with_items(&repo, schedule.id).await.unwrap();
    let item_id = stored.items[0].id;

    let done = set_item_completed(&repo, schedule.id, item_id, true)
        .await
        .unwrap();
    assert!(done.completed);

    let undone = set_item_completed(&repo, schedule.id, item_id, false)
        .await
        .unwrap();
    assert!(!undone.completed);
}

#[tokio::test]
async fn set_item_completed_checks_schedule_ownership() {
    let repo = seeded_repo();
    let first = create_schedule(
        &repo,
        plan_input("Primeiro", vec![item_input(1, "2025-03-03", "09:00")]),
    )
    .await
    .unwrap();
    let second = create_schedule(
        &repo,
        plan_input("Segundo", vec![item_input(2, "2025-03-05", "14:30")]),
    )
    .await
    .unwrap();
    let first_item = get_schedule_with_items(&repo, first.id).await.unwrap().items[0].id;

    let err = set_item_completed(&repo, second.id, first_item, true)
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn set_item_completed_unknown_item_is_not_found() {
    let repo = seeded_repo();
    let schedule = create_schedule(
        &repo,
        plan_input("Plano", vec![item_input(1, "2025-03-03", "09:00")]),
    )
    .await
    .unwrap();

    let err = set_item_completed(&repo, schedule.id, ScheduleItemId::new(999), true)
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn list_schedules_newest_first() {
    let repo = seeded_repo();
    create_schedule(
        &repo,
        plan_input("Primeiro", vec![item_input(1, "2025-03-03", "09:00")]),
    )
    .await
    .unwrap();
    create_schedule(
        &repo,
        plan_input("Segundo", vec![item_input(2, "2025-03-05", "14:30")]),
    )
    .await
    .unwrap();

    let schedules = list_schedules(&repo).await.unwrap();

    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0].title, "Segundo");
    assert_eq!(schedules[1].title, "Primeiro");
}

#[tokio::test]
async fn health_check_reflects_repository_state() {
    let repo = LocalRepository::new();
    assert!(health_check(&repo).await.unwrap());

    repo.set_healthy(false);
    assert!(!health_check(&repo).await.unwrap());

    let err = list_schedules(&repo).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
}

//! Tests for repository error types and their structured context.

use studyplan_rust::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

#[test]
fn test_context_builder_collects_all_fields() {
    let ctx = ErrorContext::new("create_schedule")
        .with_entity("schedule_item")
        .with_entity_id(42)
        .with_details("chunk insert failed")
        .retryable();

    assert_eq!(ctx.operation.as_deref(), Some("create_schedule"));
    assert_eq!(ctx.entity.as_deref(), Some("schedule_item"));
    assert_eq!(ctx.entity_id.as_deref(), Some("42"));
    assert_eq!(ctx.details.as_deref(), Some("chunk insert failed"));
    assert!(ctx.retryable);
}

#[test]
fn test_context_default_is_empty() {
    let ctx = ErrorContext::default();
    assert!(ctx.operation.is_none());
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

#[test]
fn test_context_display_lists_set_fields() {
    let ctx = ErrorContext::new("find_lesson")
        .with_entity("lesson")
        .with_entity_id(7)
        .retryable();

    let rendered = ctx.to_string();
    assert!(rendered.contains("operation=find_lesson"));
    assert!(rendered.contains("entity=lesson"));
    assert!(rendered.contains("id=7"));
    assert!(rendered.contains("retryable=true"));
    assert!(!rendered.contains("details="));
}

#[test]
fn test_constructors_set_display_prefix() {
    let cases: Vec<(RepositoryError, &str)> = vec![
        (RepositoryError::connection("pool exhausted"), "Connection error"),
        (RepositoryError::query("bad sql"), "Query error"),
        (RepositoryError::not_found("Schedule not found"), "Not found"),
        (RepositoryError::validation("empty title"), "Data validation error"),
        (RepositoryError::configuration("missing url"), "Configuration error"),
        (RepositoryError::internal("bug"), "Internal error"),
        (RepositoryError::transaction("rollback"), "Transaction error"),
        (RepositoryError::timeout("too slow"), "Timeout error"),
    ];

    for (err, prefix) in cases {
        let rendered = err.to_string();
        assert!(
            rendered.starts_with(prefix),
            "{rendered:?} does not start with {prefix:?}"
        );
    }
}

#[test]
fn test_connection_and_timeout_are_retryable_by_default() {
    assert!(RepositoryError::connection("transient").is_retryable());
    assert!(RepositoryError::timeout("slow").is_retryable());

    assert!(!RepositoryError::query("syntax").is_retryable());
    assert!(!RepositoryError::not_found("gone").is_retryable());
    assert!(!RepositoryError::validation("bad").is_retryable());
    assert!(!RepositoryError::internal("bug").is_retryable());
}

#[test]
fn test_query_error_can_opt_into_retry() {
    let err = RepositoryError::query_with_context(
        "serialization failure",
        ErrorContext::default().retryable(),
    );
    assert!(err.is_retryable());
}

#[test]
fn test_with_operation_tags_the_context() {
    let err = RepositoryError::not_found("Schedule not found").with_operation("delete_schedule");
    assert_eq!(err.context().operation.as_deref(), Some("delete_schedule"));
    assert!(err.to_string().contains("operation=delete_schedule"));
}

#[test]
fn test_message_strips_context_suffix() {
    // Display carries the full context; message() is what API responses use.
    let err = RepositoryError::not_found("Lessons not found: 42, 99")
        .with_operation("create_schedule");

    assert_eq!(err.message(), "Lessons not found: 42, 99");
    assert!(err.to_string().contains("operation=create_schedule"));
    assert!(!err.message().contains("operation="));
}

#[test]
fn test_context_survives_construction() {
    let err = RepositoryError::internal_with_context(
        "stored start time is invalid",
        ErrorContext::new("get_items_for_schedule")
            .with_entity("schedule_item")
            .with_entity_id(3),
    );

    let ctx = err.context();
    assert_eq!(ctx.entity.as_deref(), Some("schedule_item"));
    assert_eq!(ctx.entity_id.as_deref(), Some("3"));
}

#[test]
fn test_result_alias_carries_repository_error() {
    fn lookup(found: bool) -> RepositoryResult<i64> {
        if found {
            Ok(7)
        } else {
            Err(RepositoryError::not_found("Schedule not found"))
        }
    }

    assert_eq!(lookup(true).unwrap(), 7);
    assert!(matches!(
        lookup(false),
        Err(RepositoryError::NotFound { .. })
    ));
}

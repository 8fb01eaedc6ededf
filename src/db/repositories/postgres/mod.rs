//! Postgres repository implementation using Diesel.
//!
//! This module implements the catalog and schedule repository traits against
//! a Postgres database. Lessons live in a read-mostly catalog table; each
//! schedule owns its items through a cascading foreign key.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;

use crate::api::{
    Lesson, LessonId, NewSchedule, NewScheduleItem, Schedule, ScheduleId, ScheduleItem,
    ScheduleItemId, SectionId, StartTime,
};
use crate::db::repository::{
    CatalogRepository, ErrorContext, RepositoryError, RepositoryResult, ScheduleRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// This repository implementation provides:
/// - Connection pooling with configurable limits
/// - Automatic retry for transient failures
/// - Health monitoring and statistics
/// - Automatic schema migrations
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    ///
    /// Performs a simple query to verify connectivity.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }

    /// Insert or refresh one catalog lesson.
    ///
    /// Catalog rows mirror an external course service, so callers supply the
    /// lesson id and a conflicting row is updated in place.
    pub async fn upsert_lesson(&self, lesson: Lesson) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let row = NewLessonRow {
                lesson_id: lesson.id.value(),
                section_id: lesson.section_id.value(),
                title: lesson.title.clone(),
                slug: lesson.slug.clone(),
                position: lesson.position,
                video_duration_minutes: lesson.video_duration_minutes.map(|m| m as i32),
            };

            diesel::insert_into(lessons::table)
                .values(&row)
                .on_conflict(lessons::lesson_id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(map_diesel_error)?;

            Ok(())
        })
        .await
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn row_to_lesson(row: LessonRow) -> Lesson {
    Lesson {
        id: LessonId::new(row.lesson_id),
        section_id: SectionId::new(row.section_id),
        title: row.title,
        slug: row.slug,
        position: row.position,
        video_duration_minutes: row.video_duration_minutes.and_then(|m| u32::try_from(m).ok()),
    }
}

fn row_to_schedule(row: ScheduleRow) -> Schedule {
    Schedule {
        id: ScheduleId::new(row.schedule_id),
        title: row.title,
        description: row.description,
        course_id: row.course_id.map(Into::into),
        start_date: row.start_date,
        end_date: row.end_date,
        study_days_per_week: row.study_days_per_week as u8,
        hours_per_day: row.hours_per_day as u8,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn row_to_item(row: ScheduleItemRow) -> RepositoryResult<ScheduleItem> {
    let start_time = StartTime::parse(&row.start_time).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Stored start time is invalid: {}", e),
            ErrorContext::new("row_to_item")
                .with_entity("schedule_item")
                .with_entity_id(row.item_id),
        )
    })?;

    Ok(ScheduleItem {
        id: ScheduleItemId::new(row.item_id),
        schedule_id: ScheduleId::new(row.schedule_id),
        lesson_id: LessonId::new(row.lesson_id),
        scheduled_date: row.scheduled_date,
        start_time,
        duration_minutes: row.duration_minutes as u32,
        completed: row.completed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn item_to_new_row(schedule_id: i64, item: &NewScheduleItem) -> NewScheduleItemRow {
    NewScheduleItemRow {
        schedule_id,
        lesson_id: item.lesson_id.value(),
        scheduled_date: item.scheduled_date,
        start_time: item.start_time.to_string(),
        duration_minutes: item.duration_minutes as i32,
        completed: false,
    }
}

#[async_trait]
impl CatalogRepository for PostgresRepository {
    async fn find_lesson(&self, lesson_id: LessonId) -> RepositoryResult<Option<Lesson>> {
        self.with_conn(move |conn| {
            let row = lessons::table
                .filter(lessons::lesson_id.eq(lesson_id.value()))
                .select(LessonRow::as_select())
                .first::<LessonRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;

            Ok(row.map(row_to_lesson))
        })
        .await
    }

    async fn list_lessons_by_section(
        &self,
        section_id: SectionId,
    ) -> RepositoryResult<Vec<Lesson>> {
        self.with_conn(move |conn| {
            let rows = lessons::table
                .filter(lessons::section_id.eq(section_id.value()))
                .select(LessonRow::as_select())
                .order(lessons::position.asc())
                .then_order_by(lessons::lesson_id.asc())
                .load::<LessonRow>(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().map(row_to_lesson).collect())
        })
        .await
    }
}

#[async_trait]
impl ScheduleRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_schedule_with_items(
        &self,
        schedule: NewSchedule,
        items: Vec<NewScheduleItem>,
    ) -> RepositoryResult<Schedule> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let new_schedule = NewScheduleRow {
                    title: schedule.title.clone(),
                    description: schedule.description.clone(),
                    course_id: schedule.course_id.map(|id| id.value()),
                    start_date: schedule.start_date,
                    end_date: schedule.end_date,
                    study_days_per_week: schedule.study_days_per_week as i16,
                    hours_per_day: schedule.hours_per_day as i16,
                };

                let inserted: ScheduleRow = diesel::insert_into(schedules::table)
                    .values(&new_schedule)
                    .returning(ScheduleRow::as_returning())
                    .get_result(tx)
                    .map_err(map_diesel_error)?;

                let item_rows: Vec<NewScheduleItemRow> = items
                    .iter()
                    .map(|item| item_to_new_row(inserted.schedule_id, item))
                    .collect();

                if !item_rows.is_empty() {
                    // Insert items in chunks to stay clear of the Postgres
                    // prepared-statement parameter limit on large plans.
                    let chunk_size: usize = 1000;
                    for chunk in item_rows.chunks(chunk_size) {
                        diesel::insert_into(schedule_items::table)
                            .values(chunk)
                            .execute(tx)
                            .map_err(map_diesel_error)?;
                    }
                }

                Ok(row_to_schedule(inserted))
            })
        })
        .await
    }

    async fn get_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Option<Schedule>> {
        self.with_conn(move |conn| {
            let row = schedules::table
                .filter(schedules::schedule_id.eq(schedule_id.value()))
                .select(ScheduleRow::as_select())
                .first::<ScheduleRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;

            Ok(row.map(row_to_schedule))
        })
        .await
    }

    async fn list_schedules(&self) -> RepositoryResult<Vec<Schedule>> {
        self.with_conn(|conn| {
            let rows = schedules::table
                .select(ScheduleRow::as_select())
                .order(schedules::created_at.desc())
                .then_order_by(schedules::schedule_id.desc())
                .load::<ScheduleRow>(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().map(row_to_schedule).collect())
        })
        .await
    }

    async fn get_items_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<Vec<ScheduleItem>> {
        self.with_conn(move |conn| {
            let rows = schedule_items::table
                .filter(schedule_items::schedule_id.eq(schedule_id.value()))
                .select(ScheduleItemRow::as_select())
                .order(schedule_items::scheduled_date.asc())
                // HH:mm strings sort chronologically
                .then_order_by(schedule_items::start_time.asc())
                .then_order_by(schedule_items::item_id.asc())
                .load::<ScheduleItemRow>(conn)
                .map_err(map_diesel_error)?;

            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                items.push(row_to_item(row)?);
            }
            Ok(items)
        })
        .await
    }

    async fn set_item_completed(
        &self,
        schedule_id: ScheduleId,
        item_id: ScheduleItemId,
        completed: bool,
    ) -> RepositoryResult<ScheduleItem> {
        self.with_conn(move |conn| {
            let row = diesel::update(
                schedule_items::table
                    .filter(schedule_items::item_id.eq(item_id.value()))
                    .filter(schedule_items::schedule_id.eq(schedule_id.value())),
            )
            .set((
                schedule_items::completed.eq(completed),
                schedule_items::updated_at.eq(diesel::dsl::now),
            ))
            .returning(ScheduleItemRow::as_returning())
            .get_result::<ScheduleItemRow>(conn)
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| RepositoryError::not_found("Schedule item not found"))?;

            row_to_item(row)
        })
        .await
    }

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::delete(
                    schedule_items::table
                        .filter(schedule_items::schedule_id.eq(schedule_id.value())),
                )
                .execute(tx)
                .map_err(map_diesel_error)?;

                diesel::delete(
                    schedules::table.filter(schedules::schedule_id.eq(schedule_id.value())),
                )
                .execute(tx)
                .map_err(map_diesel_error)?;

                Ok(())
            })
        })
        .await
    }
}

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, title, description, due_date, status, priority, owner_id, created_at, updated_at";

/// Creates a new task owned by the authenticated user.
///
/// The owner is always the access token's `id` claim; it cannot be supplied
/// or overridden through the body.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.id);

    let result = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, due_date, status, priority, owner_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(task.title)
    .bind(task.description)
    .bind(task.due_date)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.owner_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Lists all tasks owned by the authenticated user.
///
/// Optional `sortBy` (title | dueDate | status | priority) and `sortOrder`
/// (ascending | descending) query parameters control ordering; `sortOrder`
/// alone sorts by priority, `sortBy` alone is ascending. Responds with
/// `{task_count, tasks}`.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let mut sql = format!("SELECT {} FROM tasks WHERE owner_id = $1", TASK_COLUMNS);
    match query_params.order_clause() {
        Some(order) => sql.push_str(&format!(" ORDER BY {}", order)),
        None => sql.push_str(" ORDER BY created_at DESC"),
    }

    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(user.id)
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "task_count": tasks.len(), "tasks": tasks })))
}

/// Lists the authenticated user's tasks matching the given filters exactly.
///
/// Supported filters: `title`, `dueDate`, `status`, `priority`; the same
/// sorting parameters as the plain listing apply.
#[get("/filter")]
pub async fn filter_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    // Conditions are appended with numbered placeholders; values are always
    // bound, never interpolated.
    let mut sql = format!("SELECT {} FROM tasks WHERE owner_id = $1", TASK_COLUMNS);
    let mut param_count = 2;

    if query_params.title.is_some() {
        sql.push_str(&format!(" AND title = ${}", param_count));
        param_count += 1;
    }
    if query_params.due_date.is_some() {
        sql.push_str(&format!(" AND due_date = ${}", param_count));
        param_count += 1;
    }
    if query_params.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query_params.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
    }

    match query_params.order_clause() {
        Some(order) => sql.push_str(&format!(" ORDER BY {}", order)),
        None => sql.push_str(" ORDER BY created_at DESC"),
    }

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(user.id);

    if let Some(title) = &query_params.title {
        query_builder = query_builder.bind(title);
    }
    if let Some(due_date) = query_params.due_date {
        query_builder = query_builder.bind(due_date);
    }
    if let Some(status) = query_params.status {
        query_builder = query_builder.bind(status);
    }
    if let Some(priority) = query_params.priority {
        query_builder = query_builder.bind(priority);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(json!({ "task_count": tasks.len(), "tasks": tasks })))
}

/// Retrieves a single task by id. The task must be owned by the
/// authenticated user; anything else is "Task not found".
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates a task owned by the authenticated user. Ownership is not
/// modifiable; the owner scope is part of the UPDATE predicate.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let template = Task::new(task_data.into_inner(), user.id);

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks \
         SET title = $1, description = $2, due_date = $3, status = $4, priority = $5, \
             updated_at = now() \
         WHERE id = $6 AND owner_id = $7 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&template.title)
    .bind(&template.description)
    .bind(template.due_date)
    .bind(template.status)
    .bind(template.priority)
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task owned by the authenticated user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let deleted = sqlx::query_scalar::<_, String>(
        "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING title",
    )
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match deleted {
        Some(title) => Ok(HttpResponse::Ok()
            .json(json!({ "message": format!("Task '{}' deleted successfully", title) }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

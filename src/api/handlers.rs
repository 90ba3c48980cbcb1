use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::ApiError;
use crate::db::Database;
use crate::models::*;

/// Optional JSON body. A request without a JSON content type yields the
/// default input; a JSON body that fails to parse is still rejected.
type Payload<T> = Result<Option<Json<T>>, JsonRejection>;

fn body_or_default<T: Default>(payload: Payload<T>) -> Result<T, ApiError> {
    Ok(payload?.map(|Json(input)| input).unwrap_or_default())
}

// Tasks

pub async fn list_tasks(State(db): State<Database>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(db.list_all::<Task>()?))
}

pub async fn create_task(
    State(db): State<Database>,
    payload: Payload<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let input = body_or_default(payload)?;
    let task = db.create(&Task::new(input))?;
    tracing::debug!("Created task {}", task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    db.find_by_field::<Task>("id", &id)?
        .map(Json)
        .ok_or(ApiError::NotFound(Task::NAME))
}

pub async fn update_task(
    State(db): State<Database>,
    Path(id): Path<String>,
    payload: Payload<UpdateTaskInput>,
) -> Result<Json<Task>, ApiError> {
    let input = body_or_default(payload)?;
    db.update_by_field::<Task, _>("id", &id, &input)?
        .map(Json)
        .ok_or(ApiError::NotFound(Task::NAME))
}

pub async fn delete_task(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    db.delete_by_field::<Task>("id", &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Assignees

pub async fn list_assignees(
    State(db): State<Database>,
) -> Result<Json<Vec<Assignee>>, ApiError> {
    Ok(Json(db.list_all::<Assignee>()?))
}

pub async fn create_assignee(
    State(db): State<Database>,
    payload: Payload<CreateAssigneeInput>,
) -> Result<(StatusCode, Json<Assignee>), ApiError> {
    let input = body_or_default(payload)?;
    let assignee = db.create(&Assignee::new(input))?;
    tracing::debug!("Created assignee {}", assignee.id);
    Ok((StatusCode::CREATED, Json(assignee)))
}

pub async fn get_assignee(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Assignee>, ApiError> {
    db.find_by_field::<Assignee>("id", &id)?
        .map(Json)
        .ok_or(ApiError::NotFound(Assignee::NAME))
}

pub async fn update_assignee(
    State(db): State<Database>,
    Path(id): Path<String>,
    payload: Payload<UpdateAssigneeInput>,
) -> Result<Json<Assignee>, ApiError> {
    let input = body_or_default(payload)?;
    db.update_by_field::<Assignee, _>("id", &id, &input)?
        .map(Json)
        .ok_or(ApiError::NotFound(Assignee::NAME))
}

pub async fn delete_assignee(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    db.delete_by_field::<Assignee>("id", &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Assignments

pub async fn list_assignments(
    State(db): State<Database>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    Ok(Json(db.list_all::<Assignment>()?))
}

/// Links a task to an assignee. Neither side is checked for existence and
/// repeated calls create independent edges.
pub async fn assign(
    State(db): State<Database>,
    Path((task_id, assignee_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let assignment = db.create(&Assignment::new(task_id, assignee_id))?;
    tracing::debug!(
        "Assigned {} to task {}",
        assignment.assignee_id,
        assignment.task_id
    );
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn unassign(
    State(db): State<Database>,
    Path((task_id, assignee_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    db.delete_by_fields::<Assignment>(&[
        ("taskId", task_id.as_str()),
        ("assigneeId", assignee_id.as_str()),
    ])?;
    Ok(StatusCode::NO_CONTENT)
}

// Relationship traversal

pub async fn get_assignee_tasks(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(db.tasks_for_assignee(&id)?))
}

pub async fn get_task_assignees(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Assignee>>, ApiError> {
    Ok(Json(db.assignees_for_task(&id)?))
}

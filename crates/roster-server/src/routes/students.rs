use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use roster_core::{NewStudent, StoreError, StudentId, StudentPatch};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student).get(list_students))
        .route("/students/statistics", get(get_statistics))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

const MISSING_FIELDS: &str = "Missing required fields: firstName, lastName, dateOfBirth, gpa, email";
const EMPTY_NAME: &str = "firstName and lastName must not be empty";

/// Success envelope shared by every student endpoint.
#[derive(Serialize)]
struct DataResponse<T> {
    message: &'static str,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl<T: Serialize> DataResponse<T> {
    fn new(message: &'static str, data: T) -> Self {
        Self {
            message,
            data,
            count: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    gpa: Option<f64>,
    email: Option<String>,
}

impl CreateStudentRequest {
    fn into_new_student(self) -> Result<NewStudent, ApiError> {
        let (
            Some(first_name),
            Some(last_name),
            Some(date_of_birth),
            Some(gpa),
            Some(email),
        ) = (
            non_empty(self.first_name),
            non_empty(self.last_name),
            non_empty(self.date_of_birth),
            self.gpa,
            non_empty(self.email),
        )
        else {
            return Err(ApiError::bad_request(MISSING_FIELDS));
        };

        Ok(NewStudent {
            first_name,
            last_name,
            date_of_birth: parse_date_of_birth(&date_of_birth)?,
            gpa,
            email,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    gpa: Option<f64>,
    email: Option<String>,
}

impl UpdateStudentRequest {
    fn into_patch(self) -> Result<StudentPatch, ApiError> {
        let blank = |name: &Option<String>| name.as_deref().is_some_and(str::is_empty);
        if blank(&self.first_name) || blank(&self.last_name) {
            return Err(ApiError::bad_request(EMPTY_NAME));
        }

        let date_of_birth = self
            .date_of_birth
            .as_deref()
            .map(parse_date_of_birth)
            .transpose()?;

        Ok(StudentPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth,
            gpa: self.gpa,
            email: self.email,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp.
fn parse_date_of_birth(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| ApiError::bad_request("Invalid date of birth format"))
}

/// Only whole non-negative integers name a student; `1.5` and `-1` are rejected
/// rather than truncated.
fn parse_id(raw: &str) -> Result<StudentId, ApiError> {
    raw.parse()
        .map(StudentId)
        .map_err(|_| ApiError::bad_request("Invalid student ID format"))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::bad_request("Invalid request body")
    })
}

async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let new = json_body(payload)?.into_new_student()?;
    let student = state.store.create(new)?;

    tracing::info!("Created student {}", student.id);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Student created successfully", student)),
    )
        .into_response())
}

async fn list_students(State(state): State<AppState>) -> Result<Response, ApiError> {
    let students = state.store.get_all()?;
    let count = students.len();

    Ok(Json(DataResponse {
        message: "Students retrieved successfully",
        data: students,
        count: Some(count),
    })
    .into_response())
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let student = state
        .store
        .get_by_id(id)?
        .ok_or(StoreError::NotFound(id))?;

    Ok(Json(DataResponse::new("Student retrieved successfully", student)).into_response())
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let patch = json_body(payload)?.into_patch()?;
    if patch.is_empty() {
        return Err(ApiError::bad_request(
            "At least one field must be provided for update",
        ));
    }

    let student = state.store.update(id, patch)?;

    tracing::info!("Updated student {}", student.id);
    Ok(Json(DataResponse::new("Student updated successfully", student)).into_response())
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let student = state.store.delete(id)?;

    tracing::info!("Deleted student {}", student.id);
    Ok(Json(DataResponse::new("Student deleted successfully", student)).into_response())
}

async fn get_statistics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let statistics = state.store.statistics()?;

    Ok(Json(DataResponse::new("Statistics retrieved successfully", statistics)).into_response())
}

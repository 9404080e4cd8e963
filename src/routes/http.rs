//! HTTP endpoint handlers. These are thin wrappers that forward to `AppState`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::Course;
use crate::error::CourseError;
use crate::protocol::{CourseRequest, ErrorOut, HealthOut};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(
    level = "info",
    skip(state, body),
    fields(request_id = %Uuid::new_v4(), topic = %body.topic, level = %body.level, days = body.days)
)]
pub async fn http_generate_course(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CourseRequest>,
) -> Result<Json<Course>, (StatusCode, Json<ErrorOut>)> {
    match state.generate_course(&body).await {
        Ok(course) => {
            info!(target: "course", tasks = course.tasks.len(), "HTTP course served");
            Ok(Json(course))
        }
        Err(e) => {
            let status = status_for(&e);
            error!(target: "course", %status, error = %e, "HTTP course generation failed");
            Err((status, Json(ErrorOut { detail: detail_for(&e) })))
        }
    }
}

fn status_for(e: &CourseError) -> StatusCode {
    match e {
        CourseError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        CourseError::Fallback(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Request errors are shown verbatim; internal failures get a generic message.
fn detail_for(e: &CourseError) -> String {
    match e {
        CourseError::InvalidRequest(v) => v.to_string(),
        CourseError::Fallback(_) => "Failed to generate course content. Please try again later.".into(),
    }
}

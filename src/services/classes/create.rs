use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::requests::CreateClassRequest,
    users::entities::UserRole,
};
use crate::services::{current_user, error_response, forbidden, storage_error};

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    mut class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    class_data.name = class_data.name.trim().to_string();
    if class_data.name.is_empty() || class_data.name.chars().count() > 100 {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Class name must be 1-100 characters",
        ));
    }

    match user.role {
        UserRole::Teacher => match class_data.teacher_id {
            Some(teacher_id) if teacher_id != user.id => {
                return Ok(forbidden("Teachers can only create classes for themselves"));
            }
            _ => class_data.teacher_id = Some(user.id),
        },
        UserRole::Admin => {
            let Some(teacher_id) = class_data.teacher_id else {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    "teacher_id is required when an admin creates a class",
                ));
            };

            match storage.get_user_by_id(teacher_id).await {
                Ok(Some(teacher)) if teacher.role == UserRole::Teacher => {}
                Ok(Some(_)) => {
                    return Ok(error_response(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::BadRequest,
                        "The specified user is not a teacher",
                    ));
                }
                Ok(None) => {
                    return Ok(error_response(
                        StatusCode::NOT_FOUND,
                        ErrorCode::UserNotFound,
                        "Teacher not found",
                    ));
                }
                Err(e) => return Ok(storage_error("Failed to get teacher", e)),
            }
        }
        UserRole::Student => return Ok(forbidden("Students cannot create classes")),
    }

    match storage.create_class(class_data).await {
        Ok(class) => {
            tracing::info!("Class {} created by user {}", class.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(storage_error("Class creation failed", e)),
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{SubjectService, normalize_name};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::CreateSubjectRequest};
use crate::services::{current_user, error_response, storage_error};
use crate::utils::validate::validate_subject_code;

pub async fn create_subject(
    service: &SubjectService,
    request: &HttpRequest,
    mut subject_data: CreateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    subject_data.code = subject_data.code.trim().to_uppercase();
    if let Err(msg) = validate_subject_code(&subject_data.code) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            msg,
        ));
    }

    subject_data.name = match normalize_name(&subject_data.name, 100) {
        Some(name) => name,
        None => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "Subject name must be 1-100 characters",
            ));
        }
    };

    match storage.get_subject_by_code(&subject_data.code).await {
        Ok(Some(_)) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::SubjectCodeAlreadyExists,
                "Subject code already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(storage_error("Failed to check subject code", e)),
    }

    match storage.create_subject(user.id, subject_data).await {
        Ok(subject) => Ok(HttpResponse::Created().json(ApiResponse::success(
            subject,
            "Subject created successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to create subject", e)),
    }
}

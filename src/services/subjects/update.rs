use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{SubjectService, load_subject, normalize_name};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::UpdateSubjectRequest};
use crate::services::{error_response, storage_error};
use crate::utils::validate::validate_subject_code;

pub async fn update_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    mut update_data: UpdateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(response) = load_subject(&storage, subject_id).await {
        return Ok(response);
    }

    if let Some(ref code) = update_data.code {
        let code = code.trim().to_uppercase();
        if let Err(msg) = validate_subject_code(&code) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                msg,
            ));
        }

        match storage.get_subject_by_code(&code).await {
            Ok(Some(existing)) if existing.id != subject_id => {
                return Ok(error_response(
                    StatusCode::CONFLICT,
                    ErrorCode::SubjectCodeAlreadyExists,
                    "Subject code already exists",
                ));
            }
            Ok(_) => {}
            Err(e) => return Ok(storage_error("Failed to check subject code", e)),
        }
        update_data.code = Some(code);
    }

    if let Some(ref name) = update_data.name {
        match normalize_name(name, 100) {
            Some(name) => update_data.name = Some(name),
            None => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    "Subject name must be 1-100 characters",
                ));
            }
        }
    }

    match storage.update_subject(subject_id, update_data).await {
        Ok(Some(subject)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subject,
            "Subject updated successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::SubjectNotFound,
            "Subject not found",
        )),
        Err(e) => Ok(storage_error("Failed to update subject", e)),
    }
}

//! 章节：嵌套在科目下

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use super::{SubjectService, load_subject, normalize_name};
use crate::models::{
    ApiResponse, ErrorCode,
    subjects::{
        entities::Chapter,
        requests::{CreateChapterRequest, UpdateChapterRequest},
        responses::ChapterListResponse,
    },
};
use crate::services::{error_response, storage_error};
use crate::storage::Storage;

fn invalid_chapter_name() -> HttpResponse {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::BadRequest,
        "Chapter name must be 1-100 characters",
    )
}

// 章节必须属于路径中的科目
async fn load_chapter(
    storage: &Arc<dyn Storage>,
    subject_id: i64,
    chapter_id: i64,
) -> Result<Chapter, HttpResponse> {
    match storage.get_chapter_by_id(chapter_id).await {
        Ok(Some(chapter)) if chapter.subject_id == subject_id => Ok(chapter),
        Ok(_) => Err(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ChapterNotFound,
            "Chapter not found",
        )),
        Err(e) => Err(storage_error("Failed to get chapter", e)),
    }
}

pub async fn list_chapters(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(response) = load_subject(&storage, subject_id).await {
        return Ok(response);
    }

    match storage.list_chapters(subject_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ChapterListResponse { items },
            "Chapter list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to retrieve chapter list", e)),
    }
}

pub async fn create_chapter(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    mut chapter_data: CreateChapterRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(response) = load_subject(&storage, subject_id).await {
        return Ok(response);
    }

    chapter_data.name = match normalize_name(&chapter_data.name, 100) {
        Some(name) => name,
        None => return Ok(invalid_chapter_name()),
    };

    match storage.create_chapter(subject_id, chapter_data).await {
        Ok(chapter) => Ok(HttpResponse::Created().json(ApiResponse::success(
            chapter,
            "Chapter created successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to create chapter", e)),
    }
}

pub async fn update_chapter(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    chapter_id: i64,
    mut update_data: UpdateChapterRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(response) = load_chapter(&storage, subject_id, chapter_id).await {
        return Ok(response);
    }

    if let Some(ref name) = update_data.name {
        match normalize_name(name, 100) {
            Some(name) => update_data.name = Some(name),
            None => return Ok(invalid_chapter_name()),
        }
    }

    match storage.update_chapter(chapter_id, update_data).await {
        Ok(Some(chapter)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            chapter,
            "Chapter updated successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ChapterNotFound,
            "Chapter not found",
        )),
        Err(e) => Ok(storage_error("Failed to update chapter", e)),
    }
}

pub async fn delete_chapter(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    chapter_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(response) = load_chapter(&storage, subject_id, chapter_id).await {
        return Ok(response);
    }

    match storage.delete_chapter(chapter_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Chapter deleted successfully",
        ))),
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ChapterNotFound,
            "Chapter not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete chapter", e)),
    }
}

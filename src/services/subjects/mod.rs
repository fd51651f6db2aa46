pub mod chapters;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::subjects::entities::Subject;
use crate::models::subjects::requests::{
    CreateChapterRequest, CreateSubjectRequest, SubjectListQuery, UpdateChapterRequest,
    UpdateSubjectRequest,
};
use crate::services::{error_response, storage_error};
use crate::storage::Storage;

super::define_service!(
    /// 科目与章节
    SubjectService
);

impl SubjectService {
    pub async fn list_subjects(
        &self,
        request: &HttpRequest,
        query: SubjectListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_subjects(self, request, query).await
    }

    pub async fn create_subject(
        &self,
        request: &HttpRequest,
        subject_data: CreateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_subject(self, request, subject_data).await
    }

    pub async fn get_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_subject(self, request, subject_id).await
    }

    pub async fn update_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        update_data: UpdateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_subject(self, request, subject_id, update_data).await
    }

    pub async fn delete_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_subject(self, request, subject_id).await
    }

    pub async fn list_chapters(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        chapters::list_chapters(self, request, subject_id).await
    }

    pub async fn create_chapter(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        chapter_data: CreateChapterRequest,
    ) -> ActixResult<HttpResponse> {
        chapters::create_chapter(self, request, subject_id, chapter_data).await
    }

    pub async fn update_chapter(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        chapter_id: i64,
        update_data: UpdateChapterRequest,
    ) -> ActixResult<HttpResponse> {
        chapters::update_chapter(self, request, subject_id, chapter_id, update_data).await
    }

    pub async fn delete_chapter(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        chapter_id: i64,
    ) -> ActixResult<HttpResponse> {
        chapters::delete_chapter(self, request, subject_id, chapter_id).await
    }
}

pub(crate) async fn load_subject(
    storage: &Arc<dyn Storage>,
    subject_id: i64,
) -> Result<Subject, HttpResponse> {
    match storage.get_subject_by_id(subject_id).await {
        Ok(Some(subject)) => Ok(subject),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::SubjectNotFound,
            "Subject not found",
        )),
        Err(e) => Err(storage_error("Failed to get subject", e)),
    }
}

/// 名称校验：去除首尾空白后 1..=max 个字符
pub(crate) fn normalize_name(name: &str, max: usize) -> Option<String> {
    let name = name.trim();
    (!name.is_empty() && name.chars().count() <= max).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  数据结构 ", 20), Some("数据结构".to_string()));
        assert_eq!(normalize_name("   ", 20), None);
        assert_eq!(normalize_name("abcdef", 5), None);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ResultService;
use crate::models::{
    ApiResponse,
    results::{
        entities::ExamResult,
        requests::ResultListQuery,
        responses::{ResultListItem, ResultListResponse},
    },
    users::entities::UserBrief,
};
use crate::services::exams::load_managed_exam;
use crate::services::{current_user, storage_error};
use crate::storage::Storage;

async fn exam_titles(
    storage: &Arc<dyn Storage>,
    results: &[ExamResult],
) -> Result<HashMap<i64, String>, HttpResponse> {
    let mut titles = HashMap::new();
    for result in results {
        if titles.contains_key(&result.exam_id) {
            continue;
        }
        let title = storage
            .get_exam_by_id(result.exam_id)
            .await
            .map_err(|e| storage_error("Failed to load exams", e))?
            .map(|exam| exam.title)
            .unwrap_or_default();
        titles.insert(result.exam_id, title);
    }
    Ok(titles)
}

/// 学生本人的考试记录
pub async fn list_my_results(
    service: &ResultService,
    request: &HttpRequest,
    mut query: ResultListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    query.student_id = Some(user.id);
    let page = match storage.list_results_with_pagination(query).await {
        Ok(page) => page,
        Err(e) => return Ok(storage_error("Failed to retrieve results", e)),
    };

    let titles = match exam_titles(&storage, &page.items).await {
        Ok(titles) => titles,
        Err(response) => return Ok(response),
    };

    let items = page
        .items
        .into_iter()
        .map(|result| ResultListItem {
            exam_title: titles.get(&result.exam_id).cloned().unwrap_or_default(),
            result,
            student: None,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ResultListResponse {
            items,
            pagination: page.pagination,
        },
        "Results retrieved successfully",
    )))
}

/// 某场考试的全部记录（考试管理者）
pub async fn list_exam_results(
    service: &ResultService,
    request: &HttpRequest,
    exam_id: i64,
    mut query: ResultListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let exam = match load_managed_exam(&storage, exam_id, &user).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    query.exam_id = Some(exam_id);
    let page = match storage.list_results_with_pagination(query).await {
        Ok(page) => page,
        Err(e) => return Ok(storage_error("Failed to retrieve results", e)),
    };

    let mut student_ids: Vec<i64> = page.items.iter().map(|r| r.student_id).collect();
    student_ids.sort_unstable();
    student_ids.dedup();
    let students: HashMap<i64, UserBrief> = match storage.get_users_by_ids(&student_ids).await {
        Ok(users) => users.iter().map(|u| (u.id, UserBrief::from(u))).collect(),
        Err(e) => return Ok(storage_error("Failed to load students", e)),
    };

    let items = page
        .items
        .into_iter()
        .map(|result| ResultListItem {
            exam_title: exam.title.clone(),
            student: students.get(&result.student_id).cloned(),
            result,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ResultListResponse {
            items,
            pagination: page.pagination,
        },
        "Results retrieved successfully",
    )))
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassUserService;
use crate::models::{ApiResponse, class_users::requests::ClassUserListQuery};
use crate::services::storage_error;

pub async fn list_class_members(
    service: &ClassUserService,
    request: &HttpRequest,
    class_id: i64,
    query: ClassUserListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .list_class_members_with_pagination(class_id, query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class members retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to retrieve class members", e)),
    }
}

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::class_users::entities::ClassUserRole;
use crate::models::classes::entities::Class;
use crate::models::classes::requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest};
use crate::models::users::entities::User;
use crate::services::{error_response, forbidden, storage_error};
use crate::storage::Storage;

super::define_service!(ClassService);

impl ClassService {
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ClassListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, query).await
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, request, class_data).await
    }

    pub async fn get_class(&self, request: &HttpRequest, class_id: i64) -> ActixResult<HttpResponse> {
        get::get_class(self, request, class_id).await
    }

    pub async fn get_class_by_code(
        &self,
        request: &HttpRequest,
        code: String,
    ) -> ActixResult<HttpResponse> {
        get::get_class_by_code(self, request, code).await
    }

    pub async fn update_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
        update_data: UpdateClassRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_class(self, request, class_id, update_data).await
    }

    pub async fn delete_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_class(self, request, class_id).await
    }
}

/// 读取班级并确认调用者是负责教师或管理员
pub(crate) async fn load_owned_class(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    user: &User,
) -> Result<Class, HttpResponse> {
    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassNotFound,
                "Class not found",
            ));
        }
        Err(e) => return Err(storage_error("Failed to get class", e)),
    };

    if user.is_admin() || class.teacher_id == user.id {
        Ok(class)
    } else {
        Err(error_response(
            StatusCode::FORBIDDEN,
            ErrorCode::ClassPermissionDenied,
            "Only the class teacher can manage this class",
        ))
    }
}

/// 调用者是否能以教师身份操作班级：管理员、负责教师或班级内教师角色
pub(crate) async fn ensure_class_teacher(
    storage: &Arc<dyn Storage>,
    class: &Class,
    user: &User,
) -> Result<(), HttpResponse> {
    if user.is_admin() || class.teacher_id == user.id {
        return Ok(());
    }

    match storage
        .get_class_user_by_user_id_and_class_id(user.id, class.id)
        .await
    {
        Ok(Some(member)) if member.role == ClassUserRole::Teacher => Ok(()),
        Ok(_) => Err(forbidden("Only class teachers can perform this action")),
        Err(e) => Err(storage_error("Failed to check class membership", e)),
    }
}

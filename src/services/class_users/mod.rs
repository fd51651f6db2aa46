pub mod delete;
pub mod get;
pub mod join;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::class_users::requests::{
    ClassUserListQuery, JoinClassRequest, UpdateClassUserRequest,
};

super::define_service!(
    /// 班级成员管理
    ClassUserService
);

impl ClassUserService {
    pub async fn join_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
        join_data: JoinClassRequest,
    ) -> ActixResult<HttpResponse> {
        join::join_class(self, request, class_id, join_data).await
    }

    pub async fn list_class_members(
        &self,
        request: &HttpRequest,
        class_id: i64,
        query: ClassUserListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_class_members(self, request, class_id, query).await
    }

    pub async fn get_class_member(
        &self,
        request: &HttpRequest,
        class_id: i64,
        class_user_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_class_member(self, request, class_id, class_user_id).await
    }

    pub async fn update_class_member(
        &self,
        request: &HttpRequest,
        class_id: i64,
        class_user_id: i64,
        update_data: UpdateClassUserRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_class_member(self, request, class_id, class_user_id, update_data).await
    }

    pub async fn remove_class_member(
        &self,
        request: &HttpRequest,
        class_id: i64,
        class_user_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::remove_class_member(self, request, class_id, class_user_id).await
    }
}

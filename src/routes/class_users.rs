use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::class_users::entities::ClassUserRole;
use crate::models::class_users::requests::{
    ClassUserListQuery, JoinClassRequest, UpdateClassUserRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ClassUserService;
use crate::utils::{SafeClassIdI64, SafeClassUserIdI64};

static CLASS_USER_SERVICE: Lazy<ClassUserService> = Lazy::new(ClassUserService::new_lazy);

pub async fn join_class(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    join_data: web::Json<JoinClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_USER_SERVICE
        .join_class(&req, class_id.0, join_data.into_inner())
        .await
}

pub async fn list_class_members(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<ClassUserListQuery>,
) -> ActixResult<HttpResponse> {
    CLASS_USER_SERVICE
        .list_class_members(&req, class_id.0, query.into_inner())
        .await
}

pub async fn get_class_member(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    class_user_id: SafeClassUserIdI64,
) -> ActixResult<HttpResponse> {
    CLASS_USER_SERVICE
        .get_class_member(&req, class_id.0, class_user_id.0)
        .await
}

pub async fn update_class_member(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    class_user_id: SafeClassUserIdI64,
    update_data: web::Json<UpdateClassUserRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_USER_SERVICE
        .update_class_member(&req, class_id.0, class_user_id.0, update_data.into_inner())
        .await
}

pub async fn remove_class_member(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    class_user_id: SafeClassUserIdI64,
) -> ActixResult<HttpResponse> {
    CLASS_USER_SERVICE
        .remove_class_member(&req, class_id.0, class_user_id.0)
        .await
}

// 配置路由
pub fn configure_class_users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes/{class_id}/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::post()
                            .to(join_class)
                            // 学生凭邀请码加入
                            .wrap(middlewares::RateLimit::invite_code())
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    )
                    .route(
                        web::get()
                            .to(list_class_members)
                            // 班级教师或管理员
                            .wrap(middlewares::RequireClassRole::new_any(
                                ClassUserRole::class_teacher_roles(),
                            )),
                    ),
            )
            .service(
                web::resource("/{class_user_id}")
                    .route(
                        web::get()
                            .to(get_class_member)
                            .wrap(middlewares::RequireClassRole::new_any(
                                ClassUserRole::all_roles(),
                            )),
                    )
                    .route(
                        web::put()
                            .to(update_class_member)
                            .wrap(middlewares::RequireClassRole::new_any(
                                ClassUserRole::class_teacher_roles(),
                            )),
                    )
                    // 本人退出，或班级教师移除，由服务内校验
                    .route(web::delete().to(remove_class_member)),
            ),
    );
}

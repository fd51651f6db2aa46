/*!
 * 班级角色校验
 *
 * 从路径读取 `{class_id}`，查询当前用户在该班级中的成员身份。
 * 管理员不需要成员身份；其余用户的班级角色必须在允许列表中。
 * 通过后把 [`ClassUser`] 放进请求扩展。
 *
 * ```rust,ignore
 * web::resource("/{class_user_id}")
 *     .route(web::put().to(update_member)
 *         .wrap(RequireClassRole::new_any(ClassUserRole::class_teacher_roles())))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};

use crate::models::{
    ErrorCode,
    class_users::entities::{ClassUser, ClassUserRole},
    users::entities::User,
};
use crate::storage::Storage;

use super::create_error_response;

#[derive(Clone)]
pub struct RequireClassRole {
    allowed: Rc<[ClassUserRole]>,
}

impl RequireClassRole {
    pub fn new_any(roles: &[&ClassUserRole]) -> Self {
        Self {
            allowed: roles.iter().map(|r| **r).collect(),
        }
    }
}

/// 校验失败时的响应内容
type Denial = (StatusCode, ErrorCode, &'static str);

async fn resolve_membership(
    req: &ServiceRequest,
    allowed: &[ClassUserRole],
) -> Result<Option<ClassUser>, Denial> {
    let user = req.extensions().get::<User>().cloned().ok_or((
        StatusCode::UNAUTHORIZED,
        ErrorCode::Unauthorized,
        "Authentication required",
    ))?;

    let class_id = req
        .match_info()
        .get("class_id")
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or((
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Missing or invalid class_id",
        ))?;

    if user.is_admin() {
        return Ok(None);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "Storage not configured",
        ))?;

    let member = match storage
        .get_class_user_by_user_id_and_class_id(user.id, class_id)
        .await
    {
        Ok(member) => member,
        Err(e) => {
            tracing::error!("Failed to load class membership: {}", e);
            None
        }
    };

    match member {
        Some(member) if allowed.contains(&member.role) => Ok(Some(member)),
        Some(_) => Err((
            StatusCode::FORBIDDEN,
            ErrorCode::ClassPermissionDenied,
            "Access denied for this class role",
        )),
        None => Err((
            StatusCode::FORBIDDEN,
            ErrorCode::ClassPermissionDenied,
            "No permission for this class",
        )),
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireClassRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassRoleMiddleware {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireClassRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Rc<[ClassUserRole]>,
}

impl<S, B> Service<ServiceRequest> for RequireClassRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed = self.allowed.clone();

        Box::pin(async move {
            match resolve_membership(&req, &allowed).await {
                Ok(member) => {
                    if let Some(member) = member {
                        tracing::debug!("Class user {} passed class role check", member.user_id);
                        req.extensions_mut().insert(member);
                    }
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err((status, code, message)) => Ok(req.into_response(
                    create_error_response(status, code, message).map_into_right_body(),
                )),
            }
        })
    }
}

/*!
 * 全局角色校验
 *
 * 必须放在 RequireJWT 之内（即先 `.wrap(RequireRole)` 再 `.wrap(RequireJWT)`），
 * 否则请求扩展里没有当前用户，直接返回 401。
 *
 * ```rust,ignore
 * web::scope("/api/v1/questions")
 *     .wrap(RequireRole::new_any(UserRole::teacher_roles()))
 *     .wrap(RequireJWT)
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};

use super::create_error_response;

/// 允许访问的角色集合，用户只有一个角色，命中任意一个即放行
#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<[UserRole]>,
}

impl RequireRole {
    pub fn new(role: &UserRole) -> Self {
        Self::new_any(&[role])
    }

    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed: roles.iter().map(|r| **r).collect(),
        }
    }

    fn permits(&self, role: UserRole) -> bool {
        self.allowed.contains(&role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            guard: self.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    guard: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let guard = self.guard.clone();

        Box::pin(async move {
            let role = req.extensions().get::<User>().map(|u| (u.id, u.role));

            let (status, code, message) = match role {
                Some((_, role)) if guard.permits(role) => {
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
                Some((user_id, role)) => {
                    info!("User {} with role {} denied by role guard", user_id, role);
                    (StatusCode::FORBIDDEN, ErrorCode::Forbidden, "Access denied")
                }
                None => (
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    "Authentication required",
                ),
            };

            Ok(req.into_response(create_error_response(status, code, message).map_into_right_body()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_listed_role_is_permitted() {
        let guard = RequireRole::new_any(UserRole::teacher_roles());
        assert!(guard.permits(UserRole::Teacher));
        assert!(guard.permits(UserRole::Admin));
        assert!(!guard.permits(UserRole::Student));

        let admin_only = RequireRole::new(&UserRole::Admin);
        assert!(!admin_only.permits(UserRole::Teacher));
    }
}

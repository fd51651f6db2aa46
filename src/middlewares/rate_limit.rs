//! 固定窗口速率限制
//!
//! 未登录接口（登录、注册、刷新令牌、邀请码）按客户端 IP 计数；
//! 作答保存等已登录接口按用户计数。超限返回 429 并附带 `Retry-After`。

use actix_service::{Service, Transform, forward_ready};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 计数表：键为 `桶:主体`，值为 (窗口内次数, 窗口起点)
static WINDOWS: Lazy<Cache<String, (u32, i64)>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(600))
        .max_capacity(100_000)
        .build()
});

/// 计数主体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBy {
    /// 客户端 IP
    Client,
    /// 已认证用户，未认证时退回 IP
    User,
}

/// 固定窗口：返回 Ok(剩余次数) 或 Err(需等待秒数)，以及新的窗口状态
fn consume(
    entry: Option<(u32, i64)>,
    now: i64,
    limit: u32,
    window_secs: i64,
) -> (Result<u32, u64>, (u32, i64)) {
    let (count, started) = match entry {
        Some((count, started)) if now - started < window_secs => (count, started),
        _ => (0, now),
    };

    if count >= limit {
        let wait = (started + window_secs - now).max(1) as u64;
        return (Err(wait), (count, started));
    }

    (Ok(limit - count - 1), (count + 1, started))
}

#[derive(Debug, Clone)]
pub struct RateLimit {
    bucket: &'static str,
    limit: u32,
    window_secs: i64,
    by: LimitBy,
}

impl RateLimit {
    pub const fn new(bucket: &'static str, limit: u32, window_secs: i64, by: LimitBy) -> Self {
        Self {
            bucket,
            limit,
            window_secs,
            by,
        }
    }

    /// 5 次/分钟/IP
    pub fn login() -> Self {
        Self::new("login", 5, 60, LimitBy::Client)
    }

    /// 3 次/分钟/IP
    pub fn register() -> Self {
        Self::new("register", 3, 60, LimitBy::Client)
    }

    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60, LimitBy::Client)
    }

    /// 邀请码查询与加入班级，防止枚举
    pub fn invite_code() -> Self {
        Self::new("invite_code", 10, 60, LimitBy::Client)
    }

    /// 保存作答：120 次/分钟/用户
    pub fn answer_save() -> Self {
        Self::new("answer_save", 120, 60, LimitBy::User)
    }

    fn key(&self, req: &ServiceRequest) -> String {
        let subject = match self.by {
            LimitBy::User => req
                .extensions()
                .get::<User>()
                .map(|user| format!("user:{}", user.id)),
            LimitBy::Client => None,
        };
        let subject = subject.unwrap_or_else(|| format!("ip:{}", client_ip(req)));
        format!("{}:{}", self.bucket, subject)
    }
}

/// 优先取连接信息，其次是反向代理头；只接受能解析为 IP 的值
fn client_ip(req: &ServiceRequest) -> String {
    let parse = |raw: &str| {
        let raw = raw.trim();
        raw.parse::<IpAddr>()
            .ok()
            .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
    };

    if let Some(ip) = req.connection_info().realip_remote_addr().and_then(parse) {
        return ip.to_string();
    }

    ["X-Forwarded-For", "X-Real-IP"]
        .iter()
        .filter_map(|name| req.headers().get(*name)?.to_str().ok())
        .filter_map(|value| value.split(',').next().and_then(parse))
        .map(|ip| ip.to_string())
        .next()
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(wait_secs: u64) -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header(("Retry-After", wait_secs.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            policy: Rc::new(self.clone()),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    policy: Rc<RateLimit>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let key = policy.key(&req);
            let now = chrono::Utc::now().timestamp();
            let (decision, state) =
                consume(WINDOWS.get(&key).await, now, policy.limit, policy.window_secs);
            WINDOWS.insert(key.clone(), state).await;

            let remaining = match decision {
                Ok(remaining) => remaining,
                Err(wait) => {
                    warn!(
                        "Rate limit hit on {} ({} per {}s)",
                        key, policy.limit, policy.window_secs
                    );
                    return Ok(req.into_response(too_many_requests(wait).map_into_right_body()));
                }
            };

            let mut res = service.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(policy.limit),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.limit, login.window_secs), (5, 60));
        assert_eq!(login.by, LimitBy::Client);

        assert_eq!(RateLimit::register().limit, 3);
        assert_eq!(RateLimit::invite_code().bucket, "invite_code");

        let save = RateLimit::answer_save();
        assert_eq!(save.by, LimitBy::User);
        assert!(save.limit > RateLimit::refresh_token().limit);
    }

    #[test]
    fn test_fixed_window() {
        let (decision, state) = consume(None, 1000, 2, 60);
        assert_eq!(decision, Ok(1));
        let (decision, state) = consume(Some(state), 1010, 2, 60);
        assert_eq!(decision, Ok(0));
        let (decision, state) = consume(Some(state), 1020, 2, 60);
        assert_eq!(decision, Err(40));

        let (decision, state) = consume(Some(state), 1060, 2, 60);
        assert_eq!(decision, Ok(1));
        assert_eq!(state, (1, 1060));
    }

    #[test]
    fn test_user_key_falls_back_to_ip() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.7:4000".parse().unwrap())
            .to_srv_request();
        assert_eq!(RateLimit::answer_save().key(&req), "answer_save:ip:10.0.0.7");
        assert_eq!(RateLimit::login().key(&req), "login:ip:10.0.0.7");
    }
}

pub mod settings;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;

/// 系统信息只读取配置和内存状态，不需要存储
pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    pub async fn get_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_settings(self, request).await
    }

    pub async fn get_ws_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_ws_status(self, request).await
    }
}

use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemSettingsResponse {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
    #[ts(type = "number")]
    pub exam_status_poll_interval: u64, // 秒
    pub submit_grace_period: i64,       // 秒
    pub uptime_seconds: i64,
}

/// WebSocket 状态
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct WebSocketStatusResponse {
    pub online_users: usize,
    pub class_groups: usize,
}

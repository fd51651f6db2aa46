/*!
 * WebSocket 实时推送
 *
 * 客户端通过以下 URL 连接：
 * ```text
 * ws://host/api/v1/ws?token=<access_token>
 * ```
 *
 * 连接建立后用户自动加入个人频道，并按班级成员关系加入 `class:{id}` 分组。
 *
 * ## 服务端推送
 * ```json
 * {"type": "notification", "payload": {"id": 1, "notification_type": "exam_assigned", ...}}
 * {"type": "exam_status", "exam_id": 3, "phase": "open"}
 * ```
 *
 * ## 心跳
 * ```json
 * {"type": "ping"}
 * {"type": "pong"}
 * ```
 */

use std::collections::HashSet;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use actix_ws::Message;
use dashmap::DashMap;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cache::ObjectCache;
use crate::middlewares::require_jwt::authenticate_token;
use crate::models::exams::entities::ExamPhase;
use crate::models::notifications::entities::Notification;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error;
use crate::storage::Storage;

/// 每个用户广播通道的容量
const CHANNEL_CAPACITY: usize = 100;
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

static CONNECTION_MANAGER: Lazy<ConnectionManager> = Lazy::new(ConnectionManager::new);

/// WebSocket 消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected { user_id: i64, class_ids: Vec<i64> },
    Notification { payload: Notification },
    ExamStatus { exam_id: i64, phase: ExamPhase },
    Ping,
    Pong,
    Error { message: String },
}

/// 连接管理器
pub struct ConnectionManager {
    /// 用户 ID -> 广播发送器，同一用户的多个连接共享
    connections: DashMap<i64, broadcast::Sender<WsMessage>>,
    /// 班级 ID -> 在线成员
    groups: DashMap<i64, HashSet<i64>>,
}

impl ConnectionManager {
    fn new() -> Self {
        Self {
            connections: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    pub fn get() -> &'static Self {
        &CONNECTION_MANAGER
    }

    /// 注册用户连接并加入班级分组
    pub fn register(&self, user_id: i64, class_ids: &[i64]) -> broadcast::Receiver<WsMessage> {
        let receiver = self
            .connections
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        for &class_id in class_ids {
            self.join_group(class_id, user_id);
        }

        receiver
    }

    /// 连接断开，最后一个连接断开时移出所有分组
    pub fn unregister(&self, user_id: i64) {
        let removed = self
            .connections
            .remove_if(&user_id, |_, sender| sender.receiver_count() == 0)
            .is_some();

        if removed {
            self.groups.alter_all(|_, mut members| {
                members.remove(&user_id);
                members
            });
            self.groups.retain(|_, members| !members.is_empty());
        }
    }

    /// 在线用户加入班级分组，不在线时忽略
    pub fn join_group(&self, class_id: i64, user_id: i64) {
        if self.connections.contains_key(&user_id) {
            self.groups.entry(class_id).or_default().insert(user_id);
        }
    }

    pub fn leave_group(&self, class_id: i64, user_id: i64) {
        if let Some(mut members) = self.groups.get_mut(&class_id) {
            members.remove(&user_id);
        }
        self.groups.remove_if(&class_id, |_, members| members.is_empty());
    }

    /// 班级被删除时移除整个分组，返回移出的在线人数
    pub fn drop_group(&self, class_id: i64) -> usize {
        self.groups
            .remove(&class_id)
            .map_or(0, |(_, members)| members.len())
    }

    pub fn send_to_user(&self, user_id: i64, message: WsMessage) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|sender| sender.send(message).is_ok())
    }

    /// 推送给班级分组内的在线用户，返回送达人数
    pub fn send_to_group(&self, class_id: i64, message: &WsMessage) -> usize {
        let members: Vec<i64> = match self.groups.get(&class_id) {
            Some(members) => members.iter().copied().collect(),
            None => return 0,
        };

        members
            .into_iter()
            .filter(|&user_id| self.send_to_user(user_id, message.clone()))
            .count()
    }

    pub fn push_notification(&self, notification: Notification) -> bool {
        let user_id = notification.user_id;
        self.send_to_user(
            user_id,
            WsMessage::Notification {
                payload: notification,
            },
        )
    }

    pub fn online_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.receiver_count() > 0)
            .count()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|s| s.receiver_count() > 0)
    }

    pub fn is_in_group(&self, class_id: i64, user_id: i64) -> bool {
        self.groups
            .get(&class_id)
            .is_some_and(|members| members.contains(&user_id))
    }
}

/// 推送一批通知，每条通知发到其接收者的个人频道
pub fn push_notifications(notifications: Vec<Notification>) {
    let manager = ConnectionManager::get();
    for notification in notifications {
        manager.push_notification(notification);
    }
}

/// 向班级分组推送考试阶段变化
pub fn broadcast_exam_status(class_ids: &[i64], exam_id: i64, phase: ExamPhase) {
    let manager = ConnectionManager::get();
    let message = WsMessage::ExamStatus { exam_id, phase };
    for &class_id in class_ids {
        let delivered = manager.send_to_group(class_id, &message);
        debug!(
            "Exam {} phase {} pushed to class {} ({} online)",
            exam_id, phase, class_id, delivered
        );
    }
}

pub struct WebSocketService;

impl WebSocketService {
    /// 校验查询参数中的 token 后升级连接，浏览器握手无法携带 Authorization 头
    pub async fn upgrade(
        request: &HttpRequest,
        body: web::Payload,
        token: &str,
    ) -> ActixResult<HttpResponse> {
        let storage = crate::services::storage_from_request(request)?;
        let cache = request
            .app_data::<web::Data<Arc<dyn ObjectCache>>>()
            .map(|data| data.get_ref().clone())
            .ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Cache not found in app data")
            })?;

        let user = match authenticate_token(token, &storage, &cache).await {
            Ok(user) => user,
            Err(message) => {
                return Ok(HttpResponse::Unauthorized()
                    .json(ApiResponse::error_empty(ErrorCode::Unauthorized, message)));
            }
        };

        let class_ids = match load_class_ids(&storage, user.id).await {
            Ok(ids) => ids,
            Err(response) => return Ok(response),
        };

        let (response, session, stream) = actix_ws::handle(request, body)?;
        actix_web::rt::spawn(Self::handle_connection(user.id, class_ids, session, stream));

        Ok(response)
    }

    /// 连接主循环：客户端消息、服务端推送和心跳
    pub async fn handle_connection(
        user_id: i64,
        class_ids: Vec<i64>,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) {
        info!("WebSocket connected for user: {}", user_id);

        let mut rx = ConnectionManager::get().register(user_id, &class_ids);

        let connected = WsMessage::Connected { user_id, class_ids };
        if let Ok(json) = serde_json::to_string(&connected) {
            let _ = session.text(json).await;
        }

        let mut heartbeat =
            tokio::time::interval(std::time::Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            tokio::select! {
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<WsMessage>(&text) {
                                Ok(WsMessage::Ping) => {
                                    let pong = serde_json::to_string(&WsMessage::Pong)
                                        .unwrap_or_else(|_| r#"{"type":"pong"}"#.to_string());
                                    if session.text(pong).await.is_err() {
                                        break;
                                    }
                                }
                                Ok(other) => {
                                    debug!("Received message from user {}: {:?}", user_id, other);
                                }
                                Err(_) => {
                                    let error = WsMessage::Error {
                                        message: "Unrecognized message".to_string(),
                                    };
                                    if let Ok(json) = serde_json::to_string(&error)
                                        && session.text(json).await.is_err()
                                    {
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if session.pong(&data).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket closed for user: {}", user_id);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error for user {}: {:?}", user_id, e);
                            break;
                        }
                        _ => {}
                    }
                }

                msg = rx.recv() => {
                    match msg {
                        Ok(ws_msg) => {
                            if let Ok(json) = serde_json::to_string(&ws_msg)
                                && session.text(json).await.is_err()
                            {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket for user {} lagged by {} messages", user_id, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }

                _ = heartbeat.tick() => {
                    if session.ping(b"").await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = session.close(None).await;
        // 先释放订阅，否则 receiver_count 不为 0
        drop(rx);
        ConnectionManager::get().unregister(user_id);
        info!("WebSocket disconnected for user: {}", user_id);
    }
}

async fn load_class_ids(storage: &Arc<dyn Storage>, user_id: i64) -> Result<Vec<i64>, HttpResponse> {
    storage
        .list_user_class_ids(user_id)
        .await
        .map_err(|e| storage_error("Failed to load class memberships", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_tagging() {
        let json = serde_json::to_value(WsMessage::ExamStatus {
            exam_id: 3,
            phase: ExamPhase::Open,
        })
        .unwrap();
        assert_eq!(json["type"], "exam_status");
        assert_eq!(json["phase"], "open");

        let ping: WsMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, WsMessage::Ping);
    }

    #[tokio::test]
    async fn test_group_delivery() {
        let manager = ConnectionManager::new();
        let mut rx_a = manager.register(1, &[10]);
        let mut rx_b = manager.register(2, &[10, 11]);

        let message = WsMessage::ExamStatus {
            exam_id: 5,
            phase: ExamPhase::Closed,
        };
        assert_eq!(manager.send_to_group(10, &message), 2);
        assert_eq!(manager.send_to_group(11, &message), 1);
        assert_eq!(manager.send_to_group(12, &message), 0);

        assert_eq!(rx_a.recv().await.unwrap(), message);
        assert_eq!(rx_b.recv().await.unwrap(), message);
        assert_eq!(rx_b.recv().await.unwrap(), message);
    }

    #[test]
    fn test_unregister_leaves_groups() {
        let manager = ConnectionManager::new();
        let rx = manager.register(7, &[1, 2]);
        assert!(manager.is_online(7));
        assert!(manager.is_in_group(2, 7));

        drop(rx);
        manager.unregister(7);
        assert!(!manager.is_online(7));
        assert!(!manager.is_in_group(1, 7));
        assert_eq!(manager.group_count(), 0);
    }

    #[test]
    fn test_join_group_requires_connection() {
        let manager = ConnectionManager::new();
        manager.join_group(4, 99);
        assert!(!manager.is_in_group(4, 99));

        let _rx = manager.register(99, &[]);
        manager.join_group(4, 99);
        assert!(manager.is_in_group(4, 99));
        manager.leave_group(4, 99);
        assert!(!manager.is_in_group(4, 99));
    }

    #[test]
    fn test_drop_group_removes_deleted_class() {
        let manager = ConnectionManager::new();
        let _rx_a = manager.register(1, &[30, 31]);
        let _rx_b = manager.register(2, &[30]);

        assert_eq!(manager.drop_group(30), 2);
        assert!(!manager.is_in_group(30, 1));
        assert!(manager.is_in_group(31, 1));
        assert_eq!(manager.group_count(), 1);
        assert_eq!(manager.drop_group(30), 0);
    }
}

//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationQuery,
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

async fn insert_notification<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    req: &CreateNotificationRequest,
    created_at: i64,
) -> Result<Notification> {
    let model = ActiveModel {
        user_id: Set(user_id),
        notification_type: Set(req.notification_type.to_string()),
        title: Set(req.title.clone()),
        content: Set(req.content.clone()),
        reference_type: Set(req.reference_type.map(|r| r.to_string())),
        reference_id: Set(req.reference_id),
        is_read: Set(false),
        created_at: Set(created_at),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("创建通知失败: {e}")))?;

    Ok(result.into_notification())
}

impl SeaOrmStorage {
    /// 批量创建通知
    pub async fn create_notifications_impl(
        &self,
        user_ids: &[i64],
        req: CreateNotificationRequest,
    ) -> Result<Vec<Notification>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let mut notifications = Vec::with_capacity(user_ids.len());
        for &user_id in user_ids {
            notifications.push(insert_notification(&txn, user_id, &req, now).await?);
        }

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(notifications)
    }

    /// 通过 ID 获取通知
    pub async fn get_notification_by_id_impl(
        &self,
        notification_id: i64,
    ) -> Result<Option<Notification>> {
        let result = Notifications::find_by_id(notification_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询通知失败: {e}")))?;

        Ok(result.map(|m| m.into_notification()))
    }

    /// 列出用户通知（分页）
    pub async fn list_notifications_with_pagination_impl(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = Notifications::find().filter(Column::UserId.eq(user_id));

        // 未读筛选
        if let Some(true) = query.unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        let select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);
        let (notifications, pagination) = self.fetch_page(select, page, size, "通知").await?;

        Ok(NotificationListResponse {
            items: notifications
                .into_iter()
                .map(|m| m.into_notification())
                .collect(),
            pagination,
        })
    }

    /// 获取用户未读通知数量
    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<i64> {
        let count = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| {
                ExamSystemError::database_operation(format!("查询未读通知数量失败: {e}"))
            })?;

        Ok(count as i64)
    }

    /// 标记通知为已读
    pub async fn mark_notification_read_impl(&self, notification_id: i64) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(notification_id))
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 标记用户所有通知为已读
    pub async fn mark_all_notifications_read_impl(&self, user_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| {
                ExamSystemError::database_operation(format!("标记全部通知已读失败: {e}"))
            })?;

        Ok(result.rows_affected as i64)
    }

    /// 删除通知
    pub async fn delete_notification_impl(&self, notification_id: i64) -> Result<bool> {
        let result = Notifications::delete_by_id(notification_id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除通知失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

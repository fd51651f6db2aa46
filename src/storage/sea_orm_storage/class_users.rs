//! 班级成员存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::class_users::{ActiveModel, Column, Entity as ClassUsers};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    class_users::{
        entities::{ClassMember, ClassUser, ClassUserRole},
        requests::{ClassUserListQuery, UpdateClassUserRequest},
        responses::ClassMemberListResponse,
    },
    classes::{requests::ClassListQuery, responses::ClassListResponse},
    users::entities::UserBrief,
};
use crate::utils::contains_any;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 获取班级成员数量
    pub async fn count_class_members_impl(&self, class_id: i64) -> Result<i64> {
        let count = ClassUsers::find()
            .filter(Column::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| {
                ExamSystemError::database_operation(format!("查询班级成员数量失败: {e}"))
            })?;

        Ok(count as i64)
    }

    /// 加入班级
    pub async fn join_class_impl(
        &self,
        user_id: i64,
        class_id: i64,
        role: ClassUserRole,
    ) -> Result<ClassUser> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(class_id),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("加入班级失败: {e}")))?;

        Ok(result.into_class_user())
    }

    /// 离开班级
    pub async fn leave_class_impl(&self, user_id: i64, class_id: i64) -> Result<bool> {
        let result = ClassUsers::delete_many()
            .filter(
                Condition::all()
                    .add(Column::UserId.eq(user_id))
                    .add(Column::ClassId.eq(class_id)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("离开班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 通过 ID 获取班级成员，限定在给定班级内
    pub async fn get_class_user_by_id_impl(
        &self,
        class_id: i64,
        class_user_id: i64,
    ) -> Result<Option<ClassUser>> {
        let result = ClassUsers::find_by_id(class_user_id)
            .filter(Column::ClassId.eq(class_id))
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_user()))
    }

    /// 更新班级成员角色
    pub async fn update_class_user_impl(
        &self,
        class_id: i64,
        class_user_id: i64,
        update: UpdateClassUserRequest,
    ) -> Result<Option<ClassUser>> {
        if self
            .get_class_user_by_id_impl(class_id, class_user_id)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(class_user_id),
            role: Set(update.role.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新班级成员失败: {e}")))?;

        Ok(Some(result.into_class_user()))
    }

    /// 分页列出班级成员（附带用户信息）
    pub async fn list_class_members_with_pagination_impl(
        &self,
        class_id: i64,
        query: ClassUserListQuery,
    ) -> Result<ClassMemberListResponse> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = ClassUsers::find().filter(Column::ClassId.eq(class_id));

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        // 先按用户名搜索出用户 ID
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let user_ids: Vec<i64> = Users::find()
                .select_only()
                .column(UserColumn::Id)
                .filter(contains_any(
                    &[UserColumn::Username, UserColumn::DisplayName],
                    search.trim(),
                ))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("搜索用户失败: {e}")))?;

            if user_ids.is_empty() {
                return Ok(ClassMemberListResponse {
                    items: vec![],
                    pagination: PaginationInfo::new(page, size, 0),
                });
            }
            select = select.filter(Column::UserId.is_in(user_ids));
        }

        let select = select
            .order_by_asc(Column::Role)
            .order_by_asc(Column::JoinedAt);
        let (members, pagination) = self.fetch_page(select, page, size, "班级成员").await?;

        let user_ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
        let users: HashMap<i64, UserBrief> = self
            .get_users_by_ids_impl(&user_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserBrief::from(u)))
            .collect();

        let items = members
            .into_iter()
            .filter_map(|m| {
                let user = users.get(&m.user_id)?.clone();
                Some(ClassMember {
                    membership: m.into_class_user(),
                    user,
                })
            })
            .collect();

        Ok(ClassMemberListResponse { items, pagination })
    }

    /// 用户所在的全部班级 ID
    pub async fn list_user_class_ids_impl(&self, user_id: i64) -> Result<Vec<i64>> {
        ClassUsers::find()
            .select_only()
            .column(Column::ClassId)
            .filter(Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询用户班级关联失败: {e}")))
    }

    /// 若干班级中的学生 ID
    pub async fn list_class_student_ids_impl(&self, class_ids: &[i64]) -> Result<Vec<i64>> {
        if class_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut ids: Vec<i64> = ClassUsers::find()
            .select_only()
            .column(Column::UserId)
            .filter(Column::ClassId.is_in(class_ids.iter().copied()))
            .filter(Column::Role.eq(ClassUserRole::Student.to_string()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询班级学生失败: {e}")))?;

        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// 分页列出用户所在的班级
    pub async fn list_user_classes_with_pagination_impl(
        &self,
        user_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let class_ids = self.list_user_class_ids_impl(user_id).await?;
        if class_ids.is_empty() {
            return Ok(ClassListResponse {
                items: vec![],
                pagination: PaginationInfo::new(page, size, 0),
            });
        }

        let mut select = Classes::find().filter(ClassColumn::Id.is_in(class_ids));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(contains_any(&[ClassColumn::Name], search.trim()));
        }

        let select = select.order_by_desc(ClassColumn::CreatedAt);
        let (classes, pagination) = self.fetch_page(select, page, size, "用户班级").await?;

        Ok(ClassListResponse {
            items: classes.into_iter().map(|m| m.into_class()).collect(),
            pagination,
        })
    }

    /// 获取用户在班级中的信息
    pub async fn get_class_user_by_user_id_and_class_id_impl(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>> {
        let result = ClassUsers::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ClassId.eq(class_id))
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_user()))
    }
}

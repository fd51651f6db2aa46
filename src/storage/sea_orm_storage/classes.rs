//! 班级存储操作

use super::SeaOrmStorage;
use crate::entity::class_users::ActiveModel as ClassUserActiveModel;
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationQuery,
    class_users::entities::ClassUserRole,
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
};
use crate::utils::{contains_any, random_code::generate_random_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

const INVITE_CODE_LEN: usize = 8;

impl SeaOrmStorage {
    /// 生成未被占用的邀请码
    async fn unique_invite_code(&self) -> Result<String> {
        for _ in 0..5 {
            let code = generate_random_code(INVITE_CODE_LEN);
            if self.get_class_by_code_impl(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(ExamSystemError::conflict("无法生成唯一的班级邀请码"))
    }

    /// 创建班级，教师同时作为班级成员加入
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();
        let invite_code = self.unique_invite_code().await?;

        // teacher_id 必须由服务层确保已设置
        let teacher_id = req.teacher_id.ok_or_else(|| {
            ExamSystemError::database_operation("teacher_id must be set before calling create_class")
        })?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let class = ActiveModel {
            teacher_id: Set(teacher_id),
            name: Set(req.name),
            description: Set(req.description),
            invite_code: Set(invite_code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("创建班级失败: {e}")))?;

        ClassUserActiveModel {
            class_id: Set(class.id),
            user_id: Set(teacher_id),
            role: Set(ClassUserRole::Teacher.to_string()),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("添加班级教师失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(class.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 通过邀请码获取班级
    pub async fn get_class_by_code_impl(&self, invite_code: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::InviteCode.eq(invite_code))
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = Classes::find();

        // 教师筛选
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(contains_any(&[Column::Name], search.trim()));
        }

        let select = select.order_by_desc(Column::CreatedAt);
        let (classes, pagination) = self.fetch_page(select, page, size, "班级").await?;

        Ok(ClassListResponse {
            items: classes.into_iter().map(|m| m.into_class()).collect(),
            pagination,
        })
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        // 先检查班级是否存在
        let existing = self.get_class_by_id_impl(class_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新班级失败: {e}")))?;

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

use std::sync::Arc;

use crate::models::{
    grading::entities::{GradeRecord, NewGradeRecord},
    submissions::entities::{GraderType, NewSubmission, Submission, SubmissionState},
    users::entities::{User, UserRole},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建服务账号
    async fn create_user(&self, username: &str, password_hash: &str, role: UserRole)
    -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 提交管理方法
    // 按身份元组取回或建档提交；返回 (实体, 是否新建)。
    // 对唯一性不变量原子：相同属性的并发调用不会产生两个实体。
    async fn get_or_create_submission(&self, attrs: NewSubmission) -> Result<(Submission, bool)>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 状态 CAS：仅当当前状态等于 from 时迁移到 to，返回是否命中
    async fn transition_submission_state(
        &self,
        id: i64,
        from: SubmissionState,
        to: SubmissionState,
    ) -> Result<bool>;
    // 持久化路由决策：写入 next_grader_type 并置为待评状态
    async fn set_submission_routing(
        &self,
        id: i64,
        next_grader_type: GraderType,
        state: SubmissionState,
    ) -> Result<bool>;
    // 认领候选：指定位置待评、非本人提交、且该评分人未评过的提交
    async fn list_claimable_submissions(
        &self,
        location: &str,
        grader_id: &str,
        limit: u64,
    ) -> Result<Vec<Submission>>;
    // 认领 CAS：waiting_to_be_graded → being_graded，记录认领人；
    // 并发调用者中恰有一个命中
    async fn claim_submission(&self, id: i64, grader_id: &str) -> Result<bool>;
    // 释放认领：being_graded → waiting_to_be_graded，清空认领人
    async fn release_submission(&self, id: i64) -> Result<bool>;
    // 清扫过期认领：认领后超过 max_age_secs 未更新的提交
    // 释放回等待队列，返回释放条数
    async fn release_stale_claims(&self, max_age_secs: u64) -> Result<u64>;

    /// 评分记录方法
    // 写入一条评分记录（创建后不可变）
    async fn create_grade_record(&self, record: NewGradeRecord) -> Result<GradeRecord>;
    // 某提交的成功同伴评分条数
    async fn count_successful_peer_grades(&self, submission_id: i64) -> Result<u64>;
    // 校准计数：指定位置 (已被教师评分, 等待教师评分) 的提交数
    async fn count_graded_and_pending_instructor(&self, location: &str) -> Result<(u64, u64)>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

#[cfg(test)]
pub mod memory;

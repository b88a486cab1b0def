//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod grade_records;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{ControllerError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ControllerError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ControllerError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ControllerError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ControllerError::database_connection(format!("数据库连接失败: {e}")))
    }

    /// 从 URL 推断数据库类型并规范化
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ControllerError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    grading::entities::{GradeRecord, NewGradeRecord},
    submissions::entities::{GraderType, NewSubmission, Submission, SubmissionState},
    users::entities::{User, UserRole},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User> {
        self.create_user_impl(username, password_hash, role).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 提交模块
    async fn get_or_create_submission(&self, attrs: NewSubmission) -> Result<(Submission, bool)> {
        self.get_or_create_submission_impl(attrs).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn transition_submission_state(
        &self,
        id: i64,
        from: SubmissionState,
        to: SubmissionState,
    ) -> Result<bool> {
        self.transition_submission_state_impl(id, from, to).await
    }

    async fn set_submission_routing(
        &self,
        id: i64,
        next_grader_type: GraderType,
        state: SubmissionState,
    ) -> Result<bool> {
        self.set_submission_routing_impl(id, next_grader_type, state)
            .await
    }

    async fn list_claimable_submissions(
        &self,
        location: &str,
        grader_id: &str,
        limit: u64,
    ) -> Result<Vec<Submission>> {
        self.list_claimable_submissions_impl(location, grader_id, limit)
            .await
    }

    async fn claim_submission(&self, id: i64, grader_id: &str) -> Result<bool> {
        self.claim_submission_impl(id, grader_id).await
    }

    async fn release_submission(&self, id: i64) -> Result<bool> {
        self.release_submission_impl(id).await
    }

    async fn release_stale_claims(&self, max_age_secs: u64) -> Result<u64> {
        self.release_stale_claims_impl(max_age_secs).await
    }

    // 评分记录模块
    async fn create_grade_record(&self, record: NewGradeRecord) -> Result<GradeRecord> {
        self.create_grade_record_impl(record).await
    }

    async fn count_successful_peer_grades(&self, submission_id: i64) -> Result<u64> {
        self.count_successful_peer_grades_impl(submission_id).await
    }

    async fn count_graded_and_pending_instructor(&self, location: &str) -> Result<(u64, u64)> {
        self.count_graded_and_pending_instructor_impl(location)
            .await
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub grading: GradingConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub secret: String,
    pub access_token_expiry: i64,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    pub default_ttl: u64,
    pub memory: MemoryConfig,
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub max_age: usize,
}

/// 评分路由配置
///
/// 路由阈值是显式配置，在进程启动时加载一次，
/// 由路由器在调用时接收，而不是在任意调用深度读取全局设置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// 一份提交需要多少条成功的同伴评分才算评完
    pub peer_grade_target: u64,
    /// 认领时限（秒）：超时未交分的认领由后台清扫释放回等待队列
    pub claim_timeout: u64,
    /// 按 grader_settings 引用名索引的评分策略表
    pub policies: HashMap<String, GraderPolicy>,
}

/// 评分策略（按类型打标签，边界处完成校验，内部逻辑不再检查动态映射）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "grader_type", rename_all = "snake_case")]
pub enum GraderPolicy {
    /// 机器评分：需要足够的教师标注语料才可信
    MachineLearning { min_to_use_ml: i64 },
    /// 同伴评分：需要先有教师评出的校准样例
    Peer { min_to_use_peer: i64 },
}

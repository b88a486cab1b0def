use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use crate::services::grading::{BasicQualityCheck, QualityCheck};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub quality: Arc<dyn QualityCheck>,
}

/// 创建缓存实例
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    // 根据配置选择缓存后端
    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => {
                warn!("Failed to create {} cache: {}", cache_type, e);
            }
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);
    }

    // 如果配置的缓存不可用，回退到默认的内存缓存
    if cache_type != "moka" {
        warn!("Falling back to default memory cache");
        if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
            match fallback_constructor().await {
                Ok(cache) => {
                    warn!("Successfully created fallback Moka (in-memory) cache backend");
                    return Ok(Arc::from(cache));
                }
                Err(fallback_e) => {
                    warn!("Failed to create fallback Moka cache: {}", fallback_e);
                }
            }
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 初始化默认管理员账号
/// 如果数据库中还没有 admin 账号，则创建一个
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.get_user_by_username("admin").await {
        Ok(Some(user)) => {
            debug!(
                "Admin account already exists (ID: {}), skipping seed",
                user.id
            );
            return;
        }
        Ok(None) => {
            info!("No admin account found, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to look up admin account: {}, skipping seed", e);
            return;
        }
    }

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}", e);
            return;
        }
    };

    match storage
        .create_user("admin", &password_hash, UserRole::Admin)
        .await
    {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                user.id, user.username
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 清扫周期（秒）
const CLAIM_REAPER_INTERVAL_SECS: u64 = 60;

/// 启动后台任务：释放过期认领
///
/// 认领是限时的。评分人认领后不交分，提交会一直停在
/// being_graded；定期把超过 grading.claim_timeout 未更新的
/// 认领释放回等待队列，供其他评分人认领。
pub fn spawn_claim_reaper(storage: Arc<dyn Storage>) {
    let timeout = AppConfig::get().grading.claim_timeout;
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(CLAIM_REAPER_INTERVAL_SECS));
        // interval 的第一个 tick 立即返回，跳过以避免启动即清扫
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match storage.release_stale_claims(timeout).await {
                Ok(0) => {}
                Ok(released) => {
                    info!("Released {} stale peer-grading claims", released);
                }
                Err(e) => {
                    warn!("Failed to release stale claims: {}", e);
                }
            }
        }
    });
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和质量检查器
pub async fn prepare_server_startup() -> StartupContext {
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号（如果需要）
    seed_admin(&storage).await;

    // 创建缓存实例
    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    let quality: Arc<dyn QualityCheck> = Arc::new(BasicQualityCheck);

    StartupContext {
        storage,
        cache,
        quality,
    }
}

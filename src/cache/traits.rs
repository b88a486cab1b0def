use async_trait::async_trait;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult {
    Found(String),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// 读取原始字符串值
    async fn get_raw(&self, key: &str) -> CacheResult;
    /// 写入原始字符串值，ttl 单位秒（后端可忽略按全局策略处理）
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    /// 删除单个键
    async fn remove(&self, key: &str);
    /// 清空缓存
    async fn invalidate_all(&self);
}

//! 对象缓存层
//!
//! 通过插件注册表选择缓存后端，当前内置 Moka（进程内）。
//! 用于认证用户查找与校准计数读取（计数允许最终一致，见路由器）。

pub mod object_cache;
pub mod register;
mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明一个缓存后端插件，进程启动时自动注册到插件表
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $plugin:ty) => {
        #[ctor::ctor]
        fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        match <$plugin>::new() {
                            Ok(plugin) => {
                                Ok(Box::new(plugin) as Box<dyn $crate::cache::ObjectCache>)
                            }
                            Err(e) => Err($crate::errors::ControllerError::cache_connection(e)),
                        }
                    })
                        as $crate::cache::register::BoxedObjectCacheFuture
                }),
            );
        }
    };
}

use crate::cache::ObjectCache;
use crate::errors::{ExamSystemError, Result};
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

static OBJECT_CACHE_REGISTRY: Lazy<RwLock<HashMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    let mut registry = OBJECT_CACHE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.insert(name.into(), constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned()
}

fn moka_constructor() -> BoxedObjectCacheFuture {
    Box::pin(async {
        let cache: Box<dyn ObjectCache> =
            Box::new(super::object_cache::moka::MokaObjectCache::from_config());
        Ok::<_, ExamSystemError>(cache)
    })
}

fn redis_constructor() -> BoxedObjectCacheFuture {
    Box::pin(async {
        let cache: Box<dyn ObjectCache> =
            Box::new(super::object_cache::redis::RedisObjectCache::connect().await?);
        Ok::<_, ExamSystemError>(cache)
    })
}

/// 注册内置缓存后端，可重复调用
pub fn register_builtin_object_caches() {
    register_object_cache_plugin("moka", Arc::new(moka_constructor));
    register_object_cache_plugin("redis", Arc::new(redis_constructor));
}

pub fn debug_object_cache_registry() {
    let registry = OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut names: Vec<&String> = registry.keys().collect();
    names.sort();
    tracing::debug!("Registered object cache plugins: {:?}", names);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_plugins_registered() {
        register_builtin_object_caches();
        assert!(get_object_cache_plugin("moka").is_some());
        assert!(get_object_cache_plugin("redis").is_some());
        assert!(get_object_cache_plugin("memcached").is_none());
    }
}

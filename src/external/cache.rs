use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// 会话级缓存：只填充一次，之后在整个会话内复用
///
/// 填充失败不会被缓存，下一次调用会重新尝试。
#[derive(Debug)]
pub struct SessionCache<T> {
    slot: Arc<OnceCell<T>>,
    hits: Arc<AtomicU64>,
    fills: Arc<AtomicU64>,
}

impl<T> Clone for SessionCache<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            hits: self.hits.clone(),
            fills: self.fills.clone(),
        }
    }
}

impl<T: Clone> SessionCache<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(OnceCell::new()),
            hits: Arc::new(AtomicU64::new(0)),
            fills: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.slot.get().cloned()
    }

    /// 命中则直接返回；否则执行 `fill`，并发调用只会有一个真正执行
    pub async fn get_or_try_fill<F, Fut, E>(&self, fill: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }

        let fills = self.fills.clone();
        let value = self
            .slot
            .get_or_try_init(|| async move {
                let value = fill().await?;
                fills.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            })
            .await?;
        Ok(value.clone())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            filled: self.slot.initialized(),
            hits: self.hits.load(Ordering::Relaxed),
            fills: self.fills.load(Ordering::Relaxed),
        }
    }
}

impl<T: Clone> Default for SessionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub filled: bool,
    pub hits: u64,
    pub fills: u64,
}

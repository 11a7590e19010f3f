use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 防抖调度器：同一时间最多保留一个待执行任务
///
/// 新的调度会取消尚在静默期内的旧任务。取消只作用于静默期，
/// 任务一旦开始执行（例如网络请求已经发出）就会运行到结束。
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 在静默期后执行 `task`，并取消之前尚未执行的任务
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let guard = token.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            task.await;
        });

        if let Some(previous) = self.lock_pending().replace(token) {
            previous.cancel();
        }
    }

    /// 取消尚在静默期内的任务
    pub fn cancel(&self) {
        if let Some(previous) = self.lock_pending().take() {
            previous.cancel();
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

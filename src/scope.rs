//! Structured-concurrency scope for processors and their consumers.
//!
//! A [`Scope`] owns cancellation for everything spawned through it. Tasks
//! are grouped in [`TaskGroup`]s: a panic in any member tears the whole
//! group down while the rest of the scope keeps running.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::AbortHandle;

struct ScopeInner {
    cancelled: AtomicBool,
    notify: Notify,
    runtime: Option<Handle>,
}

/// Owner of a cancellation scope. Dropping it cancels the scope.
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Create a scope bound to the current tokio runtime, if any.
    ///
    /// Once bound, tasks can be spawned into the scope from any thread.
    pub fn new() -> Self {
        Self::with_runtime_opt(Handle::try_current().ok())
    }

    /// Create a scope that spawns onto `runtime`.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self::with_runtime_opt(Some(runtime))
    }

    fn with_runtime_opt(runtime: Option<Handle>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
                runtime,
            }),
        }
    }

    /// Cancel every task spawned in this scope.
    pub fn cancel(&self) {
        self.handle().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Create a handle for sharing
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Lightweight handle for spawning into and observing a scope.
///
/// Dropping a handle never cancels the scope.
#[derive(Clone)]
pub struct ScopeHandle {
    inner: Arc<ScopeInner>,
}

impl ScopeHandle {
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!("Scope cancelled");
            self.inner.notify.notify_waiters();
        }
    }

    /// Resolve once the scope is cancelled.
    pub async fn cancelled(&self) {
        // Register with Notify before checking the flag: a cancel() between
        // the check and the await would otherwise be missed.
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Runtime that tasks of this scope run on: the bound one, otherwise
    /// the runtime of the calling thread.
    fn runtime(&self) -> Option<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }

    /// Create a task group whose members stop when this scope is cancelled.
    pub fn task_group(&self, label: impl Into<String>) -> TaskGroup {
        TaskGroup {
            inner: Arc::new(GroupInner {
                label: label.into(),
                scope: self.clone(),
                failed: AtomicBool::new(false),
                handles: Mutex::new(Vec::new()),
            }),
        }
    }
}

struct GroupInner {
    label: String,
    scope: ScopeHandle,
    failed: AtomicBool,
    handles: Mutex<Vec<AbortHandle>>,
}

/// Set of tasks that live and die together.
#[derive(Clone)]
pub struct TaskGroup {
    inner: Arc<GroupInner>,
}

impl TaskGroup {
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// True once any member panicked or [`TaskGroup::abort`] was called.
    pub fn is_failed(&self) -> bool {
        self.inner.failed.load(Ordering::SeqCst)
    }

    /// True while the group can still accept and run tasks.
    pub fn is_active(&self) -> bool {
        !self.is_failed() && !self.inner.scope.is_cancelled()
    }

    /// Spawn `fut` as a member of the group.
    ///
    /// The task races scope cancellation. A panic inside `fut` is logged
    /// and aborts every other member. Returns `false` when the group is no
    /// longer active, or when no runtime is reachable, and nothing was
    /// spawned. Safe to call from threads outside the runtime.
    pub fn spawn<F>(&self, task: &'static str, fut: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.is_active() {
            tracing::debug!(group = %self.inner.label, task, "Spawn skipped: group inactive");
            return false;
        }
        let Some(runtime) = self.inner.scope.runtime() else {
            tracing::warn!(group = %self.inner.label, task, "Spawn skipped: no tokio runtime");
            return false;
        };

        let group = self.clone();
        let scope = self.inner.scope.clone();
        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = scope.cancelled() => {}
                result = AssertUnwindSafe(fut).catch_unwind() => {
                    if let Err(panic) = result {
                        group.fail(task, panic);
                    }
                }
            }
        });

        let mut handles = self.inner.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle.abort_handle());
        drop(handles);

        // A sibling may have failed between the activity check and the push.
        if self.is_failed() {
            self.abort();
        }
        true
    }

    /// Abort every member without touching the rest of the scope.
    pub fn abort(&self) {
        self.inner.failed.store(true, Ordering::SeqCst);
        for handle in self.inner.handles.lock().drain(..) {
            handle.abort();
        }
    }

    fn fail(&self, task: &'static str, panic: Box<dyn Any + Send>) {
        tracing::error!(
            group = %self.inner.label,
            task,
            reason = %panic_message(panic.as_ref()),
            "Task panicked; stopping group"
        );
        self.abort();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let scope = Scope::new();
        let handle = scope.handle();
        let waiter = tokio::spawn(async move { handle.cancelled().await });

        scope.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancelled() did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_cancelled() {
        let scope = Scope::new();
        scope.cancel();
        tokio::time::timeout(Duration::from_millis(100), scope.handle().cancelled())
            .await
            .expect("cancelled() should return immediately");
    }

    #[tokio::test]
    async fn drop_cancels_scope() {
        let scope = Scope::new();
        let handle = scope.handle();
        drop(scope);
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn spawn_into_cancelled_scope_is_skipped() {
        let scope = Scope::new();
        let group = scope.handle().task_group("test");
        scope.cancel();
        assert!(!group.spawn("noop", async {}));
    }

    #[tokio::test]
    async fn panic_aborts_sibling_tasks() {
        let scope = Scope::new();
        let group = scope.handle().task_group("test");
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&ticks);
        group.spawn("ticker", async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        group.spawn("boom", async { panic!("boom") });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(group.is_failed());
        let after_failure = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_failure);
        assert!(!scope.is_cancelled());
    }

    #[test]
    fn spawn_from_plain_thread_uses_bound_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let scope = Scope::with_runtime(runtime.handle().clone());
        let group = scope.handle().task_group("test");
        let ran = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&ran);
        let spawned = std::thread::spawn(move || {
            group.spawn("outside", async move { flag.store(true, Ordering::SeqCst) })
        })
        .join()
        .unwrap();

        assert!(spawned);
        runtime.block_on(async {
            for _ in 0..200 {
                if ran.load(Ordering::SeqCst) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn spawn_without_runtime_is_skipped() {
        let scope = Scope::new();
        let group = scope.handle().task_group("test");
        assert!(!group.spawn("noop", async {}));
        assert!(group.is_active());
    }
}

// Background work is started on whatever tokio runtime is current. Callers may
// be polled by another executor, so a missing runtime is logged, not a panic.

use std::future::Future;
use tokio::task::JoinHandle;

pub(crate) fn try_spawn<F>(component: &str, what: &str, fut: F) -> Option<JoinHandle<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(fut)),
        Err(_) => {
            log::warn!("[{}] no async runtime, {} dropped", component, what);
            None
        }
    }
}

use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Runs `future`, converting a panic into `Err(message)`.
///
/// Spawned loads use this so a misbehaving fetcher still produces a
/// settlement instead of a silently dropped completion channel.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "non-string panic payload".to_string()
            }
        })
}

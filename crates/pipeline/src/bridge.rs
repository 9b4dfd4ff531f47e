//! Callback-to-future bridge.

use tokio::sync::oneshot;
use vidmark_common::error::ToolkitError;

use crate::toolkit::Completion;

/// The toolkit dropped a completion handler without calling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} completion handler was dropped without being called")]
pub(crate) struct Abandoned {
    pub operation: &'static str,
}

impl From<Abandoned> for ToolkitError {
    fn from(err: Abandoned) -> Self {
        ToolkitError::new(err.to_string())
    }
}

/// Hand a one-shot completion handler to `start` and wait for it to fire.
///
/// `start` runs synchronously before the first await; the handler may be
/// called from any thread, before or after `start` returns.
pub(crate) async fn suspend<T, F>(operation: &'static str, start: F) -> Result<T, Abandoned>
where
    T: Send + 'static,
    F: FnOnce(Completion<T>),
{
    let (tx, rx) = oneshot::channel();
    start(Box::new(move |value: T| {
        if tx.send(value).is_err() {
            tracing::debug!(operation, "Completion arrived after the caller stopped waiting");
        }
    }));
    rx.await.map_err(|_| Abandoned { operation })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resumes_with_synchronous_completion() {
        let value = suspend("load", |done: Completion<u32>| done(7)).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn test_resumes_from_other_thread() {
        let value = suspend("load", |done: Completion<&'static str>| {
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(10));
                done("tracks");
            });
        })
        .await;
        assert_eq!(value, Ok("tracks"));
    }

    #[tokio::test]
    async fn test_dropped_handler_is_abandoned() {
        let value = suspend("export", |done: Completion<u32>| drop(done)).await;
        assert_eq!(value, Err(Abandoned { operation: "export" }));

        let cause: ToolkitError = Abandoned { operation: "export" }.into();
        assert!(cause.message.contains("export"));
    }
}

//! Task-local trace id for the request currently being served.
//!
//! `RequestTrace` opens the scope; anything running inside the request future
//! (extractors, handlers, `AppError::error_response`) can read it.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

const OUTSIDE_REQUEST: &str = "unknown";

/// Trace id of the current request, or `"unknown"` outside one.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| OUTSIDE_REQUEST.to_string())
}

/// Run `future` with `trace_id` visible to [`trace_id()`].
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_outside_scope() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn scope_is_visible_and_restored() {
        let seen = with_trace_id("outer".to_string(), async {
            let inner = with_trace_id("inner".to_string(), async { trace_id() }).await;
            (trace_id(), inner)
        })
        .await;

        assert_eq!(seen, ("outer".to_string(), "inner".to_string()));
        assert_eq!(trace_id(), "unknown");
    }
}

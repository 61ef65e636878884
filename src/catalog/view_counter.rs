use crate::app::ports::{CatalogSource, Session};
use crate::observability::metrics;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};

/// Fire-and-forget notification that a test's document was opened.
#[derive(Clone)]
pub struct ViewCounter {
    source: Arc<dyn CatalogSource>,
}

impl ViewCounter {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Issue exactly one view-increment request for `test_id` on a background
    /// task. The caller does not wait; failures are only logged. The handle is
    /// returned for callers (and tests) that want to await completion anyway.
    pub fn trigger(&self, session: &Session, test_id: i64) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let token = session.token().cloned();
        metrics::views::triggered();

        tokio::spawn(
            async move {
                if let Err(e) = source.notify_test_viewed(token.as_ref(), test_id).await {
                    metrics::views::failed();
                    debug!("view notification failed: {}", e);
                }
            }
            .instrument(info_span!("view_trigger", test_id)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{operation, SessionToken};
    use crate::infra::in_memory::InMemoryCatalog;

    #[tokio::test]
    async fn test_trigger_sends_one_request() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let counter = ViewCounter::new(catalog.clone());
        let session = Session::Authenticated(SessionToken::new("t"));

        counter.trigger(&session, 10).await.unwrap();
        assert_eq!(catalog.calls().await, vec![operation::NOTIFY_TEST_VIEWED]);
        assert_eq!(catalog.viewed().await, vec![10]);
    }

    #[tokio::test]
    async fn test_trigger_swallows_failures_and_needs_no_session() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.fail_on(operation::NOTIFY_TEST_VIEWED).await;
        let counter = ViewCounter::new(catalog.clone());

        // the spawned task completes normally even though the request failed
        counter.trigger(&Session::Unauthenticated, 11).await.unwrap();
        assert_eq!(catalog.calls().await, vec![operation::NOTIFY_TEST_VIEWED]);
        assert!(catalog.viewed().await.is_empty());
    }
}

use async_trait::async_trait;

use super::SessionEvent;

/// Handles session events asynchronously.
///
/// Called for every dispatched event; match on the variant to filter.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &SessionEvent);
}

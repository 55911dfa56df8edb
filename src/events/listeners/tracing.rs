use async_trait::async_trait;

use crate::events::{Listener, SessionEvent};

/// Emits session events as `tracing` events. Requires the `tracing` feature.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &SessionEvent) {
        tracing::info!(
            target: "autodig_session::events",
            event_name = event.name(),
            ends_session = event.ends_session(),
            ?event,
            "session event"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn test_tracing_listener_handle() {
        TracingListener
            .handle(&SessionEvent::TokenValidated {
                user_id: "1".to_owned(),
                at: Utc::now(),
            })
            .await;
    }
}

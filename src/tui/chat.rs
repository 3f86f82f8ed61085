use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::llm::{ChatClient, ChatError, Message, RequestKind};

/// Outcome of one completion request, delivered back to the UI loop
#[derive(Debug)]
pub struct ChatEvent {
    pub request_id: u64,
    pub kind: RequestKind,
    pub result: Result<String, ChatError>,
}

/// Runs completion requests off the UI loop.
///
/// Requests are not serialized: several may be in flight and their
/// events arrive in whatever order they finish.
pub struct ChatHandler {
    client: Arc<dyn ChatClient>,
    sender: UnboundedSender<ChatEvent>,
    next_id: u64,
}

impl ChatHandler {
    pub fn new(client: Arc<dyn ChatClient>) -> (Self, UnboundedReceiver<ChatEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handler = Self {
            client,
            sender,
            next_id: 0,
        };
        (handler, receiver)
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Start a request with a snapshot of the history
    pub fn spawn(&mut self, history: Vec<Message>, kind: RequestKind) -> u64 {
        self.next_id += 1;
        let request_id = self.next_id;
        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();

        debug!(request_id, ?kind, turns = history.len(), "Spawning completion request");

        tokio::spawn(async move {
            let result = client.complete(&history, kind).await;
            // The receiver is gone only when the app is shutting down
            let _ = sender.send(ChatEvent {
                request_id,
                kind,
                result,
            });
        });

        request_id
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedClient;
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawned_request_reports_back() {
        let client = Arc::new(ScriptedClient::with_replies(vec![Ok("Use SPF".to_string())]));
        let (mut handler, mut receiver) = ChatHandler::new(client.clone());
        assert_eq!(handler.model_name(), "scripted");

        let id = handler.spawn(vec![Message::user("sunscreen?")], RequestKind::FollowUp);
        let event = receiver.recv().await.expect("event delivered");

        assert_eq!(event.request_id, id);
        assert_eq!(event.kind, RequestKind::FollowUp);
        assert_eq!(event.result, Ok("Use SPF".to_string()));
        assert_eq!(client.calls.lock().unwrap()[0].0.len(), 1);
    }

    #[tokio::test]
    async fn test_events_arrive_in_completion_order() {
        let client = Arc::new(ScriptedClient::with_delayed_replies(vec![
            (Duration::from_millis(200), Ok("slow".to_string())),
            (Duration::ZERO, Ok("fast".to_string())),
        ]));
        let (mut handler, mut receiver) = ChatHandler::new(client);

        let slow = handler.spawn(vec![Message::user("first")], RequestKind::Routine);
        // Let the first call claim the slow reply before the second starts
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = handler.spawn(vec![Message::user("second")], RequestKind::FollowUp);

        let first = receiver.recv().await.expect("first event");
        let second = receiver.recv().await.expect("second event");
        assert_eq!(first.request_id, fast);
        assert_eq!(second.request_id, slow);
        assert_eq!(second.result, Ok("slow".to_string()));
    }
}

//! Running chat and routine turns against a shared [`PickerSession`].
//!
//! The session lock is held only while the log and transcript change; the
//! assistant call runs with the lock released, so selection changes and other
//! turns can interleave. Overlapping turns are not ordered.

use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assistant::{Assistant, AssistantError};
use crate::conversation::EntryKind;
use crate::error::Result;
use crate::routine::{routine_request, EMPTY_SELECTION_NOTICE};
use crate::session::PickerSession;
use crate::types::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Chat,
    Routine,
}

impl TurnKind {
    fn pending_text(self) -> &'static str {
        match self {
            TurnKind::Chat => "Thinking...",
            TurnKind::Routine => "Generating your routine...",
        }
    }

    fn fallback_reply(self) -> &'static str {
        match self {
            TurnKind::Chat => "Sorry, no response.",
            TurnKind::Routine => "Sorry, no routine generated.",
        }
    }

    fn error_text(self) -> &'static str {
        match self {
            TurnKind::Chat => "Error connecting to chatbot.",
            TurnKind::Routine => "Error generating routine.",
        }
    }

    fn reply_kind(self) -> EntryKind {
        match self {
            TurnKind::Chat => EntryKind::Assistant,
            TurnKind::Routine => EntryKind::Routine,
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing to send (blank chat input).
    Ignored,
    /// Refused locally with a notice; no call was made.
    Refused,
    /// The assistant answered; carries the text appended to the log.
    Replied(String),
    /// The call failed; the generic error line was shown.
    Failed,
}

/// A turn whose request has been logged and is waiting on the assistant.
struct PendingTurn {
    kind: TurnKind,
    marker: Uuid,
    messages: Vec<ChatMessage>,
}

impl PickerSession {
    fn begin_turn(&mut self, kind: TurnKind, request: ChatMessage) -> PendingTurn {
        self.push_turn(request);
        let marker = self.show(EntryKind::Pending, kind.pending_text());
        PendingTurn {
            kind,
            marker,
            messages: self.conversation().messages().to_vec(),
        }
    }

    fn finish_turn(
        &mut self,
        turn: PendingTurn,
        result: std::result::Result<Option<String>, AssistantError>,
    ) -> TurnOutcome {
        self.unshow(turn.marker);
        match result {
            Ok(reply) => {
                let reply = reply.unwrap_or_else(|| turn.kind.fallback_reply().to_string());
                self.push_turn(ChatMessage::assistant(reply.clone()));
                self.show(turn.kind.reply_kind(), reply.clone());
                TurnOutcome::Replied(reply)
            }
            Err(e) => {
                warn!("Assistant call failed: {}", e);
                self.show(EntryKind::Error, turn.kind.error_text());
                TurnOutcome::Failed
            }
        }
    }
}

async fn run_turn(
    session: &RwLock<PickerSession>,
    assistant: &dyn Assistant,
    turn: PendingTurn,
) -> TurnOutcome {
    debug!("Sending {:?} turn ({} messages)", turn.kind, turn.messages.len());
    let result = assistant.send(&turn.messages).await;
    session.write().await.finish_turn(turn, result)
}

/// Send a free-form chat message.
pub async fn submit_chat(
    session: &RwLock<PickerSession>,
    assistant: &dyn Assistant,
    input: &str,
) -> TurnOutcome {
    let input = input.trim();
    if input.is_empty() {
        return TurnOutcome::Ignored;
    }

    let turn = {
        let mut s = session.write().await;
        s.show(EntryKind::User, input);
        s.begin_turn(TurnKind::Chat, ChatMessage::user(input))
    };
    run_turn(session, assistant, turn).await
}

/// Ask for a routine built from the selected products. With nothing
/// selected that the catalog knows, shows a notice and sends nothing.
pub async fn generate_routine(
    session: &RwLock<PickerSession>,
    assistant: &dyn Assistant,
) -> Result<TurnOutcome> {
    let turn = {
        let mut s = session.write().await;
        let products = s.selected_products();
        if products.is_empty() {
            s.show(EntryKind::Notice, EMPTY_SELECTION_NOTICE);
            return Ok(TurnOutcome::Refused);
        }
        let request = routine_request(&products)?;
        s.begin_turn(TurnKind::Routine, ChatMessage::user(request))
    };
    Ok(run_turn(session, assistant, turn).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::session::tests::open_session;
    use crate::storage::MemoryStore;
    use crate::types::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fake assistant that records every request and answers from a script.
    struct ScriptedAssistant {
        reply: Option<Option<String>>,
        calls: AtomicUsize,
        last: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedAssistant {
        fn replying(text: &str) -> Self {
            Self::new(Some(Some(text.to_string())))
        }

        fn failing() -> Self {
            Self::new(None)
        }

        fn new(reply: Option<Option<String>>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Assistant for ScriptedAssistant {
        async fn send(
            &self,
            messages: &[ChatMessage],
        ) -> std::result::Result<Option<String>, AssistantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = messages.to_vec();
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(AssistantError::Status(500)),
            }
        }
    }

    fn shared_session() -> RwLock<PickerSession> {
        let mut session = open_session(Arc::new(MemoryStore::new()));
        session.set_catalog(sample_catalog());
        RwLock::new(session)
    }

    fn transcript_lines(session: &PickerSession) -> Vec<(EntryKind, String)> {
        session
            .transcript()
            .entries()
            .iter()
            .map(|e| (e.kind, e.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_chat_success_appends_both_turns() {
        let session = shared_session();
        let assistant = ScriptedAssistant::replying("Try a gentle cleanser.");

        let outcome = submit_chat(&session, &assistant, "  what cleanser?  ").await;
        assert_eq!(outcome, TurnOutcome::Replied("Try a gentle cleanser.".into()));

        let s = session.read().await;
        let roles: Vec<_> = s.conversation().messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(s.conversation().messages()[1].content, "what cleanser?");
        assert_eq!(
            transcript_lines(&s),
            vec![
                (EntryKind::User, "what cleanser?".to_string()),
                (EntryKind::Assistant, "Try a gentle cleanser.".to_string()),
            ]
        );
        // The request carried the whole log up to and including the user turn.
        assert_eq!(assistant.last.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_user_turn_and_shows_error() {
        let session = shared_session();
        let assistant = ScriptedAssistant::failing();

        let outcome = submit_chat(&session, &assistant, "hello").await;
        assert_eq!(outcome, TurnOutcome::Failed);

        let s = session.read().await;
        let roles: Vec<_> = s.conversation().messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(
            transcript_lines(&s),
            vec![
                (EntryKind::User, "hello".to_string()),
                (EntryKind::Error, "Error connecting to chatbot.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_chat_missing_reply_uses_fallback() {
        let session = shared_session();
        let assistant = ScriptedAssistant::new(Some(None));

        let outcome = submit_chat(&session, &assistant, "hello").await;
        assert_eq!(outcome, TurnOutcome::Replied("Sorry, no response.".into()));
        let s = session.read().await;
        assert_eq!(s.conversation().messages()[2].content, "Sorry, no response.");
    }

    #[tokio::test]
    async fn test_blank_chat_is_ignored() {
        let session = shared_session();
        let assistant = ScriptedAssistant::replying("x");
        assert_eq!(submit_chat(&session, &assistant, "   ").await, TurnOutcome::Ignored);
        assert_eq!(assistant.calls(), 0);
        assert!(session.read().await.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_routine_without_selection_makes_no_call() {
        let session = shared_session();
        let assistant = ScriptedAssistant::replying("x");

        let outcome = generate_routine(&session, &assistant).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Refused);
        assert_eq!(assistant.calls(), 0);

        let s = session.read().await;
        assert_eq!(s.conversation().len(), 1);
        assert_eq!(
            transcript_lines(&s),
            vec![(EntryKind::Notice, EMPTY_SELECTION_NOTICE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_routine_with_only_stale_names_makes_no_call() {
        let session = shared_session();
        session.write().await.toggle("Discontinued Toner").unwrap();
        let assistant = ScriptedAssistant::replying("x");

        let outcome = generate_routine(&session, &assistant).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Refused);
        assert_eq!(assistant.calls(), 0);
    }

    #[tokio::test]
    async fn test_routine_sends_selected_products() {
        let session = shared_session();
        {
            let mut s = session.write().await;
            s.toggle("Product C").unwrap();
            s.toggle("Gone").unwrap();
            s.toggle("Product A").unwrap();
        }
        let assistant = ScriptedAssistant::replying("1. Cleanse\n2. Moisturize");

        let outcome = generate_routine(&session, &assistant).await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Replied(_)));
        assert_eq!(assistant.calls(), 1);

        let sent = assistant.last.lock().unwrap().clone();
        let request = &sent.last().unwrap().content;
        assert!(request.starts_with("Here are the selected products as JSON:"));
        assert!(request.contains("Product C"));
        assert!(request.contains("Product A"));
        assert!(!request.contains("Gone"));
        assert!(request.find("Product C").unwrap() < request.find("Product A").unwrap());

        let s = session.read().await;
        let last = s.transcript().entries().last().unwrap();
        assert_eq!(last.kind, EntryKind::Routine);
        assert_eq!(last.text, "1. Cleanse\n2. Moisturize");
    }

    #[tokio::test]
    async fn test_routine_failure_shows_routine_error() {
        let session = shared_session();
        session.write().await.toggle("Product B").unwrap();
        let assistant = ScriptedAssistant::failing();

        let outcome = generate_routine(&session, &assistant).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Failed);

        let s = session.read().await;
        assert_eq!(s.conversation().len(), 2);
        let last = s.transcript().entries().last().unwrap();
        assert_eq!(last.text, "Error generating routine.");
        assert!(s
            .transcript()
            .entries()
            .iter()
            .all(|e| e.kind != EntryKind::Pending));
    }

    /// Echoes the latest user message; messages mentioning "slow" take a while.
    struct EchoAssistant;

    #[async_trait]
    impl Assistant for EchoAssistant {
        async fn send(
            &self,
            messages: &[ChatMessage],
        ) -> std::result::Result<Option<String>, AssistantError> {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            if last.contains("slow") {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            Ok(Some(format!("re: {}", last)))
        }
    }

    #[tokio::test]
    async fn test_overlapping_chats_each_finish_their_own_turn() {
        let session = shared_session();
        let assistant = EchoAssistant;

        let (slow, fast) = tokio::join!(
            submit_chat(&session, &assistant, "slow question"),
            submit_chat(&session, &assistant, "fast question"),
        );
        assert_eq!(slow, TurnOutcome::Replied("re: slow question".into()));
        assert_eq!(fast, TurnOutcome::Replied("re: fast question".into()));

        let s = session.read().await;
        assert_eq!(s.conversation().len(), 5);
        assert_eq!(
            transcript_lines(&s),
            vec![
                (EntryKind::User, "slow question".to_string()),
                (EntryKind::User, "fast question".to_string()),
                (EntryKind::Assistant, "re: fast question".to_string()),
                (EntryKind::Assistant, "re: slow question".to_string()),
            ]
        );
    }
}

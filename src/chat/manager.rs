//! Conversation manager — one user's chat session.
//!
//! Holds the transcript, answers from the canned disease table when a keyword
//! matches, otherwise forwards the whole transcript to the completion
//! service. Every local append is mirrored to the realtime store by full
//! overwrite; persistence failures are logged and swallowed, never surfaced.

use std::sync::Arc;

use tracing::{debug, warn};

use super::canned::CannedResponses;
use super::message::{ChatMessage, Transcript};
use crate::llm::CompletionProvider;
use crate::store::{RealtimeStore, StoreSubscription, chat_path};

/// Fixed assistant reply appended when the completion call fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error while processing your request.";

/// One user's conversation: transcript state plus the send workflow.
///
/// The busy flag is advisory only; a caller that ignores it can interleave
/// two sends, and whichever remote overwrite resolves last wins.
pub struct ConversationManager {
    llm: Arc<dyn CompletionProvider>,
    store: Arc<dyn RealtimeStore>,
    canned: CannedResponses,
    transcript: Transcript,
    user_id: Option<String>,
    subscription: Option<StoreSubscription>,
    busy: bool,
}

impl ConversationManager {
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        store: Arc<dyn RealtimeStore>,
        canned: CannedResponses,
    ) -> Self {
        Self {
            llm,
            store,
            canned,
            transcript: Transcript::new(),
            user_id: None,
            subscription: None,
            busy: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Open a live subscription to the user's remote transcript. No-op when
    /// `user_id` is `None`. Replaces any prior subscription, so switching
    /// users cannot leave a stale watcher feeding this conversation.
    pub async fn load_transcript(&mut self, user_id: Option<&str>) {
        let Some(user_id) = user_id else {
            return;
        };

        self.subscription = None;
        match self.store.watch(&chat_path(user_id)).await {
            Ok(subscription) => {
                self.user_id = Some(user_id.to_string());
                self.subscription = Some(subscription);
            }
            Err(e) => {
                warn!(user_id, error = %e, "failed to subscribe to remote transcript");
                self.user_id = Some(user_id.to_string());
            }
        }
    }

    /// Wait for the next remote change and replace the local transcript with
    /// it wholesale. Returns `false` when there is no active subscription or
    /// it has closed.
    pub async fn recv_remote_update(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        match subscription.next().await {
            Some(value) => {
                match serde_json::from_value::<Vec<ChatMessage>>(value) {
                    Ok(messages) => {
                        debug!(turns = messages.len(), "remote transcript update");
                        self.transcript.replace(messages);
                    }
                    Err(e) => warn!(error = %e, "malformed remote transcript, keeping local"),
                }
                true
            }
            None => {
                self.subscription = None;
                false
            }
        }
    }

    /// End the conversation context: cancel the subscription and detach the
    /// user. Must be called when switching users.
    pub fn close(&mut self) {
        self.subscription = None;
        self.user_id = None;
    }

    /// The send workflow. Never returns an error: every failure path degrades
    /// to a visible assistant message, and persistence failures are only
    /// logged.
    pub async fn send_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        self.transcript.push(ChatMessage::user(text));
        self.persist().await;
        self.busy = true;

        if let Some(reply) = self.canned.lookup(text) {
            debug!("canned response matched, skipping completion service");
            self.transcript.push(ChatMessage::assistant(reply));
            self.persist().await;
            self.busy = false;
            return;
        }

        let reply = match self.llm.complete(self.transcript.messages()).await {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "completion request failed");
                ChatMessage::assistant(FALLBACK_REPLY)
            }
        };

        self.transcript.push(reply);
        self.persist().await;
        self.busy = false;
    }

    /// Mirror the full transcript to the remote store. Fire-and-forget: a
    /// failure is logged and local state is kept.
    async fn persist(&self) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };

        let value = match serde_json::to_value(self.transcript.messages()) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to serialize transcript");
                return;
            }
        };

        if let Err(e) = self.store.put(&chat_path(user_id), value).await {
            warn!(user_id, error = %e, "failed to persist transcript");
        }
    }
}

//! Dispatch loop: one inbound message in, one state transition out.
//!
//! Collection transitions run inline on the loop so a conversation never
//! sees two interleaved replies. Generation is the slow path and runs in a
//! spawned task per conversation; the session sits in `Generating` while it
//! does, which makes further input bounce off the collector.

use super::Progress;
use crate::access::{self, KeyStore, RedeemOutcome};
use crate::channels::{Channel, ChannelMessage, DocumentPayload};
use crate::paper::{PaperRequest, Requestor};
use crate::pdf;
use crate::sessions::{collector, DialogState, SessionStore};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct Orchestrator {
    channel: Arc<dyn Channel>,
    store: Arc<dyn SessionStore>,
    keys: Arc<KeyStore>,
    requestor: Arc<Requestor>,
    // Tests drain this to await in-flight generations deterministically.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Orchestrator {
    pub fn new(
        channel: Arc<dyn Channel>,
        store: Arc<dyn SessionStore>,
        keys: Arc<KeyStore>,
        requestor: Arc<Requestor>,
    ) -> Arc<Self> {
        Arc::new(Self {
            channel,
            store,
            keys,
            requestor,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Run until the channel stops producing messages.
    pub async fn run(self: &Arc<Self>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<ChannelMessage>(100);

        let channel = Arc::clone(&self.channel);
        let listener = tokio::spawn(async move { channel.listen(tx).await });

        info!(channel = self.channel.name(), "dispatch loop started");
        while let Some(message) = rx.recv().await {
            self.handle_message(&message).await;
        }

        listener.await??;
        Ok(())
    }

    /// Process one inbound message. Replies are best-effort; a send failure
    /// is logged and the conversation state stays consistent either way.
    pub async fn handle_message(self: &Arc<Self>, message: &ChannelMessage) {
        let text = message.content.trim();
        if text.is_empty() {
            return;
        }

        let reply = if let Some(command) = text.strip_prefix('/') {
            self.handle_command(command, message).await
        } else {
            self.handle_dialogue(text, message)
        };

        if let Some(reply) = reply {
            if let Err(e) = self.channel.send(&reply, &message.chat_id).await {
                warn!(chat_id = %message.chat_id, error = %e, "failed to send reply");
            }
        }
    }

    async fn handle_command(
        self: &Arc<Self>,
        command: &str,
        message: &ChannelMessage,
    ) -> Option<String> {
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        // Telegram group syntax: /start@my_bot
        let name = name.split('@').next().unwrap_or(name);

        match name {
            "start" => {
                self.store.create(&message.chat_id);
                info!(chat_id = %message.chat_id, "new session");
                Some(collector::prompt_welcome())
            }
            "help" => Some(collector::prompt_help()),
            "cancel" => {
                if self.store.discard(&message.chat_id) {
                    Some("🗑 Session cancelled. Send /start to begin a new paper.".to_string())
                } else {
                    Some("Nothing to cancel. Send /start to begin.".to_string())
                }
            }
            "redeem" => Some(self.redeem(arg, &message.sender)),
            _ => Some("Unknown command. Send /help for the list.".to_string()),
        }
    }

    fn redeem(&self, key: &str, user: &str) -> String {
        if key.is_empty() {
            return format!("Usage: /redeem {}XXXXXXXXXX", access::KEY_PREFIX);
        }
        match self.keys.redeem(key, user) {
            Ok(RedeemOutcome::Activated) => format!(
                "✅ Access key activated — you can now request up to {} pages.",
                collector::PAGE_MAX
            ),
            Ok(RedeemOutcome::AlreadyYours) => {
                "This key is already active on your account.".to_string()
            }
            Ok(RedeemOutcome::AlreadyUsed) => {
                "❌ This key has already been redeemed by someone else.".to_string()
            }
            Ok(RedeemOutcome::Invalid) => "❌ Unknown access key.".to_string(),
            Err(e) => {
                error!(error = %e, "key store failure during redeem");
                "⚠️ Could not check that key right now. Try again in a moment.".to_string()
            }
        }
    }

    /// Non-command text: one collector transition, then maybe kick off
    /// generation.
    fn handle_dialogue(self: &Arc<Self>, text: &str, message: &ChannelMessage) -> Option<String> {
        let Some(mut session) = self.store.get(&message.chat_id) else {
            if access::looks_like_key(text) {
                return Some(format!("To activate a key, send: /redeem {}", text.trim()));
            }
            return Some("Send /start to begin a new paper.".to_string());
        };

        if session.state == DialogState::Generating {
            return Some("⏳ Your paper is being generated — hang on.".to_string());
        }

        let page_cap = self.keys.page_cap(&message.sender);
        match collector::submit(&mut session, text, page_cap) {
            Ok(reply) => {
                let ready = session.is_ready();
                // Snapshot before the state flip: PaperRequest::from_session
                // needs the Ready state the collector just produced.
                let snapshot = session.clone();
                if ready {
                    session.state = DialogState::Generating;
                }
                self.store.replace(session);
                if ready {
                    self.spawn_generation(snapshot);
                }
                Some(reply)
            }
            Err(e) => Some(format!("⚠️ {e}")),
        }
    }

    fn spawn_generation(self: &Arc<Self>, session: crate::sessions::Session) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.generate_and_deliver(session).await;
        });
        self.tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(handle);
    }

    async fn generate_and_deliver(self: Arc<Self>, session: crate::sessions::Session) {
        let chat_id = session.chat_id.clone();
        let Some(request) = PaperRequest::from_session(&session) else {
            // Unreachable from the dispatch loop; guards hand-built sessions.
            error!(chat_id = %chat_id, "generation spawned for a non-ready session");
            self.finish(&chat_id, &session.id, DialogState::Aborted);
            return;
        };

        let progress = Progress::begin(
            Arc::clone(&self.channel),
            &chat_id,
            "🛰 Asking the model to draft your paper…",
        )
        .await;

        match self.run_pipeline(&request, &progress).await {
            Ok(payload) => {
                progress.clear().await;
                if let Err(e) = self.channel.send_document(&payload, &chat_id).await {
                    error!(chat_id = %chat_id, error = %e, "failed to deliver document");
                    let _ = self
                        .channel
                        .send(
                            "⚠️ The paper was generated but could not be delivered. \
                             Send /start to try again.",
                            &chat_id,
                        )
                        .await;
                    self.finish(&chat_id, &session.id, DialogState::Aborted);
                    return;
                }
                info!(chat_id = %chat_id, pages = request.pages, "paper delivered");
                self.finish(&chat_id, &session.id, DialogState::Done);
            }
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "generation failed");
                progress.clear().await;
                let _ = self
                    .channel
                    .send(
                        "❌ Paper generation failed. Nothing was produced — \
                         send /start to try again.",
                        &chat_id,
                    )
                    .await;
                self.finish(&chat_id, &session.id, DialogState::Aborted);
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: &PaperRequest,
        progress: &Progress,
    ) -> anyhow::Result<DocumentPayload> {
        let content = self.requestor.generate(request).await?;

        progress.update("📐 Typesetting the PDF…").await;
        // Typst compilation is CPU-bound; keep it off the async workers.
        let request_for_render = request.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            pdf::render_paper(&request_for_render, &content)
        })
        .await??;

        progress.update("📤 Uploading…").await;
        Ok(DocumentPayload {
            filename: pdf::document_filename(&request.title),
            bytes: rendered.bytes,
            caption: Some(format!(
                "✅ \"{}\" — {} pages",
                request.title, rendered.pages
            )),
        })
    }

    /// Record the terminal state, then drop the session — but only if the
    /// stored session is still the one this generation belongs to. The user
    /// may have issued /start mid-generation; that fresh session must
    /// survive the old task's completion.
    fn finish(&self, chat_id: &str, session_id: &str, state: DialogState) {
        debug_assert!(state.is_terminal());
        let Some(mut session) = self.store.get(chat_id) else {
            return;
        };
        if session.id != session_id {
            info!(chat_id = %chat_id, "session was restarted mid-generation; leaving it alone");
            return;
        }
        session.state = state;
        self.store.replace(session);
        self.store.discard(chat_id);
        info!(chat_id = %chat_id, state = %state, "session closed");
    }

    /// Await every spawned generation task. Test hook.
    pub async fn join_pending(&self) {
        let handles: Vec<_> = {
            let mut tasks = self
                .tasks
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            tasks.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "generation task panicked");
            }
        }
    }
}

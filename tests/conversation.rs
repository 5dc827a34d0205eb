//! End-to-end dialogue through the dispatch loop: a scripted channel plays
//! the user's side of the conversation and the test asserts on what comes
//! back out.

use async_trait::async_trait;
use paperbot::access::KeyStore;
use paperbot::app::Orchestrator;
use paperbot::channels::{Channel, ChannelMessage, DocumentPayload};
use paperbot::error::LlmError;
use paperbot::paper::{Requestor, Section};
use paperbot::providers::Provider;
use paperbot::sessions::{InMemorySessionStore, SessionStore};
use std::sync::{Arc, Mutex};

struct ScriptedChannel {
    script: Vec<String>,
    sent: Mutex<Vec<String>>,
    documents: Mutex<Vec<DocumentPayload>>,
}

impl ScriptedChannel {
    fn new(script: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            script: script.iter().map(|s| (*s).to_string()).collect(),
            sent: Mutex::new(Vec::new()),
            documents: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, message: &str, _chat_id: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn edit_message(
        &self,
        _chat_id: &str,
        _message_id: &str,
        _content: &str,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat_id: &str, _message_id: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_document(&self, doc: &DocumentPayload, _chat_id: &str) -> anyhow::Result<()> {
        self.documents.lock().unwrap().push(doc.clone());
        Ok(())
    }

    async fn listen(
        &self,
        tx: tokio::sync::mpsc::Sender<ChannelMessage>,
    ) -> anyhow::Result<()> {
        for (i, content) in self.script.iter().enumerate() {
            tx.send(ChannelMessage {
                id: i.to_string(),
                chat_id: "chat-7".to_string(),
                sender: "carol".to_string(),
                content: content.clone(),
                channel: "scripted".to_string(),
                timestamp: i as u64,
            })
            .await?;
        }
        // Dropping the sender ends the dispatch loop.
        Ok(())
    }
}

struct CannedProvider {
    reply: Option<String>,
}

#[async_trait]
impl Provider for CannedProvider {
    async fn complete(
        &self,
        _system_prompt: Option<&str>,
        _message: &str,
        _model: &str,
        _temperature: f64,
    ) -> Result<String, LlmError> {
        self.reply.clone().ok_or_else(|| LlmError::Request {
            provider: "canned".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

fn full_reply() -> String {
    let mut out = String::new();
    for section in Section::OUTLINE {
        out.push_str(&format!(
            "## {}\nGenerated prose for {} citing prior work [1].\n\n",
            section.header(),
            section.header().to_lowercase(),
        ));
    }
    out.push_str("## KEYWORDS\npaper generation, typesetting\n\n");
    out.push_str("## REFERENCES\n[1] C. Writer, \"On Papers,\" IEEE Trans., 2025.\n");
    out
}

fn orchestrator(
    channel: Arc<ScriptedChannel>,
    reply: Option<String>,
) -> (Arc<Orchestrator>, Arc<InMemorySessionStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(InMemorySessionStore::new());
    let keys = Arc::new(KeyStore::open(dir.path().join("keys.json")).expect("key store"));
    let requestor = Arc::new(Requestor::new(
        Arc::new(CannedProvider { reply }),
        "test-model".to_string(),
        0.0,
    ));
    let orchestrator = Orchestrator::new(
        channel as Arc<dyn Channel>,
        store.clone() as Arc<dyn SessionStore>,
        keys,
        requestor,
    );
    (orchestrator, store, dir)
}

#[tokio::test]
async fn scripted_dialogue_produces_a_delivered_pdf() {
    let channel = ScriptedChannel::new(&[
        "/start",
        "Energy Aware Scheduling for Embedded Clusters",
        "Carol Jones; Dept. of ECE; State University; Austin, USA; carol@state.edu\n\
         Dan Lee; Dept. of ECE; State University; Austin, USA; dan@state.edu",
        "4",
    ]);
    let (orchestrator, store, _dir) = orchestrator(channel.clone(), Some(full_reply()));

    orchestrator.run().await.expect("dispatch loop");
    orchestrator.join_pending().await;

    let documents = channel.documents.lock().unwrap();
    assert_eq!(documents.len(), 1);
    let doc = &documents[0];
    assert_eq!(
        doc.filename,
        "IEEE_Energy_Aware_Scheduling_for_Embedded_Clusters.pdf"
    );
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert!(store.is_empty());

    let sent = channel.sent.lock().unwrap();
    assert!(sent.iter().any(|m| m.contains("paper title")));
    assert!(sent.iter().any(|m| m.contains("author details")));
    assert!(sent.iter().any(|m| m.contains("All set")));
}

#[tokio::test]
async fn provider_outage_reports_failure_and_frees_the_session() {
    let channel = ScriptedChannel::new(&[
        "/start",
        "Energy Aware Scheduling for Embedded Clusters",
        "Carol Jones; Dept. of ECE; State University; Austin, USA; carol@state.edu",
        "4",
    ]);
    let (orchestrator, store, _dir) = orchestrator(channel.clone(), None);

    orchestrator.run().await.expect("dispatch loop");
    orchestrator.join_pending().await;

    assert!(channel.documents.lock().unwrap().is_empty());
    let sent = channel.sent.lock().unwrap();
    assert!(sent.iter().any(|m| m.contains("generation failed")));
    assert!(store.is_empty());
}

//! Test fixtures: pre-populated user database and scripted scoring providers

use super::constants::*;
use anyhow::Result;
use async_trait::async_trait;
use auranic_server::analysis::{Prompt, RawAnalysis};
use auranic_server::llm::{parse_raw_analysis, LlmError, ScoringProvider};
use auranic_server::user::{SqliteUserStore, UserManager};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Creates a temporary db directory whose user.db holds the two test users.
/// Returns (temp_dir, db_dir)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_dir = dir.path().to_path_buf();

    let store = SqliteUserStore::new(db_dir.join("user.db"))?;
    let manager = UserManager::new(Arc::new(store));
    manager.register(TEST_USER, Some("test@example.com"), TEST_PASS)?;
    manager.register(OTHER_USER, None, OTHER_PASS)?;

    Ok((dir, db_dir))
}

/// What a [`ScriptedProvider`] does on every call.
#[derive(Clone)]
pub enum Script {
    /// Responds with this raw model text, parsed like a real completion.
    Reply(String),
    /// Fails as if the upstream API returned a 500.
    Fail,
    /// Never answers, so only the orchestrator timeout ends the call.
    Hang,
}

/// In-memory scoring provider with a call counter.
pub struct ScriptedProvider {
    name: &'static str,
    script: Script,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name,
            script,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(name: &'static str, body: serde_json::Value) -> Arc<Self> {
        Self::new(name, Script::Reply(body.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ScoringProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn attempt_analysis(&self, prompt: &Prompt) -> Result<RawAnalysis, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.script {
            Script::Reply(text) => parse_raw_analysis(text),
            Script::Fail => Err(LlmError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::Timeout)
            }
        }
    }
}

use axum::extract::FromRef;

use crate::analysis::AnalysisOrchestrator;
use crate::analysis_store::AnalysisStore;
use crate::user::UserManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedAnalysisStore = Arc<dyn AnalysisStore>;
pub type GuardedOrchestrator = Arc<AnalysisOrchestrator>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub analysis_store: GuardedAnalysisStore,
    pub orchestrator: GuardedOrchestrator,
    pub hash: String,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedAnalysisStore {
    fn from_ref(input: &ServerState) -> Self {
        input.analysis_store.clone()
    }
}

impl FromRef<ServerState> for GuardedOrchestrator {
    fn from_ref(input: &ServerState) -> Self {
        input.orchestrator.clone()
    }
}

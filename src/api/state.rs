use std::sync::Arc;

use super::agent::{Agent, MockAgent, Stages};
use crate::core::AppConfig;

pub struct AppState {
    pub agent: Arc<dyn Agent>,
    pub stages: Stages,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let agent = MockAgent::new(config.agent_delay);
        // Status stages take noticeably longer than a single word
        let stages = Stages {
            delay: config.agent_delay * 10,
        };
        Self {
            agent: Arc::new(agent),
            stages,
        }
    }

    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agent = agent;
        self
    }
}

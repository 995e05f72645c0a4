#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::Router;
use std::sync::Arc;

use courtqueue::{
    create_router, AppConfig, AppState, CourtId, CourtRepository, CourtService,
    CourtStateListener, EventBus, InMemoryCourtRepository,
};

use super::mocks::RecordingListener;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub listener: RecordingListener,
    pub court_ids: Vec<CourtId>,
}

impl TestSetup {
    pub fn service(&self) -> &CourtService {
        &self.state.court_service
    }

    /// The first court created by the builder
    pub fn court(&self) -> CourtId {
        self.court_ids[0]
    }
}

pub struct TestSetupBuilder {
    courts: usize,
    queue: Vec<String>,
    config: AppConfig,
    repository: Option<Arc<dyn CourtRepository>>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            courts: 1,
            queue: vec![],
            config: AppConfig::default(),
            repository: None,
        }
    }

    pub fn with_courts(mut self, courts: usize) -> Self {
        self.courts = courts;
        self
    }

    /// Names joined to the first court's queue, in order
    pub fn with_queue(mut self, names: &[&str]) -> Self {
        self.queue = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_win_out_threshold(mut self, threshold: u32) -> Self {
        self.config.rotation.win_out_threshold = threshold;
        self
    }

    pub fn with_repository(mut self, repository: Arc<dyn CourtRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryCourtRepository::new()));
        let listener = RecordingListener::new();
        let event_bus = EventBus::new(self.config.server.event_channel_capacity);
        let listeners: Vec<Arc<dyn CourtStateListener>> =
            vec![Arc::new(listener.clone()), Arc::new(event_bus.clone())];

        let service = CourtService::new(
            repository,
            listeners,
            self.config.rotation.clone(),
            self.config.estimator.clone(),
        );
        let state = AppState::new(Arc::new(service), event_bus, self.config);

        let mut court_ids = Vec::new();
        for _ in 0..self.courts {
            let court = state.court_service.add_court(None).await.unwrap();
            court_ids.push(court.id);
        }
        if let Some(first) = court_ids.first() {
            for name in &self.queue {
                state.court_service.join_queue(*first, name).await.unwrap();
            }
        }
        listener.clear().await;

        TestSetup {
            app: create_router(state.clone()),
            state,
            listener,
            court_ids,
        }
    }
}

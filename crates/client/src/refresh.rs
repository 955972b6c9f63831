//! Server-derived views reloaded when a job finishes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tfd_protocol::deployment_models::{Deployment, PreferencesResponse};
use tracing::{debug, warn};

use crate::api::DashboardApi;
use crate::poller::RefreshHook;

#[derive(Default)]
struct Views {
    deployments: Vec<Deployment>,
    preferences: Option<PreferencesResponse>,
}

/// Latest deployments and preferences, reloaded through [`RefreshHook`].
///
/// A failed reload keeps the previous value.
pub struct ServerViews {
    api: Arc<dyn DashboardApi>,
    views: Mutex<Views>,
    reloads: AtomicUsize,
}

impl ServerViews {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            views: Mutex::new(Views::default()),
            reloads: AtomicUsize::new(0),
        }
    }

    pub async fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);

        match self.api.list_deployments().await {
            Ok(deployments) => self.lock().deployments = deployments,
            Err(e) => warn!(error = %e, "failed to refresh deployments"),
        }
        match self.api.preferences().await {
            Ok(preferences) => self.lock().preferences = Some(preferences),
            Err(e) => warn!(error = %e, "failed to refresh preferences"),
        }
        debug!(deployments = self.lock().deployments.len(), "server views refreshed");
    }

    pub fn deployments(&self) -> Vec<Deployment> {
        self.lock().deployments.clone()
    }

    pub fn deployment(&self, id: &str) -> Option<Deployment> {
        self.lock()
            .deployments
            .iter()
            .find(|deployment| deployment.id == id)
            .cloned()
    }

    pub fn preferences(&self) -> Option<PreferencesResponse> {
        self.lock().preferences.clone()
    }

    /// Number of reloads started so far.
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Views> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RefreshHook for ServerViews {
    async fn refresh(&self) {
        self.reload().await;
    }
}

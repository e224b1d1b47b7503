//! Optional session observer for the presentation layer.
//!
//! The dashboard reports session starts and province views to an injected
//! observer. The default implementation emits `tracing` events; nothing in
//! the loading or classification path depends on this module.

use crate::models::Province;
use chrono::{DateTime, Local};
use tracing::info;
use uuid::Uuid;

/// Identity of one dashboard rendering session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: Uuid,
    pub started_at: DateTime<Local>,
}

impl SessionInfo {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
        }
    }
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self::new()
    }
}

pub trait SessionObserver: Send + Sync {
    fn session_started(&self, session: &SessionInfo);

    fn province_viewed(&self, session: &SessionInfo, province: Province);
}

/// Logs session events at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn session_started(&self, session: &SessionInfo) {
        info!(
            session_id = %session.id,
            "New user session: {} at {}",
            session.id,
            session.started_at.to_rfc3339()
        );
    }

    fn province_viewed(&self, session: &SessionInfo, province: Province) {
        info!(session_id = %session.id, province = province.code(), "Province page rendered");
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn session_started(&self, _session: &SessionInfo) {}

    fn province_viewed(&self, _session: &SessionInfo, _province: Province) {}
}

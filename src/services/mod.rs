/// Business logic services layer
mod flights;
mod launches;
mod viewers;

pub use flights::FlightService;
pub use launches::LaunchService;
pub use viewers::ViewerService;

use crate::domain::Snapshot;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Latest result of a refresh cycle, guarded by a generation token.
///
/// Each cycle takes a token from `begin()`. A commit only lands if its token is
/// newer than the one already stored, so a slow response from an older cycle
/// cannot overwrite a newer result.
pub struct RefreshSlot<T> {
    name: &'static str,
    next_token: AtomicU64,
    state: RwLock<SlotState<T>>,
}

struct SlotState<T> {
    token: u64,
    snapshot: Option<Snapshot<T>>,
}

impl<T: Clone> RefreshSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_token: AtomicU64::new(0),
            state: RwLock::new(SlotState {
                token: 0,
                snapshot: None,
            }),
        }
    }

    /// Start a refresh cycle
    pub fn begin(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `data` unless a newer cycle already committed. Returns whether it was stored.
    pub async fn commit(&self, token: u64, data: T) -> bool {
        let mut state = self.state.write().await;
        if token <= state.token {
            debug!(
                "{}: dropping stale result (token {} <= {})",
                self.name, token, state.token
            );
            return false;
        }

        state.token = token;
        state.snapshot = Some(Snapshot {
            fetched_at: Utc::now(),
            data,
        });
        true
    }

    pub async fn latest(&self) -> Option<Snapshot<T>> {
        self.state.read().await.snapshot.clone()
    }
}

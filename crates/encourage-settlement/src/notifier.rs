//! Single-producer broadcast of the contract's aggregate state.
//!
//! Built on `tokio::sync::watch`: observers always see the most recent
//! snapshot, and `update_count` strictly increases with every publish so
//! an observer can tell whether it missed intermediate updates.

use encourage_types::AggregateState;
use tokio::sync::watch;
use tracing::debug;

/// One published state, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub update_count: u64,
    pub state: AggregateState,
}

/// Create a notifier pair whose first snapshot is `initial`.
#[must_use]
pub fn produce_notifier(initial: AggregateState) -> (Notifier, NotifierUpdater) {
    let (tx, rx) = watch::channel(Snapshot {
        update_count: 1,
        state: initial,
    });
    (Notifier { rx }, NotifierUpdater { tx })
}

/// Write side. Owned by the settlement engine.
#[derive(Debug)]
pub struct NotifierUpdater {
    tx: watch::Sender<Snapshot>,
}

impl NotifierUpdater {
    /// Publish `state`. Returns the new update count.
    pub fn update_state(&self, state: AggregateState) -> u64 {
        let mut update_count = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.update_count += 1;
            snapshot.state = state;
            update_count = snapshot.update_count;
        });
        debug!(update_count, "Notifier updated");
        update_count
    }
}

/// Read side. Cheap to clone; each clone tracks what it has seen.
#[derive(Debug, Clone)]
pub struct Notifier {
    rx: watch::Receiver<Snapshot>,
}

impl Notifier {
    /// Most recently published state.
    #[must_use]
    pub fn latest(&self) -> AggregateState {
        self.rx.borrow().state.clone()
    }

    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.rx.borrow().update_count
    }

    /// Wait for a snapshot newer than the last one this handle saw.
    /// Returns `None` once the updater is gone.
    pub async fn next_update(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

use rusqlite::Connection;
use tokio::sync::watch;

use crate::db::queries;
use crate::services::availability::BookingSnapshot;

/// Push feed of booking snapshots. Starts in the loading state; every
/// successful write republishes a full ordered view. Consumers hold a
/// `watch::Receiver` (dropped on teardown) and only ever read the latest
/// delivered value, never a stale copy from an earlier cycle.
pub struct SnapshotFeed {
    tx: watch::Sender<BookingSnapshot>,
}

impl Default for SnapshotFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BookingSnapshot::loading());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<BookingSnapshot> {
        self.tx.subscribe()
    }

    /// The most recently delivered snapshot.
    pub fn latest(&self) -> BookingSnapshot {
        self.tx.borrow().clone()
    }

    /// Reload the full booking set from the store and publish it.
    pub fn refresh(&self, conn: &Connection) -> anyhow::Result<()> {
        let bookings = queries::get_all_bookings(conn)?;
        tracing::debug!(count = bookings.len(), "publishing booking snapshot");
        self.tx.send_replace(BookingSnapshot::ready(bookings));
        Ok(())
    }
}

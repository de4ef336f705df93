//! Room discovery: best-effort enumeration of open rooms.
//!
//! The ledger exposes no "list rooms" query, so discovery scans a
//! bounded id range with batched concurrent reads and keeps what looks
//! joinable. This linear scan is a known scaling limit, deliberately
//! isolated behind [`discover`] so it can be swapped for a real index
//! without touching the reconciler or controller.
//!
//! Each call is a fresh scan: a query, not a subscription. Individual
//! read failures never abort a batch; the result is always a usable,
//! possibly partial listing.

use std::collections::HashMap;

use futures_util::future;
use playpool_gateway::LedgerGateway;
use playpool_protocol::{RoomId, RoomKind, RoomSnapshot, RoomSummary};

/// Scan bounds for one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Highest room id to probe. Ids above this are assumed unassigned.
    pub max_id: u64,
    /// How many reads to issue concurrently per batch.
    pub batch_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_id: 100,
            batch_size: 10,
        }
    }
}

/// The result of one scan: a finite, consuming, newest-first sequence
/// of joinable public rooms. Not restartable; run a new scan instead.
#[derive(Debug)]
pub struct Discovered {
    rooms: std::vec::IntoIter<RoomSummary>,
}

impl Discovered {
    /// Number of rooms the scan found.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.len() == 0
    }
}

impl Iterator for Discovered {
    type Item = RoomSummary;

    fn next(&mut self) -> Option<RoomSummary> {
        self.rooms.next()
    }
}

impl ExactSizeIterator for Discovered {}

/// Scans `1..=max_id` for joinable public rooms.
///
/// Ids are probed newest-first (ids ascend with creation) in batches of
/// `batch_size` concurrent reads. A room is kept when it reads as
/// Public, Filling, not full, and not past its expiry. Failed or empty
/// reads are logged and skipped. Entries are keyed by the id the
/// snapshot *reports*, last write wins, so a stale duplicate from an
/// overlapping read cannot produce two rows.
pub async fn discover<G: LedgerGateway>(
    gateway: &G,
    config: &DiscoveryConfig,
) -> Discovered {
    let mut found: HashMap<RoomId, RoomSummary> = HashMap::new();
    let batch_size = config.batch_size.max(1);

    let ids: Vec<u64> = (1..=config.max_id).rev().collect();
    for batch in ids.chunks(batch_size) {
        let reads = batch.iter().map(|&id| probe(gateway, RoomId(id)));
        for summary in future::join_all(reads).await.into_iter().flatten() {
            found.insert(summary.id, summary);
        }
    }

    let mut rooms: Vec<RoomSummary> = found.into_values().collect();
    // Newest first; id as tiebreak for rooms created the same second.
    rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    tracing::debug!(
        scanned = config.max_id,
        joinable = rooms.len(),
        "discovery scan finished"
    );

    Discovered {
        rooms: rooms.into_iter(),
    }
}

/// Reads one id; `None` for anything that isn't a joinable public room.
async fn probe<G: LedgerGateway>(gateway: &G, id: RoomId) -> Option<RoomSummary> {
    let raw = match gateway.get_room(id).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            // One bad read must not sink the batch.
            tracing::debug!(room_id = %id, reason = err.reason(), "discovery read failed");
            return None;
        }
    };

    let room = match RoomSnapshot::from_raw(raw) {
        Ok(room) => room,
        Err(err) => {
            tracing::warn!(room_id = %id, %err, "corrupt room skipped by discovery");
            return None;
        }
    };

    let joinable = room.kind == RoomKind::Public
        && room.status.is_joinable()
        && !room.is_full()
        && !room.is_past_expiry(unix_now());

    joinable.then(|| RoomSummary::from(&room))
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

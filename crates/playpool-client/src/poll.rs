//! Completion polling.
//!
//! After a player submits their score there is no push channel to tell
//! them when everyone else has; the client re-reads on a timer until
//! it observes a settled room. The loop is bounded two ways: it stops
//! on the first settled observation, and it gives up after a hard
//! timeout. Never an unbounded loop.
//!
//! Cancellation is cooperative: the poller is a plain future, so
//! dropping it (navigating away, `tokio::select!` against a teardown
//! signal) cancels it between suspension points. An in-flight read is
//! simply discarded.

use std::time::Duration;

use playpool_gateway::LedgerGateway;
use playpool_protocol::{PlayerAddr, PlayerRecord, RoomId, RoomSnapshot};
use rand::Rng;
use tokio::time::{self, Instant};

use crate::error::ClientError;
use crate::reconcile::{reconcile, RoomView};

/// Timing for the completion poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between reads.
    pub interval: Duration,
    /// Hard cap on the whole loop.
    pub timeout: Duration,
    /// Random delay (0..max) before the first read, so clients that
    /// submitted in the same instant don't poll in lockstep.
    pub max_start_jitter: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
            max_start_jitter: Duration::from_millis(250),
        }
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The room reconciled to Completed or a terminal state.
    Settled(RoomView),
    /// The timeout elapsed first; the room may still settle later.
    TimedOut,
    /// A read reported the room as gone.
    RoomGone,
}

/// Polls one room until it settles, times out, or is dropped.
#[derive(Debug, Clone, Default)]
pub struct CompletionPoller {
    config: PollConfig,
}

impl CompletionPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Runs the poll loop for `room`.
    ///
    /// Transient gateway failures are logged and absorbed; the next
    /// interval retries the read. Corrupt snapshots are not absorbed;
    /// they surface as [`ClientError::Snapshot`] and end the loop.
    pub async fn run<G: LedgerGateway>(
        &self,
        gateway: &G,
        room: RoomId,
        self_id: Option<&PlayerAddr>,
    ) -> Result<PollOutcome, ClientError> {
        let deadline = Instant::now() + self.config.timeout;

        let jitter_us = self.config.max_start_jitter.as_micros() as u64;
        if jitter_us > 0 {
            let us = rand::rng().random_range(0..jitter_us);
            time::sleep(Duration::from_micros(us)).await;
        }

        tracing::debug!(room_id = %room, "completion poll started");
        let mut polls = 0u32;

        loop {
            polls += 1;
            match self.read_once(gateway, room, self_id).await {
                Ok(Some(view)) if view.is_settled() => {
                    tracing::info!(room_id = %room, polls, "room settled");
                    return Ok(PollOutcome::Settled(view));
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!(room_id = %room, "room vanished while polling");
                    return Ok(PollOutcome::RoomGone);
                }
                Err(ClientError::Gateway(err)) => {
                    // Transient; the next interval gets a fresh try.
                    tracing::warn!(room_id = %room, reason = err.reason(), "poll read failed");
                }
                Err(err) => return Err(err),
            }

            let now = Instant::now();
            if now + self.config.interval >= deadline {
                tracing::warn!(room_id = %room, polls, "completion poll timed out");
                return Ok(PollOutcome::TimedOut);
            }
            time::sleep(self.config.interval).await;
        }
    }

    async fn read_once<G: LedgerGateway>(
        &self,
        gateway: &G,
        room: RoomId,
        self_id: Option<&PlayerAddr>,
    ) -> Result<Option<RoomView>, ClientError> {
        let Some(raw) = gateway.get_room(room).await? else {
            return Ok(None);
        };
        let snapshot = RoomSnapshot::from_raw(raw)?;

        let players = gateway
            .get_players(room)
            .await?
            .into_iter()
            .map(|p| PlayerRecord::from_raw(room, p))
            .collect::<Result<Vec<_>, _>>()?;

        let view = reconcile(&snapshot, &players, self_id, unix_now())?;
        Ok(Some(view))
    }
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

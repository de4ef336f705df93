//! End-to-end walkthrough of the room lifecycle on the in-memory ledger:
//! create → discover → join → play → poll → claim.

use std::sync::Arc;

use playpool::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// A stand-in mini-game
// ---------------------------------------------------------------------------

/// "Plays" a round by immediately reporting a scripted score.
struct CannedGame {
    disabled: bool,
    score: u64,
}

impl CannedGame {
    fn with_score(score: u64) -> Self {
        Self { disabled: true, score }
    }
}

impl GameAdapter for CannedGame {
    fn start(&mut self, reporter: ScoreReporter) {
        if !self.disabled {
            reporter.report(self.score);
        }
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let ledger = Arc::new(InMemoryLedger::new());
    let mut alice = RoomController::new(Arc::clone(&ledger), Some(PlayerAddr::new("0xAlice")));
    let mut bob = RoomController::new(Arc::clone(&ledger), Some(PlayerAddr::new("0xBob")));

    // Alice opens a 2-player Flappy Bird room, 50 points a seat.
    let room = alice
        .create_room(&CreateRoomRequest::public(50, 2, GameKind::FlappyBird))
        .await?;
    tracing::info!(%room, "alice created a room");
    tracing::info!(view = ?alice.load_room(room).await?, "alice's view");

    // Bob finds it through discovery and takes the last seat.
    let open_rooms: Vec<_> = discover(ledger.as_ref(), &DiscoveryConfig::default())
        .await
        .collect();
    tracing::info!(count = open_rooms.len(), "open rooms");
    let found = open_rooms.first().expect("alice's room should be listed");

    bob.join_room(found.id, None).await?;
    tracing::info!(view = ?bob.load_room(room).await?, "bob's view after joining");

    // Both play their round.
    let score = alice.play(room, &mut CannedGame::with_score(40)).await?;
    tracing::info!(score, "alice finished a run");
    let score = bob.play(room, &mut CannedGame::with_score(60)).await?;
    tracing::info!(score, "bob finished a run");

    // Alice polls for completion (already settled by bob's submission).
    match alice.await_completion(room).await? {
        PollOutcome::Settled(view) => tracing::info!(?view, "room settled"),
        other => tracing::warn!(?other, "room did not settle"),
    }

    // The ledger picked bob; he claims the pooled 100 points.
    bob.claim_prize(room).await?;
    tracing::info!("bob claimed the prize, demo complete");

    Ok(())
}

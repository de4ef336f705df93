//! # Playpool
//!
//! Client-side room lifecycle protocol for a play-to-earn arcade.
//!
//! The authoritative room state lives on a remote ledger the client can
//! only read (with lag) and send intents to. Playpool provides the
//! pieces a robust client needs on top of that:
//!
//! - [`reconcile`] turns a raw room snapshot into a decision
//!   ([`RoomView`]) the UI can render directly.
//! - [`RoomController`] drives create → join → submit → claim in
//!   state-machine order, with idempotency-aware local preconditions.
//! - [`discover`] enumerates joinable public rooms by bounded scan.
//! - [`InMemoryLedger`] stands in for the chain in tests and demos.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use playpool::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let ledger = Arc::new(InMemoryLedger::new());
//! let mut client = RoomController::new(ledger, Some(PlayerAddr::new("0xMe")));
//!
//! let room = client
//!     .create_room(&CreateRoomRequest::public(50, 2, GameKind::FlappyBird))
//!     .await?;
//! let view = client.load_room(room).await?;
//! # let _ = view;
//! # Ok(())
//! # }
//! ```

pub use playpool_client::{
    reconcile, score_channel, ClientError, CompletionPoller, ControllerConfig,
    ErrorClass, GameAdapter, GameSession, JoinOutcome, PollConfig, PollOutcome,
    RoomController, RoomView, ScoreFuture, ScoreReporter, TerminalReason,
};
pub use playpool_discovery::{discover, Discovered, DiscoveryConfig};
pub use playpool_gateway::{GatewayError, InMemoryLedger, LedgerGateway, ReadScript};
pub use playpool_protocol::{
    CreateRoomRequest, GameKind, PlayerAddr, PlayerRecord, RawPlayer, RawRoom, RoomId,
    RoomKind, RoomSnapshot, RoomStatus, RoomSummary, SnapshotError,
};

/// The names most clients need, in one import.
pub mod prelude {
    pub use crate::{
        discover, reconcile, ClientError, CreateRoomRequest, DiscoveryConfig,
        ErrorClass, GameAdapter, GameKind, InMemoryLedger, JoinOutcome, LedgerGateway,
        PlayerAddr, PollOutcome, RoomController, RoomId, RoomKind, RoomStatus,
        RoomView, ScoreReporter,
    };
}

//! Client-side room lifecycle logic for Playpool.
//!
//! The ledger owns all room and player state; this crate owns every
//! decision the client makes about it:
//!
//! - [`reconcile`]: the pure read-side function turning a snapshot +
//!   player records + local identity into a [`RoomView`] the UI can act
//!   on without re-deriving business rules.
//! - [`RoomController`]: the write-side driver sequencing create /
//!   join / submit / claim / cancel intents with idempotency-aware
//!   preconditions, so doomed transactions are rejected before they
//!   cost anything.
//! - [`GameSession`]: the session-scoped value object for derived
//!   flags (has-played, active room, pending-room handoff), fully reset
//!   when a different room is loaded.
//! - [`CompletionPoller`]: the bounded, cancellable timer loop that
//!   bridges "I submitted" to "everyone submitted".
//! - [`GameAdapter`] / [`ScoreReporter`]: the black-box mini-game
//!   boundary; games report exactly one final score per play session.

mod adapter;
mod controller;
mod error;
mod poll;
mod reconcile;
mod session;

pub use adapter::{GameAdapter, ScoreFuture, ScoreReporter, score_channel};
pub use controller::{ControllerConfig, JoinOutcome, RoomController};
pub use error::{ClientError, ErrorClass};
pub use poll::{CompletionPoller, PollConfig, PollOutcome};
pub use reconcile::{reconcile, RoomView, TerminalReason};
pub use session::GameSession;

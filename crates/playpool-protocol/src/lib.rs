//! Shared data model for the Playpool arcade client.
//!
//! This crate defines the "language" the client speaks with the ledger:
//!
//! - **Typed model** ([`RoomSnapshot`], [`PlayerRecord`], [`RoomStatus`],
//!   etc.): the strict structures the rest of the client operates on.
//! - **Raw model** ([`RawRoom`], [`RawPlayer`]): the loosely-typed shape
//!   ledger reads actually arrive in.
//! - **Parse boundary** (`from_raw`): the single place where loose data
//!   becomes strict data, failing with [`SnapshotError`] on anything that
//!   violates the model's invariants.
//!
//! # Architecture
//!
//! The protocol layer sits below everything else. It knows nothing about
//! gateways, sessions, or polling; it only knows what a room *is* and
//! which raw reads are corrupt.
//!
//! ```text
//! Gateway (raw records) → Protocol (typed snapshots) → Client (decisions)
//! ```

mod error;
mod raw;
mod types;

pub use error::SnapshotError;
pub use raw::{RawPlayer, RawRoom};
pub use types::{
    CreateRoomRequest, GameKind, PlayerAddr, PlayerRecord, RoomId, RoomKind,
    RoomSnapshot, RoomStatus, RoomSummary, DEFAULT_EXPIRATION_SECS,
};

//! Error type for the parse boundary.
//!
//! A [`SnapshotError`](crate::SnapshotError) means a ledger read came back
//! in a shape the data model forbids. That is corruption, not a transient
//! network condition; callers must surface it distinctly from gateway
//! failures and must not retry their way past it.

use crate::RoomId;

/// A raw read violated the room model's invariants.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The numeric status is outside the five-value enum.
    #[error("room {room}: unknown status code {code}")]
    UnknownStatus { room: RoomId, code: u8 },

    /// The numeric game type is not one we know.
    #[error("room {room}: unknown game type {code}")]
    UnknownGameKind { room: RoomId, code: u8 },

    /// The numeric room type is not one we know.
    #[error("room {room}: unknown room type {code}")]
    UnknownRoomKind { room: RoomId, code: u8 },

    /// `max_players` below the minimum a room can hold.
    #[error("room {room}: invalid capacity {max_players} (need at least 2)")]
    BadCapacity { room: RoomId, max_players: u32 },

    /// More players recorded than the room can hold.
    #[error("room {room}: {current} players exceeds capacity {max}")]
    Overfull { room: RoomId, current: u32, max: u32 },

    /// A player record carried no address.
    #[error("room {room}: player record with empty address")]
    EmptyAddress { room: RoomId },
}

//! Raw ledger records and the parse/validate boundary.
//!
//! Reads from the ledger arrive as loosely-typed records: enums are bare
//! integers, the missing winner is a sentinel address, nothing is checked.
//! This module is the only place that shape is allowed to exist: the
//! `from_raw` constructors either produce a strict snapshot or fail with
//! [`SnapshotError`]. Nothing downstream ever touches a raw record.

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::types::{
    GameKind, PlayerAddr, PlayerRecord, RoomId, RoomKind, RoomSnapshot, RoomStatus,
};

// ---------------------------------------------------------------------------
// Raw shapes
// ---------------------------------------------------------------------------

/// A room exactly as a ledger read returns it.
///
/// `Serialize` is derived too so gateways and test fixtures can produce
/// these records, not just consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRoom {
    pub id: u64,
    pub creator: String,
    pub entry_fee: u64,
    pub max_players: u32,
    pub current_players: u32,
    pub game_type: u8,
    pub room_type: u8,
    pub status: u8,
    pub creation_time: u64,
    pub expiration_time: u64,
    pub prize_pool: u64,
    /// Empty string or the all-zero address means "no winner yet".
    pub winner: String,
    pub prize_claimed: bool,
}

/// A player-in-room record exactly as a ledger read returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    pub player_address: String,
    pub score: u64,
    pub has_submitted_score: bool,
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// Decoding helpers
// ---------------------------------------------------------------------------

/// The sentinel the ledger uses where a contract would store `address(0)`.
fn is_zero_address(addr: &str) -> bool {
    let digits = addr.strip_prefix("0x").unwrap_or(addr);
    !digits.is_empty() && digits.bytes().all(|b| b == b'0')
}

fn decode_status(room: RoomId, code: u8) -> Result<RoomStatus, SnapshotError> {
    match code {
        0 => Ok(RoomStatus::Filling),
        1 => Ok(RoomStatus::Active),
        2 => Ok(RoomStatus::Completed),
        3 => Ok(RoomStatus::Expired),
        4 => Ok(RoomStatus::Canceled),
        code => Err(SnapshotError::UnknownStatus { room, code }),
    }
}

fn decode_game(room: RoomId, code: u8) -> Result<GameKind, SnapshotError> {
    match code {
        0 => Ok(GameKind::FlappyBird),
        1 => Ok(GameKind::AiChallenge),
        code => Err(SnapshotError::UnknownGameKind { room, code }),
    }
}

fn decode_kind(room: RoomId, code: u8) -> Result<RoomKind, SnapshotError> {
    match code {
        0 => Ok(RoomKind::Public),
        1 => Ok(RoomKind::Private),
        2 => Ok(RoomKind::Tournament),
        code => Err(SnapshotError::UnknownRoomKind { room, code }),
    }
}

// ---------------------------------------------------------------------------
// Parse boundary
// ---------------------------------------------------------------------------

impl RoomSnapshot {
    /// Converts a raw ledger record into a validated snapshot.
    ///
    /// Fails with [`SnapshotError`] when the record is corrupt: unknown
    /// enum codes, a capacity below two, more players than seats, or an
    /// empty creator. Staleness is fine; malformation is not.
    pub fn from_raw(raw: RawRoom) -> Result<Self, SnapshotError> {
        let room = RoomId(raw.id);

        let status = decode_status(room, raw.status)?;
        let game = decode_game(room, raw.game_type)?;
        let kind = decode_kind(room, raw.room_type)?;

        if raw.max_players < 2 {
            return Err(SnapshotError::BadCapacity {
                room,
                max_players: raw.max_players,
            });
        }
        if raw.current_players > raw.max_players {
            return Err(SnapshotError::Overfull {
                room,
                current: raw.current_players,
                max: raw.max_players,
            });
        }
        if raw.creator.is_empty() {
            return Err(SnapshotError::EmptyAddress { room });
        }

        let winner = if raw.winner.is_empty() || is_zero_address(&raw.winner) {
            None
        } else {
            Some(PlayerAddr::new(raw.winner))
        };

        Ok(Self {
            id: room,
            creator: PlayerAddr::new(raw.creator),
            entry_fee: raw.entry_fee,
            max_players: raw.max_players,
            current_players: raw.current_players,
            game,
            kind,
            status,
            created_at: raw.creation_time,
            expires_at: raw.expiration_time,
            prize_pool: raw.prize_pool,
            winner,
            prize_claimed: raw.prize_claimed,
        })
    }
}

impl PlayerRecord {
    /// Converts a raw player record, rejecting empty addresses.
    ///
    /// `room` is only used to label the error.
    pub fn from_raw(room: RoomId, raw: RawPlayer) -> Result<Self, SnapshotError> {
        if raw.player_address.is_empty() {
            return Err(SnapshotError::EmptyAddress { room });
        }
        Ok(Self {
            addr: PlayerAddr::new(raw.player_address),
            score: raw.score,
            has_submitted: raw.has_submitted_score,
            submitted_at: raw.timestamp,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_room() -> RawRoom {
        RawRoom {
            id: 7,
            creator: "0xCreator".into(),
            entry_fee: 50,
            max_players: 2,
            current_players: 1,
            game_type: 0,
            room_type: 0,
            status: 0,
            creation_time: 1_000,
            expiration_time: 4_600,
            prize_pool: 50,
            winner: String::new(),
            prize_claimed: false,
        }
    }

    #[test]
    fn test_parse_valid_raw_room() {
        let room = RoomSnapshot::from_raw(raw_room()).unwrap();
        assert_eq!(room.id, RoomId(7));
        assert_eq!(room.status, RoomStatus::Filling);
        assert_eq!(room.game, GameKind::FlappyBird);
        assert_eq!(room.kind, RoomKind::Public);
        assert_eq!(room.winner, None);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let mut raw = raw_room();
        raw.status = 99;
        let err = RoomSnapshot::from_raw(raw).unwrap_err();
        assert!(matches!(err, SnapshotError::UnknownStatus { code: 99, .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_game_type() {
        let mut raw = raw_room();
        raw.game_type = 5;
        let err = RoomSnapshot::from_raw(raw).unwrap_err();
        assert!(matches!(err, SnapshotError::UnknownGameKind { code: 5, .. }));
    }

    #[test]
    fn test_parse_rejects_zero_capacity() {
        let mut raw = raw_room();
        raw.max_players = 0;
        raw.current_players = 0;
        let err = RoomSnapshot::from_raw(raw).unwrap_err();
        assert!(matches!(err, SnapshotError::BadCapacity { max_players: 0, .. }));
    }

    #[test]
    fn test_parse_rejects_overfull_room() {
        let mut raw = raw_room();
        raw.current_players = 3;
        let err = RoomSnapshot::from_raw(raw).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Overfull { current: 3, max: 2, .. }
        ));
    }

    #[test]
    fn test_parse_decodes_winner_sentinels_as_none() {
        let mut raw = raw_room();
        raw.status = 2;
        raw.winner = "0x0000000000000000000000000000000000000000".into();
        let room = RoomSnapshot::from_raw(raw).unwrap();
        assert_eq!(room.winner, None);

        let mut raw = raw_room();
        raw.winner = String::new();
        assert_eq!(RoomSnapshot::from_raw(raw).unwrap().winner, None);
    }

    #[test]
    fn test_parse_keeps_real_winner() {
        let mut raw = raw_room();
        raw.status = 2;
        raw.winner = "0xWinner".into();
        let room = RoomSnapshot::from_raw(raw).unwrap();
        assert_eq!(room.winner, Some(PlayerAddr::new("0xwinner")));
    }

    #[test]
    fn test_parse_player_record() {
        let rec = PlayerRecord::from_raw(
            RoomId(7),
            RawPlayer {
                player_address: "0xAlice".into(),
                score: 40,
                has_submitted_score: true,
                timestamp: 2_000,
            },
        )
        .unwrap();
        assert_eq!(rec.addr, PlayerAddr::new("0xalice"));
        assert!(rec.has_submitted);
        assert_eq!(rec.score, 40);
    }

    #[test]
    fn test_parse_player_record_rejects_empty_address() {
        let err = PlayerRecord::from_raw(
            RoomId(7),
            RawPlayer {
                player_address: String::new(),
                score: 0,
                has_submitted_score: false,
                timestamp: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyAddress { .. }));
    }

    #[test]
    fn test_raw_room_round_trips_through_json() {
        let raw = raw_room();
        let bytes = serde_json::to_vec(&raw).unwrap();
        let decoded: RawRoom = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(raw, decoded);
    }
}

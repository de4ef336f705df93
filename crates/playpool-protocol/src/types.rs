//! The typed room model: identities, enums, snapshots, and requests.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Default room lifetime when the creator does not pick one.
pub const DEFAULT_EXPIRATION_SECS: u64 = 3600;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a room, assigned by the ledger at creation.
///
/// Newtype over `u64` so a room id can't be confused with a fee or a
/// score. `#[serde(transparent)]` keeps the JSON representation a plain
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

/// A wallet address identifying a player.
///
/// Addresses are not case-sensitive identifiers: `0xAbC` and `0xabc` are
/// the same player. Equality and hashing are therefore case-insensitive,
/// while `Display` preserves whatever casing the ledger reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerAddr(String);

impl PlayerAddr {
    /// Wraps an address string as reported by the wallet or ledger.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// The address exactly as it was reported.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for PlayerAddr {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for PlayerAddr {}

impl Hash for PlayerAddr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for PlayerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerAddr {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which mini-game a room hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameKind {
    FlappyBird,
    AiChallenge,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlappyBird => write!(f, "FlappyBird"),
            Self::AiChallenge => write!(f, "AiChallenge"),
        }
    }
}

/// Room visibility class. Private rooms require an invite code at creation
/// and at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    Public,
    Private,
    Tournament,
}

/// The lifecycle state of a room as reported by the ledger.
///
/// ```text
/// Filling ──(last seat taken)──→ Active ──(last score in)──→ Completed
///    │                              │
///    │ (creator cancels)            │ (expiry passes, observed on read)
///    ▼                              ▼
/// Canceled                       Expired
/// ```
///
/// - **Filling**: room exists and is accepting joins.
/// - **Active**: room is full; players are playing and submitting scores.
/// - **Completed**: every player submitted; the ledger picked a winner.
/// - **Expired**: the expiry timestamp passed before completion. Terminal.
/// - **Canceled**: the creator withdrew the room while Filling. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Filling,
    Active,
    Completed,
    Expired,
    Canceled,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Filling)
    }

    /// Returns `true` for states no event can leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Canceled)
    }

    /// Returns `true` if transitioning to `target` is a move the ledger
    /// could legally make. The client never performs transitions itself;
    /// this is used to sanity-check successive reads.
    pub fn can_transition_to(self, target: Self) -> bool {
        use RoomStatus::*;
        matches!(
            (self, target),
            (Filling, Active)
                | (Filling, Canceled)
                | (Filling, Expired)
                | (Active, Completed)
                | (Active, Expired)
        )
    }

    /// Position along the forward path. Used to tell "not there yet"
    /// apart from "already past it" when a precondition fails.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Filling => 0,
            Self::Active => 1,
            Self::Completed | Self::Expired | Self::Canceled => 2,
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filling => write!(f, "Filling"),
            Self::Active => write!(f, "Active"),
            Self::Completed => write!(f, "Completed"),
            Self::Expired => write!(f, "Expired"),
            Self::Canceled => write!(f, "Canceled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A validated point-in-time view of a room.
///
/// Produced only by the parse boundary ([`RoomSnapshot::from_raw`]); a
/// value of this type always satisfies the capacity invariants. The
/// snapshot may still *lag* true ledger state; staleness is the
/// reconciler's problem, shape is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub creator: PlayerAddr,
    /// Entry fee in points. Immutable.
    pub entry_fee: u64,
    pub max_players: u32,
    /// Seats taken so far, creator included. Never exceeds `max_players`.
    pub current_players: u32,
    pub game: GameKind,
    pub kind: RoomKind,
    pub status: RoomStatus,
    /// Unix seconds.
    pub created_at: u64,
    /// Absolute expiry, unix seconds.
    pub expires_at: u64,
    /// Accumulated entry fees, in points.
    pub prize_pool: u64,
    /// Set exactly once, when the room completes.
    pub winner: Option<PlayerAddr>,
    pub prize_claimed: bool,
}

impl RoomSnapshot {
    /// Returns `true` when every seat is taken.
    pub fn is_full(&self) -> bool {
        self.current_players >= self.max_players
    }

    /// Seats still open.
    pub fn seats_left(&self) -> u32 {
        self.max_players.saturating_sub(self.current_players)
    }

    /// Whether the expiry timestamp has passed at `now` (unix seconds).
    ///
    /// Expiry is observed lazily: the ledger flips the status only when
    /// something reads the room, so a snapshot can read `Filling` while
    /// being past its expiry.
    pub fn is_past_expiry(&self, now: u64) -> bool {
        now > self.expires_at
    }

    /// Case-insensitive creator check.
    pub fn is_creator(&self, who: &PlayerAddr) -> bool {
        self.creator == *who
    }
}

/// One player's record within one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub addr: PlayerAddr,
    /// Meaningful only once `has_submitted` is true.
    pub score: u64,
    /// Monotonic false→true; the ledger never reverts it.
    pub has_submitted: bool,
    /// Submission time, unix seconds. Zero until submitted.
    pub submitted_at: u64,
}

/// A discovery row: just enough of a room to render a joinable listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub game: GameKind,
    pub entry_fee: u64,
    pub current_players: u32,
    pub max_players: u32,
    pub created_at: u64,
}

impl RoomSummary {
    pub fn seats_left(&self) -> u32 {
        self.max_players.saturating_sub(self.current_players)
    }
}

impl From<&RoomSnapshot> for RoomSummary {
    fn from(room: &RoomSnapshot) -> Self {
        Self {
            id: room.id,
            game: room.game,
            entry_fee: room.entry_fee,
            current_players: room.current_players,
            max_players: room.max_players,
            created_at: room.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Parameters for creating a room.
///
/// Plain data; validation lives in the controller so a malformed request
/// is rejected before it costs a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub entry_fee: u64,
    pub max_players: u32,
    pub game: GameKind,
    pub kind: RoomKind,
    /// Required non-empty for [`RoomKind::Private`].
    pub invite_code: Option<String>,
    /// Lifetime in seconds; [`DEFAULT_EXPIRATION_SECS`] when `None`.
    pub expiration_secs: Option<u64>,
}

impl CreateRoomRequest {
    /// A public room with default expiry.
    pub fn public(entry_fee: u64, max_players: u32, game: GameKind) -> Self {
        Self {
            entry_fee,
            max_players,
            game,
            kind: RoomKind::Public,
            invite_code: None,
            expiration_secs: None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

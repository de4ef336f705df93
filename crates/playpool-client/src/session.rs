//! Session-scoped derived state.
//!
//! The flags the client derives from its own writes (has-played,
//! prize-claimed, the active room pointer) were ambient component
//! state in earlier incarnations of this client. Here they live in an
//! explicit value object owned by exactly one game session, so two
//! sessions (say, two tabs) can never corrupt each other's flags, and
//! loading a different room provably resets everything first.

use playpool_protocol::{PlayerRecord, RoomId, RoomSnapshot, RoomSummary};

/// Derived state for the one room a session is currently engaged with.
///
/// The ledger is the source of truth for room state; this is the source
/// of truth for *what we already did this session*, most importantly
/// the has-played flag, which must override a lagging read that doesn't
/// yet show our submitted score.
#[derive(Debug, Default)]
pub struct GameSession {
    active_room: Option<RoomId>,
    has_played: bool,
    prize_claimed: bool,
    /// One-shot handoff carrying a just-created room id across a page
    /// navigation. Cleared when read.
    pending_room: Option<RoomId>,
    /// Last observed snapshot for the active room. Invalidated by any
    /// local write targeting it.
    snapshot: Option<(RoomSnapshot, Vec<PlayerRecord>)>,
    /// Last discovery scan result. Invalidated by room creation.
    discovery: Option<Vec<RoomSummary>>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The room this session is engaged with, if any.
    pub fn active_room(&self) -> Option<RoomId> {
        self.active_room
    }

    /// Makes `room` the active room. Switching rooms drops every
    /// derived flag and cache *before* any new state is applied;
    /// has-played must never leak from one room to the next.
    pub fn adopt(&mut self, room: RoomId) {
        if self.active_room != Some(room) {
            self.reset();
            self.active_room = Some(room);
        }
    }

    /// Clears the session back to its initial state. The pending-room
    /// handoff survives; it belongs to the navigation, not the room.
    pub fn reset(&mut self) {
        self.active_room = None;
        self.has_played = false;
        self.prize_claimed = false;
        self.snapshot = None;
    }

    // -- has-played / claimed flags --

    /// Whether a score was submitted for `room` in this session.
    pub fn has_played(&self, room: RoomId) -> bool {
        self.active_room == Some(room) && self.has_played
    }

    /// Records a successful score submission for `room`.
    pub fn mark_played(&mut self, room: RoomId) {
        self.adopt(room);
        self.has_played = true;
        self.snapshot = None;
    }

    /// Whether the prize for `room` was claimed in this session.
    pub fn has_claimed(&self, room: RoomId) -> bool {
        self.active_room == Some(room) && self.prize_claimed
    }

    /// Records a successful prize claim for `room`.
    pub fn mark_claimed(&mut self, room: RoomId) {
        self.adopt(room);
        self.prize_claimed = true;
        self.snapshot = None;
    }

    // -- pending-room handoff --

    /// Stores a just-created room id for the next page to pick up.
    pub fn set_pending_room(&mut self, room: RoomId) {
        self.pending_room = Some(room);
    }

    /// Takes the pending room id, clearing it. Read-once by design.
    pub fn take_pending_room(&mut self) -> Option<RoomId> {
        self.pending_room.take()
    }

    // -- snapshot cache --

    /// Caches the latest observed snapshot of the active room.
    pub fn cache_snapshot(&mut self, room: RoomSnapshot, players: Vec<PlayerRecord>) {
        if self.active_room == Some(room.id) {
            self.snapshot = Some((room, players));
        }
    }

    /// The cached snapshot of the active room, if still valid.
    pub fn cached_snapshot(&self) -> Option<(&RoomSnapshot, &[PlayerRecord])> {
        self.snapshot.as_ref().map(|(r, p)| (r, p.as_slice()))
    }

    /// Drops the cached snapshot for `room` (after a local write).
    pub fn invalidate_snapshot(&mut self, room: RoomId) {
        if self.active_room == Some(room) {
            self.snapshot = None;
        }
    }

    // -- discovery cache --

    pub fn remember_discovery(&mut self, rooms: Vec<RoomSummary>) {
        self.discovery = Some(rooms);
    }

    pub fn cached_discovery(&self) -> Option<&[RoomSummary]> {
        self.discovery.as_deref()
    }

    /// Drops the discovery cache (a new room exists we haven't seen).
    pub fn clear_discovery(&mut self) {
        self.discovery = None;
    }
}

//! In-memory reference ledger.
//!
//! Implements the authoritative-side room rules so the client stack can
//! be exercised without a deployed chain: activation exactly when the
//! last seat is taken, completion when the last score lands, winner
//! selection, single prize claim, creator-only cancel, lazy expiry.
//!
//! Reads return the same *raw* records a real node would, so every test
//! that goes through this ledger also exercises the parse boundary.
//!
//! Test hooks: [`InMemoryLedger::script_read`] queues per-room read
//! overrides (stale snapshots, network failures, not-found), and
//! [`InMemoryLedger::write_count`] lets tests assert that an operation
//! issued, or did not issue, a ledger write.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use playpool_protocol::{
    CreateRoomRequest, PlayerAddr, RawPlayer, RawRoom, RoomId, RoomKind,
    DEFAULT_EXPIRATION_SECS,
};
use tokio::sync::Mutex;

use crate::{GatewayError, LedgerGateway};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Ledger-side state
// ---------------------------------------------------------------------------

/// Status codes as stored on chain. The typed enum exists only on the
/// client side of the parse boundary.
mod status {
    pub const FILLING: u8 = 0;
    pub const ACTIVE: u8 = 1;
    pub const COMPLETED: u8 = 2;
    pub const EXPIRED: u8 = 3;
    pub const CANCELED: u8 = 4;
}

#[derive(Debug, Clone)]
struct LedgerPlayer {
    addr: PlayerAddr,
    score: u64,
    has_submitted: bool,
    submitted_at: u64,
}

#[derive(Debug, Clone)]
struct LedgerRoom {
    id: u64,
    creator: PlayerAddr,
    entry_fee: u64,
    max_players: u32,
    game_type: u8,
    room_type: u8,
    status: u8,
    created_at: u64,
    expires_at: u64,
    prize_pool: u64,
    winner: Option<PlayerAddr>,
    prize_claimed: bool,
    invite_code: Option<String>,
    players: Vec<LedgerPlayer>,
}

impl LedgerRoom {
    fn member(&self, who: &PlayerAddr) -> Option<&LedgerPlayer> {
        self.players.iter().find(|p| p.addr == *who)
    }

    fn member_mut(&mut self, who: &PlayerAddr) -> Option<&mut LedgerPlayer> {
        self.players.iter_mut().find(|p| p.addr == *who)
    }

    /// Expiry is observed lazily: nothing flips the status until a read
    /// or write touches the room past its deadline.
    fn observe_expiry(&mut self, now: u64) {
        if matches!(self.status, status::FILLING | status::ACTIVE) && now > self.expires_at {
            self.status = status::EXPIRED;
            tracing::info!(room_id = self.id, "room expired");
        }
    }

    /// Winner = highest score; ties go to the earliest submission.
    /// Clients must treat this rule as opaque ledger policy.
    fn pick_winner(&self) -> Option<PlayerAddr> {
        self.players
            .iter()
            .filter(|p| p.has_submitted)
            .max_by(|a, b| {
                a.score
                    .cmp(&b.score)
                    .then(b.submitted_at.cmp(&a.submitted_at))
            })
            .map(|p| p.addr.clone())
    }

    fn to_raw(&self) -> RawRoom {
        RawRoom {
            id: self.id,
            creator: self.creator.as_str().to_owned(),
            entry_fee: self.entry_fee,
            max_players: self.max_players,
            current_players: self.players.len() as u32,
            game_type: self.game_type,
            room_type: self.room_type,
            status: self.status,
            creation_time: self.created_at,
            expiration_time: self.expires_at,
            prize_pool: self.prize_pool,
            winner: self
                .winner
                .as_ref()
                .map(|w| w.as_str().to_owned())
                .unwrap_or_default(),
            prize_claimed: self.prize_claimed,
        }
    }
}

// ---------------------------------------------------------------------------
// Read scripting (test hook)
// ---------------------------------------------------------------------------

/// A queued override for the next `get_room` read of one room.
///
/// Lets tests simulate read-after-write lag, transient read failures,
/// and corrupted snapshots without racing a real node.
#[derive(Debug, Clone)]
pub enum ReadScript {
    /// Return this raw record instead of live state.
    Room(RawRoom),
    /// Report the room as not found.
    NotFound,
    /// Fail the read with a network error.
    NetworkError(String),
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LedgerState {
    next_id: u64,
    rooms: HashMap<u64, LedgerRoom>,
    scripts: HashMap<u64, VecDeque<ReadScript>>,
    write_count: u64,
}

/// A local, fully in-process implementation of [`LedgerGateway`].
///
/// Shared freely via `&self`; all state sits behind one async mutex,
/// which also serves as the "ledger serializes conflicting writes"
/// guarantee the client relies on.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a read override for `room`; consumed FIFO before live
    /// state on subsequent `get_room` calls.
    pub async fn script_read(&self, room: RoomId, script: ReadScript) {
        let mut state = self.state.lock().await;
        state.scripts.entry(room.0).or_default().push_back(script);
    }

    /// Number of write intents that reached the ledger, successful or
    /// not. Reads never count.
    pub async fn write_count(&self) -> u64 {
        self.state.lock().await.write_count
    }

    /// Rewinds a room's expiry into the past so the next touch observes
    /// it as expired. Test hook.
    pub async fn force_expire(&self, room: RoomId) {
        let mut state = self.state.lock().await;
        if let Some(r) = state.rooms.get_mut(&room.0) {
            r.expires_at = 0;
        }
    }
}

fn room_not_found() -> GatewayError {
    GatewayError::reverted("room does not exist")
}

impl LedgerGateway for InMemoryLedger {
    async fn create_room(
        &self,
        caller: &PlayerAddr,
        req: &CreateRoomRequest,
    ) -> Result<RoomId, GatewayError> {
        let mut state = self.state.lock().await;
        state.write_count += 1;

        // The contract re-checks what the client already validated.
        if req.entry_fee == 0 {
            return Err(GatewayError::reverted("entry fee must be positive"));
        }
        if req.max_players < 2 {
            return Err(GatewayError::reverted("need at least 2 players"));
        }
        if req.kind == RoomKind::Private
            && req.invite_code.as_deref().unwrap_or("").is_empty()
        {
            return Err(GatewayError::reverted("private room needs an invite code"));
        }

        state.next_id += 1;
        let id = state.next_id;
        let now = now_secs();
        let lifetime = req.expiration_secs.unwrap_or(DEFAULT_EXPIRATION_SECS);

        let room = LedgerRoom {
            id,
            creator: caller.clone(),
            entry_fee: req.entry_fee,
            max_players: req.max_players,
            game_type: match req.game {
                playpool_protocol::GameKind::FlappyBird => 0,
                playpool_protocol::GameKind::AiChallenge => 1,
            },
            room_type: match req.kind {
                RoomKind::Public => 0,
                RoomKind::Private => 1,
                RoomKind::Tournament => 2,
            },
            status: status::FILLING,
            created_at: now,
            expires_at: now + lifetime,
            prize_pool: req.entry_fee,
            winner: None,
            prize_claimed: false,
            invite_code: req.invite_code.clone(),
            // The creator is implicitly the first player.
            players: vec![LedgerPlayer {
                addr: caller.clone(),
                score: 0,
                has_submitted: false,
                submitted_at: 0,
            }],
        };
        state.rooms.insert(id, room);

        tracing::info!(room_id = id, creator = %caller, "room created");
        Ok(RoomId(id))
    }

    async fn join_room(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
        invite_code: Option<&str>,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.write_count += 1;
        let now = now_secs();

        let r = state.rooms.get_mut(&room.0).ok_or_else(room_not_found)?;
        r.observe_expiry(now);

        if r.status != status::FILLING {
            return Err(GatewayError::reverted("room is not accepting players"));
        }
        if r.players.len() as u32 >= r.max_players {
            return Err(GatewayError::reverted("room is full"));
        }
        if r.member(caller).is_some() {
            return Err(GatewayError::reverted("already joined"));
        }
        if let Some(expected) = r.invite_code.as_deref() {
            if invite_code != Some(expected) {
                return Err(GatewayError::reverted("invalid invite code"));
            }
        }

        r.players.push(LedgerPlayer {
            addr: caller.clone(),
            score: 0,
            has_submitted: false,
            submitted_at: 0,
        });
        r.prize_pool += r.entry_fee;

        // Filling → Active exactly when the last seat is taken.
        if r.players.len() as u32 == r.max_players {
            r.status = status::ACTIVE;
            tracing::info!(room_id = room.0, "room full, activated");
        }

        tracing::info!(
            room_id = room.0,
            player = %caller,
            players = r.players.len(),
            "player joined"
        );
        Ok(())
    }

    async fn submit_score(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
        score: u64,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.write_count += 1;
        let now = now_secs();

        let r = state.rooms.get_mut(&room.0).ok_or_else(room_not_found)?;
        r.observe_expiry(now);

        if r.status != status::ACTIVE {
            return Err(GatewayError::reverted("room is not active"));
        }
        let Some(player) = r.member_mut(caller) else {
            return Err(GatewayError::reverted("not a player in this room"));
        };
        if player.has_submitted {
            return Err(GatewayError::reverted("score already submitted"));
        }

        player.score = score;
        player.has_submitted = true;
        player.submitted_at = now;

        // Completed exactly when the last outstanding score lands.
        if r.players.iter().all(|p| p.has_submitted) {
            r.winner = r.pick_winner();
            r.status = status::COMPLETED;
            tracing::info!(
                room_id = room.0,
                winner = ?r.winner.as_ref().map(|w| w.as_str()),
                "all scores in, room completed"
            );
        }

        tracing::info!(room_id = room.0, player = %caller, score, "score submitted");
        Ok(())
    }

    async fn claim_prize(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.write_count += 1;

        let r = state.rooms.get_mut(&room.0).ok_or_else(room_not_found)?;

        if r.status != status::COMPLETED {
            return Err(GatewayError::reverted("room is not completed"));
        }
        if r.winner.as_ref() != Some(caller) {
            return Err(GatewayError::reverted("caller is not the winner"));
        }
        if r.prize_claimed {
            return Err(GatewayError::reverted("prize already claimed"));
        }

        r.prize_claimed = true;
        tracing::info!(room_id = room.0, winner = %caller, prize = r.prize_pool, "prize claimed");
        Ok(())
    }

    async fn cancel_room(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.write_count += 1;
        let now = now_secs();

        let r = state.rooms.get_mut(&room.0).ok_or_else(room_not_found)?;
        r.observe_expiry(now);

        if r.creator != *caller {
            return Err(GatewayError::reverted("only the creator can cancel"));
        }
        if r.status != status::FILLING {
            return Err(GatewayError::reverted("room is not filling"));
        }

        r.status = status::CANCELED;
        tracing::info!(room_id = room.0, "room canceled");
        Ok(())
    }

    async fn get_room(&self, room: RoomId) -> Result<Option<RawRoom>, GatewayError> {
        let mut state = self.state.lock().await;

        // Scripted overrides win over live state, consumed FIFO.
        if let Some(queue) = state.scripts.get_mut(&room.0) {
            if let Some(script) = queue.pop_front() {
                return match script {
                    ReadScript::Room(raw) => Ok(Some(raw)),
                    ReadScript::NotFound => Ok(None),
                    ReadScript::NetworkError(msg) => Err(GatewayError::Network(msg)),
                };
            }
        }

        let now = now_secs();
        Ok(state.rooms.get_mut(&room.0).map(|r| {
            r.observe_expiry(now);
            r.to_raw()
        }))
    }

    async fn get_players(&self, room: RoomId) -> Result<Vec<RawPlayer>, GatewayError> {
        let state = self.state.lock().await;
        Ok(state
            .rooms
            .get(&room.0)
            .map(|r| {
                r.players
                    .iter()
                    .map(|p| RawPlayer {
                        player_address: p.addr.as_str().to_owned(),
                        score: p.score,
                        has_submitted_score: p.has_submitted,
                        timestamp: p.submitted_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_player_rooms(
        &self,
        player: &PlayerAddr,
    ) -> Result<Vec<RoomId>, GatewayError> {
        let state = self.state.lock().await;
        let mut ids: Vec<RoomId> = state
            .rooms
            .values()
            .filter(|r| r.member(player).is_some())
            .map(|r| RoomId(r.id))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

// =========================================================================
// Tests
// =========================================================================

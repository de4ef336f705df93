//! The room lifecycle controller: the write-side driver.
//!
//! Sequences intents against the ledger gateway in state-machine order
//! (create → join → submit → claim), with every precondition checked
//! against a fresh read *before* a transaction is spent. The checks are
//! idempotency-aware: "already done" reads as success or a precise
//! local error, never as a blind retry; retries could double-spend an
//! entry fee or double-submit a score, so the controller never issues
//! them on its own.
//!
//! All read-side decisions are delegated to [`reconcile`]; the
//! controller interprets views, it does not re-derive rules.

use std::sync::Arc;

use playpool_gateway::LedgerGateway;
use playpool_protocol::{
    CreateRoomRequest, PlayerAddr, PlayerRecord, RoomId, RoomKind, RoomSnapshot,
    RoomStatus,
};

use crate::adapter::{score_channel, GameAdapter};
use crate::error::ClientError;
use crate::poll::{unix_now, CompletionPoller, PollConfig, PollOutcome};
use crate::reconcile::{reconcile, RoomView};
use crate::session::GameSession;

/// Controller settings. Only polling is tunable today.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub poll: PollConfig,
}

/// Result of a join intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The ledger accepted the join.
    Joined,
    /// We were already creator or player; treated as success without
    /// issuing a ledger write.
    AlreadyMember,
}

/// Drives one player's room lifecycle against a [`LedgerGateway`].
///
/// Owns the session-scoped derived state; one controller per active
/// game session. Methods take `&mut self`, which also structurally
/// rules out two concurrent pollers or interleaved intents from the
/// same session.
pub struct RoomController<G> {
    gateway: Arc<G>,
    identity: Option<PlayerAddr>,
    session: GameSession,
    poller: CompletionPoller,
}

impl<G: LedgerGateway> RoomController<G> {
    /// Creates a controller. `identity` is `None` while no wallet is
    /// connected; every write intent then fails fast with
    /// [`ClientError::NotAuthenticated`].
    pub fn new(gateway: Arc<G>, identity: Option<PlayerAddr>) -> Self {
        Self::with_config(gateway, identity, ControllerConfig::default())
    }

    pub fn with_config(
        gateway: Arc<G>,
        identity: Option<PlayerAddr>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            gateway,
            identity,
            session: GameSession::new(),
            poller: CompletionPoller::new(config.poll),
        }
    }

    /// The connected wallet, if any.
    pub fn identity(&self) -> Option<&PlayerAddr> {
        self.identity.as_ref()
    }

    /// The session-scoped derived state (pending-room handoff, caches).
    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    fn require_identity(&self) -> Result<PlayerAddr, ClientError> {
        self.identity.clone().ok_or(ClientError::NotAuthenticated)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Reads and parses one room plus its player records. `NotFound`
    /// here is an error: the caller targeted this id explicitly.
    async fn read_room(
        &self,
        room: RoomId,
    ) -> Result<(RoomSnapshot, Vec<PlayerRecord>), ClientError> {
        let raw = self
            .gateway
            .get_room(room)
            .await?
            .ok_or(ClientError::NotFound(room))?;
        let snapshot = RoomSnapshot::from_raw(raw)?;

        let players = self
            .gateway
            .get_players(room)
            .await?
            .into_iter()
            .map(|p| PlayerRecord::from_raw(room, p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((snapshot, players))
    }

    /// Loads `room` as the session's active room and returns its view.
    ///
    /// Switching rooms resets all derived session flags *before* the
    /// new room's state is applied; nothing leaks across rooms.
    pub async fn load_room(&mut self, room: RoomId) -> Result<RoomView, ClientError> {
        self.session.adopt(room);
        let (snapshot, players) = self.read_room(room).await?;
        let view = reconcile(&snapshot, &players, self.identity.as_ref(), unix_now())?;
        self.session.cache_snapshot(snapshot, players);
        Ok(view)
    }

    /// Lists the rooms the connected wallet has joined.
    pub async fn my_rooms(&self) -> Result<Vec<RoomId>, ClientError> {
        let me = self.require_identity()?;
        Ok(self.gateway.get_player_rooms(&me).await?)
    }

    // -----------------------------------------------------------------
    // Write intents
    // -----------------------------------------------------------------

    /// Creates a room and returns the ledger-assigned id.
    ///
    /// Malformed requests are rejected locally; no doomed transaction
    /// is ever issued. On success the id is stored as the pending-room
    /// handoff and any cached discovery listing is invalidated.
    pub async fn create_room(
        &mut self,
        req: &CreateRoomRequest,
    ) -> Result<RoomId, ClientError> {
        let me = self.require_identity()?;

        if req.entry_fee == 0 {
            return Err(ClientError::Validation("entry fee must be positive".into()));
        }
        if req.max_players < 2 {
            return Err(ClientError::Validation(
                "a room needs at least 2 players".into(),
            ));
        }
        if req.kind == RoomKind::Private
            && req.invite_code.as_deref().unwrap_or("").is_empty()
        {
            return Err(ClientError::Validation(
                "private rooms need an invite code".into(),
            ));
        }

        let room = self.gateway.create_room(&me, req).await?;

        self.session.clear_discovery();
        self.session.set_pending_room(room);
        tracing::info!(room_id = %room, fee = req.entry_fee, "room created");
        Ok(room)
    }

    /// Joins a room, idempotently.
    ///
    /// Re-reads first: if we already hold a seat (creator included)
    /// this is a no-op success; a join transaction that the ledger
    /// would reject anyway is never issued.
    pub async fn join_room(
        &mut self,
        room: RoomId,
        invite_code: Option<&str>,
    ) -> Result<JoinOutcome, ClientError> {
        let me = self.require_identity()?;
        let (snapshot, players) = self.read_room(room).await?;

        match reconcile(&snapshot, &players, Some(&me), unix_now())? {
            // Membership wins over everything else, invite codes
            // included: a member rejoining is a no-op success.
            RoomView::WaitingForFill { .. }
            | RoomView::ReadyToPlay
            | RoomView::WaitingForOthers { .. } => {
                tracing::debug!(room_id = %room, "already a member, join skipped");
                self.session.adopt(room);
                return Ok(JoinOutcome::AlreadyMember);
            }
            RoomView::NeedsJoin { .. } => {
                if snapshot.kind == RoomKind::Private
                    && invite_code.unwrap_or("").is_empty()
                {
                    return Err(ClientError::Validation(
                        "this room requires an invite code".into(),
                    ));
                }
            }
            RoomView::NotAPlayer => {
                // Full or already running; either way no seat for us.
                let observed = if snapshot.status == RoomStatus::Filling {
                    RoomStatus::Active
                } else {
                    snapshot.status
                };
                return Err(ClientError::Precondition {
                    room,
                    required: RoomStatus::Filling,
                    observed,
                });
            }
            RoomView::Completed { .. } | RoomView::Terminal { .. } => {
                return Err(ClientError::Precondition {
                    room,
                    required: RoomStatus::Filling,
                    observed: snapshot.status,
                });
            }
        }

        self.gateway.join_room(&me, room, invite_code).await?;
        self.session.adopt(room);
        self.session.invalidate_snapshot(room);
        tracing::info!(room_id = %room, "joined room");
        Ok(JoinOutcome::Joined)
    }

    /// Submits the final score for `room`, exactly once per session.
    ///
    /// The local has-played flag is checked first and is the source of
    /// truth: after one success, a second call fails with
    /// [`ClientError::AlreadySubmitted`] without any gateway traffic,
    /// even while reads still lag the successful write.
    pub async fn submit_score(
        &mut self,
        room: RoomId,
        score: u64,
    ) -> Result<(), ClientError> {
        let me = self.require_identity()?;

        if self.session.has_played(room) {
            return Err(ClientError::AlreadySubmitted(room));
        }

        let (snapshot, players) = self.read_room(room).await?;
        match reconcile(&snapshot, &players, Some(&me), unix_now())? {
            RoomView::ReadyToPlay => {}
            // Don't spend a transaction the contract will revert.
            RoomView::NeedsJoin { .. } | RoomView::WaitingForFill { .. } => {
                return Err(ClientError::Precondition {
                    room,
                    required: RoomStatus::Active,
                    observed: RoomStatus::Filling,
                });
            }
            RoomView::WaitingForOthers { .. } => {
                // The ledger already has our score; resync the flag.
                self.session.mark_played(room);
                return Err(ClientError::AlreadySubmitted(room));
            }
            RoomView::NotAPlayer => return Err(ClientError::NotAPlayer(room)),
            RoomView::Completed { .. } | RoomView::Terminal { .. } => {
                return Err(ClientError::Precondition {
                    room,
                    required: RoomStatus::Active,
                    observed: snapshot.status,
                });
            }
        }

        self.gateway.submit_score(&me, room, score).await?;
        self.session.mark_played(room);
        tracing::info!(room_id = %room, score, "score submitted");
        Ok(())
    }

    /// Claims the prize pool of a completed room.
    ///
    /// Fails fast with [`ClientError::NotEligible`] unless the local
    /// view shows Completed with us as the winner and the prize
    /// unclaimed. A repeat claim is caught by the session flag before
    /// any gateway call, even while reads lag the first claim.
    pub async fn claim_prize(&mut self, room: RoomId) -> Result<(), ClientError> {
        let me = self.require_identity()?;

        if self.session.has_claimed(room) {
            return Err(ClientError::NotEligible(room));
        }

        let (snapshot, players) = self.read_room(room).await?;
        match reconcile(&snapshot, &players, Some(&me), unix_now())? {
            RoomView::Completed {
                is_self_winner: true,
                prize_claimed: false,
                ..
            } => {}
            _ => return Err(ClientError::NotEligible(room)),
        }

        self.gateway.claim_prize(&me, room).await?;
        self.session.mark_claimed(room);
        tracing::info!(room_id = %room, prize = snapshot.prize_pool, "prize claimed");
        Ok(())
    }

    /// Cancels a room we created, while it is still Filling.
    pub async fn cancel_room(&mut self, room: RoomId) -> Result<(), ClientError> {
        let me = self.require_identity()?;
        let (snapshot, _) = self.read_room(room).await?;

        if !snapshot.is_creator(&me) {
            return Err(ClientError::Validation(format!(
                "only the creator can cancel {room}"
            )));
        }
        if snapshot.status != RoomStatus::Filling {
            return Err(ClientError::Precondition {
                room,
                required: RoomStatus::Filling,
                observed: snapshot.status,
            });
        }

        self.gateway.cancel_room(&me, room).await?;
        self.session.invalidate_snapshot(room);
        tracing::info!(room_id = %room, "room canceled");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Play + polling
    // -----------------------------------------------------------------

    /// Runs one full play session: verifies we're clear to play, hands
    /// the game a one-shot score reporter, waits for the final score,
    /// and submits it. Returns the submitted score.
    pub async fn play<A: GameAdapter>(
        &mut self,
        room: RoomId,
        game: &mut A,
    ) -> Result<u64, ClientError> {
        match self.load_room(room).await? {
            RoomView::ReadyToPlay => {}
            RoomView::WaitingForOthers { .. } => {
                return Err(ClientError::AlreadySubmitted(room));
            }
            RoomView::NotAPlayer => return Err(ClientError::NotAPlayer(room)),
            other => {
                tracing::debug!(room_id = %room, view = ?other, "not playable");
                let observed = self
                    .session
                    .cached_snapshot()
                    .map(|(r, _)| r.status)
                    .unwrap_or(RoomStatus::Filling);
                return Err(ClientError::Precondition {
                    room,
                    required: RoomStatus::Active,
                    observed,
                });
            }
        }

        let (reporter, score) = score_channel();
        game.set_disabled(false);
        game.start(reporter);
        let score = score.score().await;
        // The game is re-disabled whether or not a score arrived.
        game.set_disabled(true);
        let score = score.ok_or_else(|| {
            ClientError::Validation("game ended without reporting a score".into())
        })?;

        self.submit_score(room, score).await?;
        Ok(score)
    }

    /// Polls until `room` settles (everyone submitted, or the room
    /// died), up to the configured timeout.
    ///
    /// Cancellation is dropping the future; `&mut self` guarantees no
    /// second poller can be started for this session while one runs.
    pub async fn await_completion(
        &mut self,
        room: RoomId,
    ) -> Result<PollOutcome, ClientError> {
        self.session.adopt(room);
        self.poller
            .run(self.gateway.as_ref(), room, self.identity.as_ref())
            .await
    }
}

//! The room state reconciler.
//!
//! `reconcile` is the read-side mirror of the lifecycle state machine:
//! given the latest snapshot, the player records, and who we are, it
//! decides what the room means *for us*. It is a pure function (same
//! inputs, same [`RoomView`]), which is why `now` is a parameter rather
//! than a clock read. Business rules live here and nowhere else; the
//! controller and UI only consume the verdict.

use playpool_protocol::{PlayerAddr, PlayerRecord, RoomSnapshot, RoomStatus, SnapshotError};
use serde::{Deserialize, Serialize};

/// Why a room reached a terminal dead-end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalReason {
    Expired,
    Canceled,
}

/// What a room means for the local identity, ready to render or act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomView {
    /// Room is Filling, has a seat, and we are not in it yet.
    NeedsJoin { seats_left: u32 },

    /// We are in (or created) a Filling room. `pending_activation` is
    /// set for the transient read artifact where the room is full but
    /// activation hasn't been observed yet; re-read shortly rather
    /// than treating it as an error.
    WaitingForFill { pending_activation: bool },

    /// Room is Active, we are a player, and our score is outstanding.
    ReadyToPlay,

    /// We submitted; not everyone has.
    WaitingForOthers { submitted: u32, total: u32 },

    /// The room moved past Filling without us. Full and active rooms
    /// cannot be joined.
    NotAPlayer,

    /// The ledger picked a winner. `winner` is ledger-authoritative;
    /// the client never computes tie-breaks itself.
    Completed {
        winner: Option<PlayerAddr>,
        prize_pool: u64,
        is_self_winner: bool,
        prize_claimed: bool,
    },

    /// Expired or canceled; nothing further can happen.
    Terminal { reason: TerminalReason },
}

impl RoomView {
    /// Whether this view ends the completion-polling loop.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Terminal { .. })
    }
}

/// Computes the [`RoomView`] for `self_id` from one observed snapshot.
///
/// `players` is the room's player records in join order (possibly empty
/// on a lagging read); `self_id` is `None` when no wallet is connected,
/// in which case the viewer can never be a member. `now` is unix
/// seconds, used only for lazy expiry observation.
///
/// Fails with [`SnapshotError`] on snapshots that violate the data
/// model; staleness and partial reads are handled, corruption is not.
pub fn reconcile(
    room: &RoomSnapshot,
    players: &[PlayerRecord],
    self_id: Option<&PlayerAddr>,
    now: u64,
) -> Result<RoomView, SnapshotError> {
    // Re-validate even though the parse boundary already did: call
    // sites may construct snapshots directly.
    if room.max_players < 2 {
        return Err(SnapshotError::BadCapacity {
            room: room.id,
            max_players: room.max_players,
        });
    }
    if room.current_players > room.max_players {
        return Err(SnapshotError::Overfull {
            room: room.id,
            current: room.current_players,
            max: room.max_players,
        });
    }

    let self_record = self_id.and_then(|id| players.iter().find(|p| p.addr == *id));
    let is_member =
        self_record.is_some() || self_id.is_some_and(|id| room.is_creator(id));

    // Expiry is observed lazily; a Filling/Active snapshot past its
    // deadline is already dead, whatever the status field says.
    if !room.status.is_terminal() && room.is_past_expiry(now) {
        return Ok(RoomView::Terminal {
            reason: TerminalReason::Expired,
        });
    }

    let view = match room.status {
        RoomStatus::Filling => {
            if is_member {
                RoomView::WaitingForFill {
                    pending_activation: room.is_full(),
                }
            } else if room.is_full() {
                // Full but not yet observed as Active; either way there
                // is no seat for us.
                RoomView::NotAPlayer
            } else {
                RoomView::NeedsJoin {
                    seats_left: room.seats_left(),
                }
            }
        }

        RoomStatus::Active => {
            if !is_member {
                RoomView::NotAPlayer
            } else if self_record.is_some_and(|r| r.has_submitted) {
                RoomView::WaitingForOthers {
                    submitted: players.iter().filter(|p| p.has_submitted).count() as u32,
                    total: room.current_players,
                }
            } else {
                RoomView::ReadyToPlay
            }
        }

        RoomStatus::Completed => {
            let is_self_winner = match (self_id, &room.winner) {
                (Some(me), Some(w)) => *w == *me,
                _ => false,
            };
            RoomView::Completed {
                winner: room.winner.clone(),
                prize_pool: room.prize_pool,
                is_self_winner,
                prize_claimed: room.prize_claimed,
            }
        }

        RoomStatus::Expired => RoomView::Terminal {
            reason: TerminalReason::Expired,
        },
        RoomStatus::Canceled => RoomView::Terminal {
            reason: TerminalReason::Canceled,
        },
    };

    Ok(view)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use playpool_protocol::{GameKind, RoomId, RoomKind};

    use super::*;

    const NOW: u64 = 2_000;

    fn room(status: RoomStatus, current: u32, max: u32) -> RoomSnapshot {
        RoomSnapshot {
            id: RoomId(7),
            creator: PlayerAddr::new("0xCreator"),
            entry_fee: 50,
            max_players: max,
            current_players: current,
            game: GameKind::FlappyBird,
            kind: RoomKind::Public,
            status,
            created_at: 1_000,
            expires_at: 4_600,
            prize_pool: 50 * current as u64,
            winner: None,
            prize_claimed: false,
        }
    }

    fn player(addr: &str, score: u64, submitted: bool) -> PlayerRecord {
        PlayerRecord {
            addr: PlayerAddr::new(addr),
            score,
            has_submitted: submitted,
            submitted_at: if submitted { 1_500 } else { 0 },
        }
    }

    fn me() -> PlayerAddr {
        PlayerAddr::new("0xMe")
    }

    #[test]
    fn test_stranger_sees_needs_join_while_filling() {
        let view = reconcile(
            &room(RoomStatus::Filling, 1, 3),
            &[player("0xCreator", 0, false)],
            Some(&me()),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::NeedsJoin { seats_left: 2 });
    }

    #[test]
    fn test_creator_sees_waiting_for_fill() {
        let view = reconcile(
            &room(RoomStatus::Filling, 1, 2),
            &[player("0xCreator", 0, false)],
            Some(&PlayerAddr::new("0xcreator")),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::WaitingForFill { pending_activation: false });
    }

    #[test]
    fn test_member_sees_waiting_even_without_player_record() {
        // Read lag: the creator's record hasn't shown up in getPlayers
        // yet, but the snapshot's creator field identifies them.
        let view = reconcile(
            &room(RoomStatus::Filling, 1, 2),
            &[],
            Some(&PlayerAddr::new("0xCreator")),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::WaitingForFill { pending_activation: false });
    }

    #[test]
    fn test_full_but_still_filling_flags_pending_activation() {
        let mut r = room(RoomStatus::Filling, 2, 2);
        r.creator = me();
        let view = reconcile(
            &r,
            &[player("0xMe", 0, false), player("0xOther", 0, false)],
            Some(&me()),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::WaitingForFill { pending_activation: true });
    }

    #[test]
    fn test_full_filling_room_is_not_joinable_for_stranger() {
        let view = reconcile(
            &room(RoomStatus::Filling, 2, 2),
            &[player("0xCreator", 0, false), player("0xOther", 0, false)],
            Some(&me()),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::NotAPlayer);
    }

    #[test]
    fn test_active_member_without_submission_is_ready_to_play() {
        let view = reconcile(
            &room(RoomStatus::Active, 2, 2),
            &[player("0xCreator", 0, false), player("0xMe", 0, false)],
            Some(&me()),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::ReadyToPlay);
    }

    #[test]
    fn test_active_member_after_submission_waits_for_others() {
        let view = reconcile(
            &room(RoomStatus::Active, 3, 3),
            &[
                player("0xCreator", 10, true),
                player("0xMe", 42, true),
                player("0xOther", 0, false),
            ],
            Some(&me()),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::WaitingForOthers { submitted: 2, total: 3 });
    }

    #[test]
    fn test_active_stranger_is_not_a_player() {
        let view = reconcile(
            &room(RoomStatus::Active, 2, 2),
            &[player("0xCreator", 0, false), player("0xOther", 0, false)],
            Some(&me()),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::NotAPlayer);
    }

    #[test]
    fn test_completed_view_for_winner_and_loser() {
        let mut r = room(RoomStatus::Completed, 2, 2);
        r.winner = Some(PlayerAddr::new("0xME"));
        r.prize_pool = 100;
        let players = [player("0xCreator", 40, true), player("0xMe", 60, true)];

        let view = reconcile(&r, &players, Some(&me()), NOW).unwrap();
        assert_eq!(
            view,
            RoomView::Completed {
                winner: Some(PlayerAddr::new("0xME")),
                prize_pool: 100,
                is_self_winner: true,
                prize_claimed: false,
            }
        );

        let loser = PlayerAddr::new("0xCreator");
        let view = reconcile(&r, &players, Some(&loser), NOW).unwrap();
        assert!(
            matches!(view, RoomView::Completed { is_self_winner: false, .. })
        );
    }

    #[test]
    fn test_unauthenticated_viewer_is_never_a_member() {
        let view = reconcile(
            &room(RoomStatus::Filling, 1, 2),
            &[player("0xCreator", 0, false)],
            None,
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::NeedsJoin { seats_left: 1 });

        let view = reconcile(
            &room(RoomStatus::Active, 2, 2),
            &[player("0xCreator", 0, false), player("0xOther", 0, false)],
            None,
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::NotAPlayer);
    }

    #[test]
    fn test_lazy_expiry_overrides_reported_status() {
        let r = room(RoomStatus::Filling, 1, 2);
        let past_deadline = r.expires_at + 1;
        let view = reconcile(&r, &[], Some(&me()), past_deadline).unwrap();
        assert_eq!(view, RoomView::Terminal { reason: TerminalReason::Expired });

        // Completed rooms don't expire retroactively.
        let mut done = room(RoomStatus::Completed, 2, 2);
        done.winner = Some(me());
        let view = reconcile(&done, &[], Some(&me()), past_deadline).unwrap();
        assert!(matches!(view, RoomView::Completed { .. }));
    }

    #[test]
    fn test_terminal_statuses_map_to_reasons() {
        let view =
            reconcile(&room(RoomStatus::Expired, 1, 2), &[], Some(&me()), NOW).unwrap();
        assert_eq!(view, RoomView::Terminal { reason: TerminalReason::Expired });

        let view =
            reconcile(&room(RoomStatus::Canceled, 1, 2), &[], Some(&me()), NOW).unwrap();
        assert_eq!(view, RoomView::Terminal { reason: TerminalReason::Canceled });
    }

    #[test]
    fn test_corrupt_snapshots_are_rejected() {
        let mut r = room(RoomStatus::Filling, 1, 2);
        r.max_players = 0;
        r.current_players = 0;
        assert!(matches!(
            reconcile(&r, &[], Some(&me()), NOW),
            Err(SnapshotError::BadCapacity { .. })
        ));

        let mut r = room(RoomStatus::Active, 3, 2);
        r.current_players = 3;
        assert!(matches!(
            reconcile(&r, &[], Some(&me()), NOW),
            Err(SnapshotError::Overfull { .. })
        ));
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let r = room(RoomStatus::Active, 2, 2);
        let players = [player("0xCreator", 0, false), player("0xMe", 0, false)];
        let first = reconcile(&r, &players, Some(&me()), NOW).unwrap();
        for _ in 0..10 {
            assert_eq!(reconcile(&r, &players, Some(&me()), NOW).unwrap(), first);
        }
    }

    #[test]
    fn test_membership_is_case_insensitive() {
        let view = reconcile(
            &room(RoomStatus::Active, 2, 2),
            &[player("0xCreator", 0, false), player("0xME", 0, false)],
            Some(&PlayerAddr::new("0xme")),
            NOW,
        )
        .unwrap();
        assert_eq!(view, RoomView::ReadyToPlay);
    }

    #[test]
    fn test_view_serializes_with_type_tag() {
        let json =
            serde_json::to_value(RoomView::WaitingForFill { pending_activation: true })
                .unwrap();
        assert_eq!(json["type"], "WaitingForFill");
        assert_eq!(json["pending_activation"], true);
    }
}

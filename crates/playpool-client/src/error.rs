//! The client error taxonomy.
//!
//! Four things can go wrong from the user's point of view, and every
//! error this crate produces classifies into exactly one of them (see
//! [`ErrorClass`]). Validation and precondition failures are resolved
//! locally and never cost a gateway call; gateway failures are surfaced
//! once and never retried automatically.

use playpool_gateway::GatewayError;
use playpool_protocol::{RoomId, RoomStatus, SnapshotError};

/// Errors surfaced by the room lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Malformed local input. Caught before any gateway call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// No wallet identity is attached to this controller.
    #[error("no wallet connected")]
    NotAuthenticated,

    /// The room is not in the lifecycle stage the operation requires.
    /// Names both stages so the message explains itself.
    #[error("{room} is {observed}, but this action requires {required}")]
    Precondition {
        room: RoomId,
        required: RoomStatus,
        observed: RoomStatus,
    },

    /// A score was already submitted for this room in this session.
    /// Decided from the local has-played flag, deliberately independent
    /// of the next ledger read (which may lag the successful write).
    #[error("score already submitted for {0}")]
    AlreadySubmitted(RoomId),

    /// The caller is not the (unclaimed-prize) winner of this room.
    #[error("not eligible to claim the prize for {0}")]
    NotEligible(RoomId),

    /// The caller holds no seat in this room, and the room is past the
    /// point where one could be taken.
    #[error("no player slot in {0} for this wallet")]
    NotAPlayer(RoomId),

    /// A read the user explicitly targeted found no room at that id.
    #[error("{0} not found")]
    NotFound(RoomId),

    /// A read returned data that violates the room model. Corruption,
    /// not staleness; a later read may still come back clean.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The remote call itself failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The user-facing failure buckets.
///
/// Presentation is out of scope here; classification is not. Every
/// [`ClientError`] maps to exactly one bucket so the UI can pick the
/// right treatment without inspecting variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Fix your input (or connect a wallet) and try again.
    FixInput,
    /// The room isn't at that stage yet; wait and re-read.
    NotReady,
    /// The network/contract call failed; the same intent is safe to
    /// re-issue. Corrupt reads land here too: the record itself is
    /// beyond repair, but no write was issued and a later read of the
    /// same room may come back clean.
    TryAgain,
    /// The room no longer accepts that action.
    NotAccepted,
}

impl ClientError {
    /// Classifies the error into its user-facing bucket.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::NotAuthenticated => ErrorClass::FixInput,
            // Behind the required stage: wait. Past it: that ship sailed.
            Self::Precondition { required, observed, .. } => {
                if observed.ordinal() < required.ordinal() {
                    ErrorClass::NotReady
                } else {
                    ErrorClass::NotAccepted
                }
            }
            Self::AlreadySubmitted(_) | Self::NotEligible(_) | Self::NotAPlayer(_) => {
                ErrorClass::NotAccepted
            }
            Self::NotFound(_) => ErrorClass::FixInput,
            Self::Snapshot(_) | Self::Gateway(_) => ErrorClass::TryAgain,
        }
    }

    /// Best human-readable reason, digging through nested gateway
    /// payloads where present.
    pub fn reason(&self) -> String {
        match self {
            Self::Gateway(err) => err.reason().to_owned(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classifies_as_fix_input() {
        assert_eq!(
            ClientError::Validation("fee must be positive".into()).class(),
            ErrorClass::FixInput
        );
        assert_eq!(ClientError::NotAuthenticated.class(), ErrorClass::FixInput);
    }

    #[test]
    fn test_precondition_before_required_stage_is_not_ready() {
        // Submitting while the room is still Filling: wait.
        let err = ClientError::Precondition {
            room: RoomId(1),
            required: RoomStatus::Active,
            observed: RoomStatus::Filling,
        };
        assert_eq!(err.class(), ErrorClass::NotReady);
    }

    #[test]
    fn test_precondition_past_required_stage_is_not_accepted() {
        // Canceling a room that already went Active: too late.
        let err = ClientError::Precondition {
            room: RoomId(1),
            required: RoomStatus::Filling,
            observed: RoomStatus::Active,
        };
        assert_eq!(err.class(), ErrorClass::NotAccepted);
    }

    #[test]
    fn test_gateway_and_snapshot_classify_as_try_again() {
        let err: ClientError = GatewayError::Network("timeout".into()).into();
        assert_eq!(err.class(), ErrorClass::TryAgain);

        let err: ClientError = SnapshotError::UnknownStatus {
            room: RoomId(1),
            code: 9,
        }
        .into();
        assert_eq!(err.class(), ErrorClass::TryAgain);
    }

    #[test]
    fn test_reason_surfaces_nested_revert_string() {
        let err: ClientError = GatewayError::reverted("room is full").into();
        assert_eq!(err.reason(), "room is full");
    }

    #[test]
    fn test_precondition_message_names_both_stages() {
        let err = ClientError::Precondition {
            room: RoomId(3),
            required: RoomStatus::Active,
            observed: RoomStatus::Filling,
        };
        let msg = err.to_string();
        assert!(msg.contains("Filling"));
        assert!(msg.contains("Active"));
    }
}

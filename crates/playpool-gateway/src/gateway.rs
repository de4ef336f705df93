//! The `LedgerGateway` trait, the seam between the client and the chain.

use playpool_protocol::{CreateRoomRequest, PlayerAddr, RawPlayer, RawRoom, RoomId};

use crate::GatewayError;

/// The remote authoritative store for rooms and player records.
///
/// Implementations wrap whatever actually talks to the chain (an RPC
/// client in production, [`InMemoryLedger`](crate::InMemoryLedger) in
/// tests and demos). Two families of operations:
///
/// - **Write intents** (`create_room`, `join_room`, `submit_score`,
///   `claim_prize`, `cancel_room`): cost a transaction, may fail, and
///   are serialized against *all* players' writes by the ledger itself.
/// - **Reads** (`get_room`, `get_players`, `get_player_rooms`): return
///   a snapshot that may lag true state. A read immediately after a
///   successful write can still show the pre-write state; that is
///   normal, not an error.
///
/// Every method is a suspension point. `caller` on write intents is the
/// signing identity; there is no ambient "current wallet" below this
/// trait.
pub trait LedgerGateway: Send + Sync {
    /// Creates a room. The returned id comes from the creation
    /// confirmation, never guessed client-side. The creator is counted
    /// as the room's first player.
    async fn create_room(
        &self,
        caller: &PlayerAddr,
        req: &CreateRoomRequest,
    ) -> Result<RoomId, GatewayError>;

    /// Joins a room, paying the entry fee. Fails if the room is full,
    /// not accepting players, or the invite code is wrong.
    async fn join_room(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
        invite_code: Option<&str>,
    ) -> Result<(), GatewayError>;

    /// Submits the caller's final score. Fails unless the room is
    /// Active, the caller is a player, and they have not yet submitted.
    async fn submit_score(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
        score: u64,
    ) -> Result<(), GatewayError>;

    /// Claims the prize pool. Fails unless the room is Completed, the
    /// caller is the winner, and the prize is unclaimed.
    async fn claim_prize(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
    ) -> Result<(), GatewayError>;

    /// Cancels a room. Fails unless the caller created it and it is
    /// still Filling.
    async fn cancel_room(
        &self,
        caller: &PlayerAddr,
        room: RoomId,
    ) -> Result<(), GatewayError>;

    /// Reads one room. `Ok(None)` means the id is unassigned; an error
    /// only when the caller explicitly targeted that id.
    async fn get_room(&self, room: RoomId) -> Result<Option<RawRoom>, GatewayError>;

    /// Reads the player records of one room, in join order.
    async fn get_players(&self, room: RoomId) -> Result<Vec<RawPlayer>, GatewayError>;

    /// Lists the ids of rooms the player has ever joined.
    async fn get_player_rooms(
        &self,
        player: &PlayerAddr,
    ) -> Result<Vec<RoomId>, GatewayError>;
}

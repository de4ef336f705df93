//! Integration tests for the discovery scan against the in-memory ledger.

use playpool_discovery::{discover, DiscoveryConfig};
use playpool_gateway::{InMemoryLedger, LedgerGateway, ReadScript};
use playpool_protocol::{
    CreateRoomRequest, GameKind, PlayerAddr, RawRoom, RoomId, RoomKind, RoomSummary,
};

fn addr(s: &str) -> PlayerAddr {
    PlayerAddr::new(s)
}

fn public_room(fee: u64, max: u32) -> CreateRoomRequest {
    CreateRoomRequest::public(fee, max, GameKind::FlappyBird)
}

fn config(max_id: u64, batch_size: usize) -> DiscoveryConfig {
    DiscoveryConfig { max_id, batch_size }
}

#[tokio::test]
async fn test_discover_keeps_only_joinable_public_rooms() {
    let ledger = InMemoryLedger::new();
    let creator = addr("0xAlice");

    let open = ledger.create_room(&creator, &public_room(50, 3)).await.unwrap();

    // Full → Active: not joinable.
    let full = ledger.create_room(&creator, &public_room(10, 2)).await.unwrap();
    ledger.join_room(&addr("0xBob"), full, None).await.unwrap();

    // Private: not listed.
    let private = CreateRoomRequest {
        kind: RoomKind::Private,
        invite_code: Some("code".into()),
        ..public_room(10, 2)
    };
    ledger.create_room(&creator, &private).await.unwrap();

    // Canceled: terminal.
    let dead = ledger.create_room(&creator, &public_room(10, 2)).await.unwrap();
    ledger.cancel_room(&creator, dead).await.unwrap();

    // Past expiry: dead even if the status field lags.
    let stale = ledger.create_room(&creator, &public_room(10, 2)).await.unwrap();
    ledger.force_expire(stale).await;

    let rooms: Vec<RoomSummary> = discover(&ledger, &config(20, 4)).await.collect();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, open);
    assert_eq!(rooms[0].seats_left(), 2);
}

#[tokio::test]
async fn test_discover_orders_newest_first() {
    let ledger = InMemoryLedger::new();
    let mut created = Vec::new();
    for i in 0..5 {
        let room = ledger
            .create_room(&addr(&format!("0xUser{i}")), &public_room(10, 4))
            .await
            .unwrap();
        created.push(room);
    }

    let ids: Vec<RoomId> = discover(&ledger, &config(10, 3)).await.map(|r| r.id).collect();
    created.reverse();
    assert_eq!(ids, created);
}

#[tokio::test]
async fn test_discover_survives_individual_read_failures() {
    let ledger = InMemoryLedger::new();
    let a = ledger.create_room(&addr("0xA"), &public_room(10, 2)).await.unwrap();
    let b = ledger.create_room(&addr("0xB"), &public_room(10, 2)).await.unwrap();

    // One id in the range fails to read; the rest still list.
    ledger
        .script_read(a, ReadScript::NetworkError("flaky node".into()))
        .await;
    // First scan: room `a` errors out but `b` is found.
    let rooms: Vec<RoomSummary> = discover(&ledger, &config(5, 2)).await.collect();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, b);

    // Scripts consumed; the next scan sees both.
    let rooms: Vec<RoomSummary> = discover(&ledger, &config(5, 2)).await.collect();
    assert_eq!(rooms.len(), 2);
}

#[tokio::test]
async fn test_discover_skips_corrupt_rooms() {
    let ledger = InMemoryLedger::new();
    let a = ledger.create_room(&addr("0xA"), &public_room(10, 2)).await.unwrap();
    let b = ledger.create_room(&addr("0xB"), &public_room(10, 2)).await.unwrap();

    let mut corrupt = ledger.get_room(a).await.unwrap().unwrap();
    corrupt.status = 77;
    ledger.script_read(a, ReadScript::Room(corrupt)).await;

    let rooms: Vec<RoomSummary> = discover(&ledger, &config(5, 2)).await.collect();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, b);
}

#[tokio::test]
async fn test_discover_dedupes_by_reported_room_id() {
    let ledger = InMemoryLedger::new();
    let room = ledger.create_room(&addr("0xA"), &public_room(10, 3)).await.unwrap();

    // A stale read at a neighboring id reports the same room with an
    // out-of-date player count (overlapping-batch artifact).
    let live = ledger.get_room(room).await.unwrap().unwrap();
    let stale = RawRoom {
        current_players: 0,
        ..live.clone()
    };
    ledger.script_read(RoomId(2), ReadScript::Room(stale)).await;

    let rooms: Vec<RoomSummary> = discover(&ledger, &config(5, 5)).await.collect();
    assert_eq!(rooms.len(), 1, "duplicate ids must collapse to one row");
    assert_eq!(rooms[0].id, room);
    // Last write wins: the fresher count survives.
    assert_eq!(rooms[0].current_players, live.current_players);
}

#[tokio::test]
async fn test_discover_is_a_fresh_query_each_time() {
    let ledger = InMemoryLedger::new();
    let first = discover(&ledger, &config(5, 2)).await;
    assert!(first.is_empty());

    ledger.create_room(&addr("0xA"), &public_room(10, 2)).await.unwrap();
    let second: Vec<RoomSummary> = discover(&ledger, &config(5, 2)).await.collect();
    assert_eq!(second.len(), 1);
}

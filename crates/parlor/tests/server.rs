//! End-to-end tests over real WebSocket connections.
//!
//! Each test starts a server on an ephemeral port, speaks the JSON
//! wire protocol with plain tungstenite clients, and waits for the
//! events it cares about (skipping unrelated broadcasts, since rooms
//! chatter — listings, member updates — interleave freely).

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parlor::ParlorServer;
use parlor_store::MessageStore;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start() -> String {
    let dir = tempfile::tempdir().unwrap();
    let store = MessageStore::load(dir.path().join("history.json"), None).await;
    // Keep the temp dir alive for the whole process.
    std::mem::forget(dir);

    let server = ParlorServer::bind("127.0.0.1:0", store).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    ws
}

async fn send(ws: &mut Ws, event: Value) {
    ws.send(Message::text(event.to_string())).await.unwrap();
}

/// Receives frames until one with the given `type` tag arrives.
async fn recv_event(ws: &mut Ws, event_type: &str) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {event_type}"))
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            let value: Value = serde_json::from_str(text.as_str()).unwrap();
            if value["type"] == event_type {
                return value;
            }
        }
    }
}

/// Creates a room as `username` and joins it. Returns the room id.
async fn create_and_join(ws: &mut Ws, username: &str) -> String {
    send(ws, json!({"type": "create-room", "name": "lobby", "isPrivate": false})).await;
    let created = recv_event(ws, "room-created").await;
    let room_id = created["roomId"].as_str().unwrap().to_string();
    send(
        ws,
        json!({"type": "join-room", "roomId": room_id, "username": username}),
    )
    .await;
    recv_event(ws, "room-joined").await;
    room_id
}

#[tokio::test]
async fn test_create_join_and_chat() {
    let addr = start().await;
    let mut p1 = connect(&addr).await;
    let room_id = create_and_join(&mut p1, "ada").await;

    let mut p2 = connect(&addr).await;
    send(
        &mut p2,
        json!({"type": "join-room", "roomId": room_id, "username": "bo"}),
    )
    .await;
    let joined = recv_event(&mut p2, "room-joined").await;
    assert_eq!(joined["name"], "lobby");
    assert_eq!(joined["users"], json!(["ada", "bo"]));

    // The existing member hears about the arrival.
    let arrival = recv_event(&mut p1, "user-joined").await;
    assert_eq!(arrival["username"], "bo");

    // Chat reaches both, sender included.
    send(
        &mut p1,
        json!({"type": "send-message", "roomId": room_id, "message": "evening"}),
    )
    .await;
    let m1 = recv_event(&mut p1, "new-message").await;
    let m2 = recv_event(&mut p2, "new-message").await;
    assert_eq!(m1["message"]["message"], "evening");
    assert_eq!(m2["message"]["username"], "ada");
}

#[tokio::test]
async fn test_private_room_password_enforced() {
    let addr = start().await;
    let mut p1 = connect(&addr).await;
    send(
        &mut p1,
        json!({"type": "create-room", "name": "den", "isPrivate": true, "password": "sesame"}),
    )
    .await;
    let created = recv_event(&mut p1, "room-created").await;
    let room_id = created["roomId"].as_str().unwrap();

    let mut p2 = connect(&addr).await;
    send(
        &mut p2,
        json!({"type": "join-room", "roomId": room_id, "password": "guess", "username": "bo"}),
    )
    .await;
    let error = recv_event(&mut p2, "join-error").await;
    assert_eq!(error["reason"], "Incorrect password");

    send(
        &mut p2,
        json!({"type": "join-room", "roomId": room_id, "password": "sesame", "username": "bo"}),
    )
    .await;
    recv_event(&mut p2, "room-joined").await;
}

#[tokio::test]
async fn test_blocked_message_bounces_back_to_sender() {
    let addr = start().await;
    let mut p1 = connect(&addr).await;
    let room_id = create_and_join(&mut p1, "ada").await;

    send(
        &mut p1,
        json!({"type": "send-message", "roomId": room_id, "message": "oh sh1t"}),
    )
    .await;
    let rejected = recv_event(&mut p1, "message-rejected").await;
    assert!(rejected["reason"].as_str().unwrap().contains("rejected"));
}

#[tokio::test]
async fn test_rps_end_to_end() {
    let addr = start().await;
    let mut p1 = connect(&addr).await;
    let room_id = create_and_join(&mut p1, "ada").await;

    let mut p2 = connect(&addr).await;
    send(
        &mut p2,
        json!({"type": "join-room", "roomId": room_id, "username": "bo"}),
    )
    .await;
    recv_event(&mut p2, "room-joined").await;

    send(&mut p1, json!({"type": "rps-challenge", "roomId": room_id})).await;
    let invite = recv_event(&mut p2, "game-invite-new").await;
    assert_eq!(invite["invite"]["kind"], "rps");
    let challenge_id = invite["invite"]["gameId"].as_u64().unwrap();

    send(&mut p2, json!({"type": "rps-accept", "challengeId": challenge_id})).await;
    let matched = recv_event(&mut p1, "rps-matched").await;
    assert_eq!(matched["opponent"], "bo");
    recv_event(&mut p2, "rps-matched").await;

    send(
        &mut p1,
        json!({"type": "rps-choice", "challengeId": challenge_id, "choice": "rock"}),
    )
    .await;
    send(
        &mut p2,
        json!({"type": "rps-choice", "challengeId": challenge_id, "choice": "scissors"}),
    )
    .await;

    let result = recv_event(&mut p1, "rps-result").await;
    assert_eq!(result["winner"], "ada");
    assert_eq!(result["challengerMove"], "rock");
    assert_eq!(result["acceptorMove"], "scissors");
}

#[tokio::test]
async fn test_snake_invite_join_and_state() {
    let addr = start().await;
    let mut p1 = connect(&addr).await;
    let room_id = create_and_join(&mut p1, "ada").await;

    let mut p2 = connect(&addr).await;
    send(
        &mut p2,
        json!({"type": "join-room", "roomId": room_id, "username": "bo"}),
    )
    .await;
    recv_event(&mut p2, "room-joined").await;

    send(&mut p1, json!({"type": "snake-create", "roomId": room_id})).await;
    let created = recv_event(&mut p1, "snake-created").await;
    let game_id = created["gameId"].as_u64().unwrap();
    assert_eq!(created["gridWidth"], 20);

    let invite = recv_event(&mut p2, "game-invite-new").await;
    assert_eq!(invite["invite"]["kind"], "snake");

    send(&mut p2, json!({"type": "snake-join", "gameId": game_id})).await;
    recv_event(&mut p2, "game-invite-removed").await;

    // Ticks for the forming one-snake game may interleave; the join
    // broadcast is the first state frame carrying both snakes.
    for _ in 0..20 {
        let state = recv_event(&mut p2, "snake-state").await;
        if state["snakes"].as_array().unwrap().len() == 2 {
            return;
        }
    }
    panic!("never saw a two-snake state after joining");
}

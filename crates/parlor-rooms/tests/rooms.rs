//! Integration tests for the room registry: the full join/chat/leave
//! lifecycle against the public API.

use parlor_moderation::Blocklist;
use parlor_protocol::ParticipantId;
use parlor_rooms::{RoomError, RoomRegistry};

fn pid(id: u64) -> ParticipantId {
    ParticipantId(id)
}

// =========================================================================
// create / list
// =========================================================================

#[test]
fn test_create_room_appears_in_summaries() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("lobby".into(), false, None);

    let summaries = registry.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, room_id);
    assert_eq!(summaries[0].name, "lobby");
    assert!(!summaries[0].is_private);
    assert_eq!(summaries[0].participant_count, 0);
}

#[test]
fn test_room_ids_are_fresh_per_creation() {
    let mut registry = RoomRegistry::new();
    let a = registry.create_room("a".into(), false, None);
    let b = registry.create_room("a".into(), false, None);
    assert_ne!(a, b);
}

// =========================================================================
// join
// =========================================================================

#[test]
fn test_join_unknown_room_is_not_found() {
    let mut registry = RoomRegistry::new();
    let result = registry.join(
        &parlor_protocol::RoomId("room-nope".into()),
        None,
        pid(1),
        "ada".into(),
    );
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[test]
fn test_join_private_room_with_wrong_password_fails() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("den".into(), true, Some("sesame".into()));

    let result = registry.join(&room_id, Some("guess"), pid(1), "ada".into());
    assert!(matches!(result, Err(RoomError::IncorrectPassword(_))));

    let result = registry.join(&room_id, None, pid(1), "ada".into());
    assert!(matches!(result, Err(RoomError::IncorrectPassword(_))));
}

#[test]
fn test_join_private_room_with_correct_password_succeeds() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("den".into(), true, Some("sesame".into()));

    let snapshot = registry
        .join(&room_id, Some("sesame"), pid(1), "ada".into())
        .expect("correct password should open the room");
    assert_eq!(snapshot.name, "den");
    assert_eq!(snapshot.users, vec!["ada".to_string()]);
    assert!(snapshot.messages.is_empty());
}

#[test]
fn test_join_returns_existing_history_and_users() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("lobby".into(), false, None);
    registry.join(&room_id, None, pid(1), "ada".into()).unwrap();
    registry.post_message(&room_id, pid(1), "hello").unwrap();

    let snapshot = registry.join(&room_id, None, pid(2), "bo".into()).unwrap();
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].message, "hello");
    assert_eq!(snapshot.users, vec!["ada".to_string(), "bo".to_string()]);
}

#[test]
fn test_one_room_per_participant() {
    let mut registry = RoomRegistry::new();
    let a = registry.create_room("a".into(), false, None);
    let b = registry.create_room("b".into(), false, None);
    registry.join(&a, None, pid(1), "ada".into()).unwrap();

    let result = registry.join(&b, None, pid(1), "ada".into());
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(_, _))));
    assert_eq!(registry.room_of(pid(1)), Some(a));
}

// =========================================================================
// post_message
// =========================================================================

#[test]
fn test_post_from_non_member_fails() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("lobby".into(), false, None);

    let result = registry.post_message(&room_id, pid(9), "hi");
    assert!(matches!(result, Err(RoomError::NotAMember(_, _))));
}

#[test]
fn test_blocked_message_is_rejected_and_not_buffered() {
    let mut registry =
        RoomRegistry::new().with_blocklist(Blocklist::new(["crumpet"]));
    let room_id = registry.create_room("lobby".into(), false, None);
    registry.join(&room_id, None, pid(1), "ada".into()).unwrap();

    let result = registry.post_message(&room_id, pid(1), "pass the cr.umpet");
    assert!(matches!(result, Err(RoomError::MessageRejected)));

    // Nothing stored: a second joiner sees empty history.
    let snapshot = registry.join(&room_id, None, pid(2), "bo".into()).unwrap();
    assert!(snapshot.messages.is_empty());
}

#[test]
fn test_posted_message_carries_username_and_text() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("lobby".into(), false, None);
    registry.join(&room_id, None, pid(1), "ada".into()).unwrap();

    let message = registry.post_message(&room_id, pid(1), "hello there").unwrap();
    assert_eq!(message.username, "ada");
    assert_eq!(message.message, "hello there");
    assert!(message.id > 0);
}

// =========================================================================
// leave
// =========================================================================

#[test]
fn test_leave_reports_remaining_users() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("lobby".into(), false, None);
    registry.join(&room_id, None, pid(1), "ada".into()).unwrap();
    registry.join(&room_id, None, pid(2), "bo".into()).unwrap();

    let outcome = registry.leave(pid(1)).expect("was a member");
    assert_eq!(outcome.username, "ada");
    assert_eq!(outcome.remaining, vec!["bo".to_string()]);
    assert!(!outcome.room_deleted);
    assert_eq!(registry.room_count(), 1);
}

#[test]
fn test_last_leave_deletes_the_room() {
    let mut registry = RoomRegistry::new();
    let room_id = registry.create_room("lobby".into(), false, None);
    registry.join(&room_id, None, pid(1), "ada".into()).unwrap();

    let outcome = registry.leave(pid(1)).unwrap();
    assert!(outcome.room_deleted);
    assert!(outcome.remaining.is_empty());
    assert_eq!(registry.room_count(), 0);
    assert!(registry.summaries().is_empty());
}

#[test]
fn test_leave_when_not_in_a_room_is_none() {
    let mut registry = RoomRegistry::new();
    assert!(registry.leave(pid(42)).is_none());
}

#[test]
fn test_rejoin_after_leave_gets_fresh_membership() {
    let mut registry = RoomRegistry::new();
    let a = registry.create_room("a".into(), false, None);
    let b = registry.create_room("b".into(), false, None);

    registry.join(&a, None, pid(1), "ada".into()).unwrap();
    registry.leave(pid(1)).unwrap();
    registry.join(&b, None, pid(1), "ada".into()).unwrap();

    assert_eq!(registry.room_of(pid(1)), Some(b.clone()));
    assert!(registry.is_member(pid(1), &b));
    assert!(!registry.is_member(pid(1), &a));
}

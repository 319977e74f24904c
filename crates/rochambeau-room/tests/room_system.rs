//! Integration tests for the room system, driven through the registry the
//! way the session coordinator drives it.

use rochambeau_protocol::{Move, ParticipantId, Recipient, RoomId, ServerMessage};
use rochambeau_room::{
    LeaveReason, MatchConfig, Outbound, RematchState, RoomError, RoomRegistry,
    RoomState,
};

// =========================================================================
// Helpers
// =========================================================================

const ALICE: ParticipantId = ParticipantId(1);
const BOB: ParticipantId = ParticipantId(2);
const CAROL: ParticipantId = ParticipantId(3);

fn r1() -> RoomId {
    RoomId::parse("R1").unwrap()
}

/// A registry with Alice and Bob seated in R1.
fn seated(config: MatchConfig) -> RoomRegistry {
    let mut registry = RoomRegistry::new(config);
    let room = registry.get_or_create(&r1());
    room.join(ALICE, "Alice").unwrap();
    room.join(BOB, "Bob").unwrap();
    registry
}

fn throw(registry: &mut RoomRegistry, who: ParticipantId, thrown: Move) -> Outbound {
    registry
        .get_mut(&r1())
        .expect("room should exist")
        .submit_move(who, thrown)
        .unwrap()
}

fn kinds(out: &Outbound) -> Vec<&'static str> {
    out.iter().map(|(_, msg)| msg.kind()).collect()
}

fn score_values(registry: &RoomRegistry) -> Vec<u32> {
    registry
        .get(&r1())
        .expect("room should exist")
        .scores()
        .iter()
        .map(|s| s.score)
        .collect()
}

// =========================================================================
// End-to-end scenarios
// =========================================================================

#[test]
fn test_win_then_match_end_then_rematch() {
    let mut registry = RoomRegistry::new(MatchConfig::first_to(1));
    let room = registry.get_or_create(&r1());
    room.join(ALICE, "Alice").unwrap();
    let joined = room.join(BOB, "Bob").unwrap();
    match &joined[1].1 {
        ServerMessage::BothJoined { scores, .. } => {
            assert_eq!(scores.iter().map(|s| s.score).collect::<Vec<_>>(), vec![0, 0]);
        }
        other => panic!("expected both-joined, got {other:?}"),
    }

    assert!(throw(&mut registry, ALICE, Move::Rock).is_empty());
    let out = throw(&mut registry, BOB, Move::Scissors);

    assert_eq!(kinds(&out), vec!["round-result", "match-end"]);
    match (&out[0].1, &out[1].1) {
        (
            ServerMessage::RoundResult { winner_id, scores, .. },
            ServerMessage::MatchEnd { winner_id: champion, .. },
        ) => {
            assert_eq!(*winner_id, Some(ALICE));
            assert_eq!(scores[0].score, 1);
            assert_eq!(scores[1].score, 0);
            assert_eq!(*champion, ALICE);
        }
        other => panic!("unexpected messages: {other:?}"),
    }
    assert_eq!(score_values(&registry), vec![0, 0]);

    let room = registry.get_mut(&r1()).unwrap();
    let first = room.request_rematch(ALICE).unwrap();
    assert_eq!(kinds(&first), vec!["rematch-requested"]);
    let second = room.request_rematch(BOB).unwrap();
    assert_eq!(kinds(&second), vec!["rematch-requested", "rematch-start"]);
    assert_eq!(room.rematch_state(), RematchState::Idle);
}

#[test]
fn test_tie_awards_no_points() {
    let mut registry = seated(MatchConfig::default());

    throw(&mut registry, ALICE, Move::Rock);
    let out = throw(&mut registry, BOB, Move::Rock);

    match &out[..] {
        [(Recipient::All, ServerMessage::RoundResult { winner_id: None, .. })] => {}
        other => panic!("expected a tie, got {other:?}"),
    }
    assert_eq!(score_values(&registry), vec![0, 0]);
}

#[test]
fn test_disconnect_then_third_participant_joins() {
    let mut registry = seated(MatchConfig::default());

    let out = registry
        .get_mut(&r1())
        .unwrap()
        .leave(BOB, LeaveReason::Disconnected)
        .unwrap();
    assert_eq!(kinds(&out), vec!["opponent-left", "chat"]);
    assert!(!registry.remove_if_empty(&r1()));

    let room = registry.get_mut(&r1()).unwrap();
    assert_eq!(room.len(), 1);
    assert_eq!(room.state(), RoomState::WaitingForOpponent);

    let joined = room.join(CAROL, "Carol").unwrap();
    assert_eq!(kinds(&joined), vec!["room-joined", "both-joined"]);
    assert_eq!(room.roster(), vec![ALICE, CAROL]);
}

// =========================================================================
// Invariants
// =========================================================================

#[test]
fn test_leave_mid_round_voids_stale_move() {
    let mut registry = seated(MatchConfig::default());
    throw(&mut registry, ALICE, Move::Rock);

    let room = registry.get_mut(&r1()).unwrap();
    room.leave(ALICE, LeaveReason::Left).unwrap();
    room.join(ALICE, "Alice").unwrap();

    // Bob's throw must wait for a fresh move from Alice.
    assert!(throw(&mut registry, BOB, Move::Paper).is_empty());
    let out = throw(&mut registry, ALICE, Move::Scissors);
    match &out[0].1 {
        ServerMessage::RoundResult { winner_id, .. } => assert_eq!(*winner_id, Some(ALICE)),
        other => panic!("expected round-result, got {other:?}"),
    }
}

#[test]
fn test_resubmission_after_resolution_starts_new_round() {
    let mut registry = seated(MatchConfig::default());
    throw(&mut registry, ALICE, Move::Paper);
    throw(&mut registry, BOB, Move::Rock);

    let out = throw(&mut registry, ALICE, Move::Paper);

    assert!(out.is_empty(), "a lone move must not re-trigger resolution");
    assert_eq!(score_values(&registry), vec![1, 0]);
}

#[test]
fn test_scores_only_grow_until_match_end() {
    let mut registry = seated(MatchConfig::first_to(3));
    let mut previous = vec![0, 0];

    for (a, b) in [
        (Move::Rock, Move::Scissors),
        (Move::Rock, Move::Rock),
        (Move::Rock, Move::Paper),
        (Move::Paper, Move::Rock),
    ] {
        throw(&mut registry, ALICE, a);
        throw(&mut registry, BOB, b);
        let now = score_values(&registry);
        assert!(now[0] >= previous[0] && now[1] >= previous[1]);
        previous = now;
    }
    assert_eq!(previous, vec![2, 1]);

    throw(&mut registry, ALICE, Move::Scissors);
    let out = throw(&mut registry, BOB, Move::Paper);
    assert_eq!(kinds(&out), vec!["round-result", "match-end"]);
    assert_eq!(score_values(&registry), vec![0, 0]);
}

#[test]
fn test_scores_persist_across_rematch() {
    let mut registry = seated(MatchConfig::default());
    throw(&mut registry, ALICE, Move::Rock);
    throw(&mut registry, BOB, Move::Scissors);

    let room = registry.get_mut(&r1()).unwrap();
    room.request_rematch(ALICE).unwrap();
    room.request_rematch(BOB).unwrap();

    assert_eq!(score_values(&registry), vec![1, 0]);
}

#[test]
fn test_leave_withdraws_rematch_votes() {
    let mut registry = seated(MatchConfig::default());
    let room = registry.get_mut(&r1()).unwrap();
    room.request_rematch(ALICE).unwrap();

    room.leave(BOB, LeaveReason::Left).unwrap();

    assert!(room.rematch_votes().is_empty());
    room.join(CAROL, "Carol").unwrap();
    let out = room.request_rematch(CAROL).unwrap();
    assert_eq!(kinds(&out), vec!["rematch-requested"], "Alice's old vote is gone");
}

#[test]
fn test_full_room_rejects_third_participant() {
    let mut registry = seated(MatchConfig::default());
    let room = registry.get_mut(&r1()).unwrap();

    assert_eq!(room.join(CAROL, "Carol"), Err(RoomError::RoomFull(r1())));
    assert_eq!(room.len(), 2);
}

#[test]
fn test_last_leave_empties_registry() {
    let mut registry = seated(MatchConfig::default());
    let room = registry.get_mut(&r1()).unwrap();
    room.leave(ALICE, LeaveReason::Left).unwrap();
    room.leave(BOB, LeaveReason::Left).unwrap();

    assert!(registry.remove_if_empty(&r1()));
    assert!(registry.get(&r1()).is_none());
    assert_eq!(registry.len(), 0);
}

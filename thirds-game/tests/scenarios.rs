mod common;

use common::*;
use std::collections::HashSet;
use thirds_core::Amount;
use thirds_game::{commit, GameError, Phase};

#[test]
fn three_players_distinct_guesses() {
    let t = table(small_config());
    t.play(&[("alice", 300), ("bob", 600), ("carol", 900)]);

    let outcome = t.game.finalize().unwrap();
    assert_eq!(t.game.phase(), Phase::Ended);
    assert_eq!(outcome.average, 600);
    assert_eq!(outcome.target, 400);
    assert_eq!(outcome.winner, id("alice"));
    assert_eq!(t.game.prize_pool(), units(3));
    assert_eq!(outcome.service_fee, Amount::ZERO);
    assert_eq!(outcome.winner_prize, units(3));

    assert_eq!(t.game.pending_withdrawal(&id("alice")), units(3));
    assert_eq!(t.game.pending_withdrawal(&id(ADMIN)), Amount::ZERO);
    assert_eq!(t.game.results().unwrap(), outcome);

    assert_eq!(t.game.withdraw(&id("alice")).unwrap(), units(3));
    assert_eq!(t.ledger.balance(&id("alice")).available, units(3));
    assert_eq!(t.ledger.escrow(), Amount::ZERO);
}

#[test]
fn zero_reveals_forfeit_pool_to_admin() {
    let t = table(small_config());
    t.join_all(&["alice", "bob", "carol"]);
    t.advance_to(Phase::Commit);
    for (name, guess) in [("alice", 1), ("bob", 2), ("carol", 3)] {
        t.commit_guess(name, guess);
    }
    t.advance_to(Phase::Evaluating);

    let outcome = t.game.finalize().unwrap();
    assert_eq!(outcome.winner, id(ADMIN));
    assert_eq!(outcome.average, 0);
    assert_eq!(outcome.target, 0);
    assert_eq!(t.game.pending_withdrawal(&id(ADMIN)), units(3));

    assert_eq!(t.game.withdraw(&id(ADMIN)).unwrap(), units(3));
    assert!(matches!(
        t.game.withdraw(&id(ADMIN)),
        Err(GameError::NoFunds)
    ));
}

#[test]
fn late_join_rejected_once_commit_window_opens() {
    let t = table(small_config());
    t.join_all(&["alice", "bob", "carol"]);
    let schedule = t.game.schedule().unwrap();

    t.clock.set(schedule.commit_start - 1);
    assert_eq!(t.game.phase(), Phase::GameStarting);
    t.join("dave");
    assert_eq!(t.game.player_count(), 4);

    t.clock.set(schedule.commit_start);
    let late = id("erin");
    t.ledger.fund(&late, units(1)).unwrap();
    assert!(matches!(
        t.game.join(&late, units(1)),
        Err(GameError::WrongPhase {
            phase: Phase::Commit,
            ..
        })
    ));
    assert_eq!(t.game.player_count(), 4);
    assert_eq!(t.ledger.balance(&late).available, units(1));
}

#[test]
fn duplicate_commit_keeps_first_hash() {
    let t = table(small_config());
    t.join_all(&["alice", "bob", "carol"]);
    t.advance_to(Phase::Commit);

    let hash_a = commit(100, &salt_for("alice"));
    let hash_b = commit(200, &salt_for("alice"));
    t.game.commit(&id("alice"), hash_a).unwrap();

    assert!(matches!(
        t.game.commit(&id("alice"), hash_b),
        Err(GameError::AlreadyCommitted)
    ));
    let status = t.game.player_status(&id("alice")).unwrap();
    assert_eq!(status.commitment, Some(hash_a));
}

#[test]
fn finalize_twice_is_a_no_op() {
    let t = table(small_config().with_entry_fee(units(100)));
    t.play(&[("alice", 10), ("bob", 20), ("carol", 30)]);

    let first = t.game.finalize().unwrap();
    let pending_admin = t.game.pending_withdrawal(&id(ADMIN));
    let pending_winner = t.game.pending_withdrawal(&first.winner);

    t.clock.advance(3_600);
    let second = t.game.finalize().unwrap();

    assert_eq!(first, second);
    assert_eq!(t.game.pending_withdrawal(&id(ADMIN)), pending_admin);
    assert_eq!(t.game.pending_withdrawal(&first.winner), pending_winner);
    assert_eq!(pending_admin, units(15));
    assert_eq!(pending_winner, units(285));
}

#[test]
fn ended_game_rejects_every_mutation() {
    let t = table(small_config());
    t.play(&[("alice", 10), ("bob", 20), ("carol", 30)]);
    t.game.finalize().unwrap();

    let newcomer = id("late");
    t.ledger.fund(&newcomer, units(1)).unwrap();
    assert!(matches!(
        t.game.join(&newcomer, units(1)),
        Err(GameError::WrongPhase {
            phase: Phase::Ended,
            ..
        })
    ));
    assert!(matches!(
        t.game.leave(&id("alice")),
        Err(GameError::WrongPhase { .. })
    ));
    assert!(matches!(
        t.game.commit(&id("alice"), commit(1, &salt_for("alice"))),
        Err(GameError::WrongPhase { .. })
    ));
    assert!(matches!(
        t.game.reveal(&id("alice"), 10, &salt_for("alice")),
        Err(GameError::WrongPhase { .. })
    ));
}

#[test]
fn non_revealers_cannot_win() {
    let t = table(small_config());
    t.join_all(&["alice", "bob", "carol"]);
    t.advance_to(Phase::Commit);
    t.commit_guess("alice", 900);
    t.commit_guess("bob", 0);
    t.advance_to(Phase::Reveal);
    t.reveal_guess("alice", 900);
    t.advance_to(Phase::Evaluating);

    let outcome = t.game.finalize().unwrap();
    assert_eq!(outcome.reveal_count, 1);
    assert_eq!(outcome.average, 900);
    assert_eq!(outcome.target, 600);
    assert_eq!(outcome.winner, id("alice"));
}

#[test]
fn quorum_timestamp_survives_leaves_and_extra_joins() {
    let t = table(small_config());
    t.join_all(&["alice", "bob"]);
    t.game.leave(&id("alice")).unwrap();
    assert!(t.game.schedule().is_none());

    t.clock.advance(10);
    t.join_all(&["alice", "carol"]);
    let latched = t.game.schedule().unwrap().quorum_reached_at;
    assert_eq!(latched, START + 10);

    t.clock.advance(5);
    t.join("dave");
    assert_eq!(t.game.schedule().unwrap().quorum_reached_at, latched);
    assert!(matches!(
        t.game.leave(&id("dave")),
        Err(GameError::WrongPhase { .. })
    ));
}

#[test]
fn time_remaining_tracks_windows() {
    let t = table(small_config());
    assert_eq!(t.game.time_remaining(), None);

    t.join_all(&["alice", "bob", "carol"]);
    assert_eq!(t.game.time_remaining(), Some(60));

    t.clock.advance(70);
    assert_eq!(t.game.phase(), Phase::Commit);
    assert_eq!(t.game.time_remaining(), Some(290));

    t.advance_to(Phase::Evaluating);
    assert_eq!(t.game.time_remaining(), None);
    let info = t.game.info();
    assert_eq!(info.phase, Phase::Evaluating);
    assert_eq!(info.player_count, 3);
    assert!(info.winner.is_none());
}

#[test]
fn tied_players_each_win_sometimes() {
    let mut winners = HashSet::new();

    for trial in 0..200u64 {
        let t = table(small_config());
        // average 200, target 133; alice and bob both 33 away
        t.play(&[("alice", 100), ("bob", 166), ("carol", 334)]);
        t.clock.advance(trial);

        let outcome = t.game.finalize().unwrap();
        assert_eq!(outcome.tied, vec![id("alice"), id("bob")]);
        winners.insert(outcome.winner);
    }

    assert_eq!(winners.len(), 2);
    assert!(winners.contains(&id("alice")));
    assert!(winners.contains(&id("bob")));
}

#[test]
fn funds_are_conserved_through_the_round() {
    let t = table(small_config().with_entry_fee(units(50)).with_service_fee_percent(20));
    t.join_all(&["alice", "bob"]);
    t.game.leave(&id("bob")).unwrap();
    assert_eq!(t.game.prize_pool(), units(50));

    t.join_all(&["carol", "dave", "erin"]);
    assert_eq!(t.game.prize_pool(), units(50 * t.game.player_count() as u64));

    t.advance_to(Phase::Commit);
    for (name, guess) in [("alice", 10), ("carol", 500), ("dave", 700), ("erin", 1000)] {
        t.commit_guess(name, guess);
    }
    t.advance_to(Phase::Reveal);
    for (name, guess) in [("alice", 10), ("carol", 500), ("dave", 700), ("erin", 1000)] {
        t.reveal_guess(name, guess);
    }
    t.advance_to(Phase::Evaluating);

    let outcome = t.game.finalize().unwrap();
    // average 552, target 368
    assert_eq!(outcome.winner, id("carol"));
    assert_eq!(outcome.service_fee, units(40));
    assert_eq!(outcome.winner_prize, units(160));

    let credited: u64 = ["alice", "bob", "carol", "dave", "erin", ADMIN]
        .iter()
        .map(|n| t.game.pending_withdrawal(&id(n)).to_units())
        .sum();
    // bob's refund plus the distributed pool
    assert_eq!(credited, 50 + t.game.prize_pool().to_units());
    assert_eq!(t.ledger.escrow().to_units(), credited);
}

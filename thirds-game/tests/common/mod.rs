#![allow(dead_code)]

use std::sync::Arc;
use thirds_core::{Amount, ManualClock, MemoryLedger, PlayerId};
use thirds_game::{commit, Game, GameConfig, GameRegistry, Phase, Salt};

pub const START: u64 = 1_700_000_000;
pub const ADMIN: &str = "operator";

pub struct Table {
    pub clock: Arc<ManualClock>,
    pub ledger: Arc<MemoryLedger>,
    pub registry: GameRegistry,
    pub game: Arc<Game>,
}

pub fn id(name: &str) -> PlayerId {
    PlayerId::new(name)
}

pub fn units(n: u64) -> Amount {
    Amount::from_units(n)
}

pub fn salt_for(name: &str) -> Salt {
    let mut bytes = [0u8; 32];
    for (slot, b) in bytes.iter_mut().zip(name.bytes().cycle()) {
        *slot = b;
    }
    Salt::from_bytes(bytes)
}

/// 3..=5 players, 1 unit entry, 5% fee, 60s grace, 300s windows.
pub fn small_config() -> GameConfig {
    GameConfig::default()
        .with_players(3, 5)
        .with_durations(300, 300, 60)
        .with_entry_fee(units(1))
        .with_service_fee_percent(5)
}

pub fn table(config: GameConfig) -> Table {
    let clock = Arc::new(ManualClock::new(START));
    let ledger = Arc::new(MemoryLedger::new());
    let registry = GameRegistry::new(id(ADMIN), config, clock.clone(), ledger.clone()).unwrap();
    let game = registry.create_game(&id("anyone")).unwrap();

    Table {
        clock,
        ledger,
        registry,
        game,
    }
}

impl Table {
    pub fn join(&self, name: &str) {
        let player = id(name);
        let fee = self.game.config().entry_fee;
        self.ledger.fund(&player, fee).unwrap();
        self.game.join(&player, fee).unwrap();
    }

    pub fn join_all(&self, names: &[&str]) {
        for name in names {
            self.join(name);
        }
    }

    /// Move the clock to the first second of `phase`.
    pub fn advance_to(&self, phase: Phase) {
        let schedule = self.game.schedule().expect("quorum reached");
        let at = match phase {
            Phase::Commit => schedule.commit_start,
            Phase::Reveal => schedule.commit_end,
            Phase::Evaluating => schedule.reveal_end,
            other => panic!("cannot advance to {}", other),
        };
        self.clock.set(at);
        assert_eq!(self.game.phase(), phase);
    }

    pub fn commit_guess(&self, name: &str, guess: u32) {
        self.game
            .commit(&id(name), commit(guess, &salt_for(name)))
            .unwrap();
    }

    pub fn reveal_guess(&self, name: &str, guess: u32) {
        self.game.reveal(&id(name), guess, &salt_for(name)).unwrap();
    }

    /// Join, commit and reveal every `(name, guess)`, leaving the game EVALUATING.
    pub fn play(&self, guesses: &[(&str, u32)]) {
        for (name, _) in guesses {
            self.join(name);
        }
        self.advance_to(Phase::Commit);
        for (name, guess) in guesses {
            self.commit_guess(name, *guess);
        }
        self.advance_to(Phase::Reveal);
        for (name, guess) in guesses {
            self.reveal_guess(name, *guess);
        }
        self.advance_to(Phase::Evaluating);
    }
}

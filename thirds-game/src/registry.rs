use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::game::{Game, GameRecord};
use crate::GameId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thirds_core::{Clock, Ledger, PlayerId};

/// Persisted state of a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub admin: PlayerId,
    pub defaults: GameConfig,
    pub games: Vec<GameRecord>,
    pub current: Option<GameId>,
}

struct RegistryState {
    defaults: GameConfig,
    games: Vec<Arc<Game>>,
    current: Option<GameId>,
}

/// Creates and tracks games. The registry administrator administers every
/// game it creates and collects their service fees.
pub struct GameRegistry {
    admin: PlayerId,
    state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
    ledger: Arc<dyn Ledger>,
}

impl GameRegistry {
    pub fn new(
        admin: PlayerId,
        defaults: GameConfig,
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self> {
        defaults.validate()?;

        Ok(Self {
            admin,
            state: RwLock::new(RegistryState {
                defaults,
                games: Vec::new(),
                current: None,
            }),
            clock,
            ledger,
        })
    }

    pub fn from_snapshot(
        snapshot: RegistrySnapshot,
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self> {
        snapshot.defaults.validate()?;

        let games = snapshot
            .games
            .into_iter()
            .map(|record| Game::restore(record, clock.clone(), ledger.clone()).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        if let Some(current) = snapshot.current {
            if !games.iter().any(|g| g.id() == current) {
                return Err(GameError::NotFound(current));
            }
        }

        Ok(Self {
            admin: snapshot.admin,
            state: RwLock::new(RegistryState {
                defaults: snapshot.defaults,
                games,
                current: snapshot.current,
            }),
            clock,
            ledger,
        })
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            admin: self.admin.clone(),
            defaults: state.defaults.clone(),
            games: state.games.iter().map(|g| g.snapshot()).collect(),
            current: state.current,
        }
    }

    pub fn admin(&self) -> &PlayerId {
        &self.admin
    }

    pub fn defaults(&self) -> GameConfig {
        self.state.read().defaults.clone()
    }

    /// Create a game with the stored defaults. Open to anyone.
    pub fn create_game(&self, caller: &PlayerId) -> Result<Arc<Game>> {
        let defaults = self.defaults();
        tracing::debug!("{} requested a game with default parameters", caller);
        self.spawn(defaults)
    }

    /// Create a game with custom parameters. Administrator only.
    pub fn create_custom_game(&self, caller: &PlayerId, config: GameConfig) -> Result<Arc<Game>> {
        self.ensure_admin(caller)?;
        self.spawn(config)
    }

    pub fn set_defaults(&self, caller: &PlayerId, config: GameConfig) -> Result<()> {
        self.ensure_admin(caller)?;
        config.validate()?;

        self.state.write().defaults = config;
        tracing::info!("Registry defaults updated by {}", caller);
        Ok(())
    }

    pub fn set_current(&self, caller: &PlayerId, id: GameId) -> Result<()> {
        self.ensure_admin(caller)?;

        let mut state = self.state.write();
        if !state.games.iter().any(|g| g.id() == id) {
            return Err(GameError::NotFound(id));
        }
        state.current = Some(id);

        tracing::info!("Current game set to {}", id);
        Ok(())
    }

    pub fn current(&self) -> Option<Arc<Game>> {
        let state = self.state.read();
        let current = state.current?;
        state.games.iter().find(|g| g.id() == current).cloned()
    }

    pub fn get(&self, id: GameId) -> Result<Arc<Game>> {
        self.state
            .read()
            .games
            .iter()
            .find(|g| g.id() == id)
            .cloned()
            .ok_or(GameError::NotFound(id))
    }

    /// Every game in creation order.
    pub fn games(&self) -> Vec<Arc<Game>> {
        self.state.read().games.clone()
    }

    fn ensure_admin(&self, caller: &PlayerId) -> Result<()> {
        if *caller != self.admin {
            return Err(GameError::NotAuthorized);
        }
        Ok(())
    }

    fn spawn(&self, config: GameConfig) -> Result<Arc<Game>> {
        let game = Arc::new(Game::new(
            self.admin.clone(),
            config,
            self.clock.clone(),
            self.ledger.clone(),
        )?);

        let mut state = self.state.write();
        state.games.push(game.clone());
        if state.current.is_none() {
            state.current = Some(game.id());
        }

        tracing::info!("Created game {} ({} total)", game.id(), state.games.len());
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirds_core::{ManualClock, MemoryLedger};

    fn registry() -> GameRegistry {
        GameRegistry::new(
            PlayerId::new("admin"),
            GameConfig::default(),
            Arc::new(ManualClock::new(0)),
            Arc::new(MemoryLedger::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_first_game_becomes_current() {
        let registry = registry();
        assert!(registry.current().is_none());

        let first = registry.create_game(&PlayerId::new("anyone")).unwrap();
        let second = registry.create_game(&PlayerId::new("other")).unwrap();

        assert_eq!(registry.current().unwrap().id(), first.id());
        assert_eq!(registry.games().len(), 2);
        assert_eq!(second.admin(), PlayerId::new("admin"));
    }

    #[test]
    fn test_admin_only_operations() {
        let registry = registry();
        let mallory = PlayerId::new("mallory");
        let admin = PlayerId::new("admin");

        assert!(matches!(
            registry.create_custom_game(&mallory, GameConfig::default()),
            Err(GameError::NotAuthorized)
        ));
        assert!(matches!(
            registry.set_defaults(&mallory, GameConfig::default()),
            Err(GameError::NotAuthorized)
        ));

        let game = registry.create_game(&mallory).unwrap();
        assert!(matches!(
            registry.set_current(&mallory, game.id()),
            Err(GameError::NotAuthorized)
        ));

        let custom = registry
            .create_custom_game(&admin, GameConfig::default().with_players(4, 8))
            .unwrap();
        registry.set_current(&admin, custom.id()).unwrap();
        assert_eq!(registry.current().unwrap().id(), custom.id());
    }

    #[test]
    fn test_set_current_unknown_game() {
        let registry = registry();
        let unknown = uuid::Uuid::new_v4();
        assert!(matches!(
            registry.set_current(&PlayerId::new("admin"), unknown),
            Err(GameError::NotFound(id)) if id == unknown
        ));
        assert!(matches!(registry.get(unknown), Err(GameError::NotFound(_))));
    }

    #[test]
    fn test_defaults_validate_and_do_not_touch_existing_games() {
        let registry = registry();
        let admin = PlayerId::new("admin");
        let before = registry.create_game(&admin).unwrap();

        assert!(matches!(
            registry.set_defaults(&admin, GameConfig::default().with_service_fee_percent(50)),
            Err(GameError::ConfigInvalid(_))
        ));

        let updated = GameConfig::default().with_players(5, 6);
        registry.set_defaults(&admin, updated.clone()).unwrap();
        let after = registry.create_game(&admin).unwrap();

        assert_eq!(before.config(), GameConfig::default());
        assert_eq!(after.config(), updated);
    }

    #[test]
    fn test_invalid_custom_config_creates_nothing() {
        let registry = registry();
        let result = registry.create_custom_game(
            &PlayerId::new("admin"),
            GameConfig::default().with_players(3, 3),
        );
        assert!(matches!(result, Err(GameError::ConfigInvalid(_))));
        assert!(registry.games().is_empty());
        assert!(registry.current().is_none());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let registry = registry();
        let game = registry.create_game(&PlayerId::new("x")).unwrap();

        let json = serde_json::to_string(&registry.snapshot()).unwrap();
        let snapshot: RegistrySnapshot = serde_json::from_str(&json).unwrap();
        let restored = GameRegistry::from_snapshot(
            snapshot,
            Arc::new(ManualClock::new(0)),
            Arc::new(MemoryLedger::new()),
        )
        .unwrap();

        assert_eq!(restored.admin(), &PlayerId::new("admin"));
        assert_eq!(restored.current().unwrap().id(), game.id());
        assert!(restored.get(game.id()).is_ok());
    }
}

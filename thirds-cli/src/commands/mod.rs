pub mod admin;
pub mod round;
pub mod view;

pub use admin::{handle_admin_command, init_registry, AdminCommands, ConfigArgs};
pub use round::{handle_round_command, RoundCommands};
pub use view::{handle_view_command, ViewCommands};

use crate::store::Store;
use anyhow::{anyhow, bail, Result};
use std::sync::Arc;
use thirds_core::PlayerId;
use thirds_game::{Game, GameRegistry};

/// Per-invocation state shared by all commands.
pub struct CommandContext {
    pub store: Store,
    pub caller: Option<PlayerId>,
}

impl CommandContext {
    pub fn caller(&self) -> Result<&PlayerId> {
        self.caller
            .as_ref()
            .ok_or_else(|| anyhow!("This command needs a caller identity: pass --as <identity>"))
    }
}

/// Pick a game by full id, unique id prefix, or the registry's current game.
pub fn resolve_game(registry: &GameRegistry, selector: Option<&str>) -> Result<Arc<Game>> {
    let Some(selector) = selector else {
        return registry
            .current()
            .ok_or_else(|| anyhow!("No current game; create one with 'thirds create'"));
    };

    if let Ok(id) = uuid::Uuid::parse_str(selector) {
        return Ok(registry.get(id)?);
    }

    let matches: Vec<Arc<Game>> = registry
        .games()
        .into_iter()
        .filter(|g| g.id().to_string().starts_with(selector))
        .collect();

    match matches.len() {
        0 => bail!("Game not found: {}", selector),
        1 => Ok(matches[0].clone()),
        n => bail!("Game prefix '{}' is ambiguous ({} matches)", selector, n),
    }
}

pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirds_core::{ManualClock, MemoryLedger};
    use thirds_game::GameConfig;

    #[test]
    fn test_resolve_game_by_prefix_and_current() {
        let registry = GameRegistry::new(
            PlayerId::new("admin"),
            GameConfig::default(),
            Arc::new(ManualClock::new(0)),
            Arc::new(MemoryLedger::new()),
        )
        .unwrap();
        assert!(resolve_game(&registry, None).is_err());

        let game = registry.create_game(&PlayerId::new("a")).unwrap();
        let id = game.id().to_string();

        assert_eq!(resolve_game(&registry, None).unwrap().id(), game.id());
        assert_eq!(resolve_game(&registry, Some(&id)).unwrap().id(), game.id());
        assert_eq!(
            resolve_game(&registry, Some(&id[..6])).unwrap().id(),
            game.id()
        );
        assert!(resolve_game(&registry, Some("not-a-game")).is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(65), "1m 05s");
        assert_eq!(format_duration(3_725), "1h 02m 05s");
    }
}

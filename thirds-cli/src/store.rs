use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thirds_core::{Clock, LedgerSnapshot, MemoryLedger, PlayerId, SystemClock};
use thirds_game::{GameConfig, GameRegistry, RegistrySnapshot};

const STORE_FILE: &str = "thirds.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry and ledger loaded from disk for one command.
///
/// The session holds the store's write lock until it is saved or dropped, so
/// concurrent invocations run one after another. Dropping without saving
/// discards every change.
pub struct Session {
    pub registry: GameRegistry,
    pub ledger: Arc<MemoryLedger>,
    conn: Connection,
}

pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
            busy_timeout: BUSY_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn init(&self, admin: PlayerId, defaults: GameConfig) -> Result<()> {
        let conn = self.open().await?;
        if read_state(&conn)?.is_some() {
            bail!("Registry already initialized at {}", self.path.display());
        }

        let ledger = Arc::new(MemoryLedger::new());
        let registry = GameRegistry::new(admin, defaults, clock(), ledger.clone())?;

        self.save(Session {
            registry,
            ledger,
            conn,
        })
        .await
    }

    pub async fn load(&self) -> Result<Session> {
        let conn = self.open().await?;
        let Some((registry, ledger)) = read_state(&conn)? else {
            bail!(
                "No registry at {} (run 'thirds init <admin>' first)",
                self.path.display()
            );
        };

        let registry: RegistrySnapshot = serde_json::from_str(&registry)
            .with_context(|| format!("Corrupt registry in {}", self.path.display()))?;
        let ledger: LedgerSnapshot = serde_json::from_str(&ledger)
            .with_context(|| format!("Corrupt ledger in {}", self.path.display()))?;

        let ledger = Arc::new(MemoryLedger::from_snapshot(ledger));
        let registry = GameRegistry::from_snapshot(registry, clock(), ledger.clone())?;

        Ok(Session {
            registry,
            ledger,
            conn,
        })
    }

    /// Write the session back and release the write lock.
    pub async fn save(&self, session: Session) -> Result<()> {
        let registry = serde_json::to_string(&session.registry.snapshot())?;
        let ledger = serde_json::to_string(&session.ledger.snapshot())?;

        session.conn.execute(
            "INSERT OR REPLACE INTO registry_state (id, registry, ledger, updated_at)
             VALUES (1, ?1, ?2, ?3)",
            params![registry, ledger, chrono::Utc::now().timestamp()],
        )?;
        session.conn.execute_batch("COMMIT")?;

        tracing::debug!("Saved registry to {}", self.path.display());
        Ok(())
    }

    /// Open the database and take the write lock, waiting up to the busy
    /// timeout for another invocation to finish.
    async fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        conn.busy_timeout(self.busy_timeout)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS registry_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                registry TEXT NOT NULL,
                ledger TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute_batch("BEGIN IMMEDIATE")
            .with_context(|| format!("Registry at {} is busy", self.path.display()))?;

        Ok(conn)
    }
}

fn read_state(conn: &Connection) -> Result<Option<(String, String)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT registry, ledger FROM registry_state WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

//! libSQL backend — async `ProfileStore` implementation.
//!
//! Supports local file and in-memory databases. All writes are funneled
//! through one internal lock so that the per-turn transaction in
//! `commit_turn` never interleaves with other statements on the shared
//! connection.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::profile::{Profile, Tier, Turn, TurnRole};
use crate::store::traits::ProfileStore;

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    write_lock: Mutex<()>,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path).build().await.map_err(|e| {
            DatabaseError::Connection(format!("Failed to open libSQL database: {e}"))
        })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
            write_lock: Mutex::new(()),
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
            write_lock: Mutex::new(()),
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> Result<(), DatabaseError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                role TEXT,
                years_experience INTEGER,
                country TEXT,
                leads_teams INTEGER,
                interest_level TEXT,
                score INTEGER NOT NULL DEFAULT 0,
                tier TEXT NOT NULL DEFAULT 'unknown',
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS turns (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                profile_id TEXT NOT NULL REFERENCES profiles(id),
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_turns_profile ON turns(profile_id, seq)",
        ];
        for sql in statements {
            self.conn
                .execute(sql, ())
                .await
                .map_err(|e| DatabaseError::Query(format!("init_schema: {e}")))?;
        }
        Ok(())
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn insert_turn(
        &self,
        conn: &Connection,
        profile_id: &str,
        role: TurnRole,
        content: &str,
    ) -> Result<(), DatabaseError> {
        conn.execute(
            "INSERT INTO turns (id, profile_id, role, content, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Uuid::new_v4().to_string(),
                profile_id,
                role.as_str(),
                content,
                Utc::now().to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_turn: {e}")))?;
        Ok(())
    }

    async fn update_profile(
        &self,
        conn: &Connection,
        profile: &Profile,
    ) -> Result<(), DatabaseError> {
        conn.execute(
            "UPDATE profiles SET role = ?1, years_experience = ?2, country = ?3,
                leads_teams = ?4, interest_level = ?5, score = ?6, tier = ?7
             WHERE id = ?8",
            params![
                opt_text(profile.role.as_deref()),
                opt_int(profile.years_experience.map(i64::from)),
                opt_text(profile.country.as_deref()),
                opt_int(profile.leads_teams.map(i64::from)),
                opt_text(profile.interest_level.as_deref()),
                profile.score,
                tier_to_str(profile.tier),
                profile.id.as_str(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("update_profile: {e}")))?;
        Ok(())
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to a libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Convert `Option<i64>` to a libsql Value.
fn opt_int(v: Option<i64>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Integer(v),
        None => libsql::Value::Null,
    }
}

fn tier_to_str(tier: Tier) -> &'static str {
    match tier {
        Tier::Unknown => "unknown",
        Tier::Qualified => "qualified",
        Tier::Potential => "potential",
        Tier::NotQualified => "not_qualified",
    }
}

fn str_to_tier(s: &str) -> Tier {
    match s {
        "qualified" => Tier::Qualified,
        "potential" => Tier::Potential,
        "not_qualified" => Tier::NotQualified,
        _ => Tier::Unknown,
    }
}

fn str_to_turn_role(s: &str) -> TurnRole {
    match s {
        "assistant" => TurnRole::Assistant,
        _ => TurnRole::User,
    }
}

const PROFILE_COLUMNS: &str =
    "id, role, years_experience, country, leads_teams, interest_level, score, tier, created_at";

/// Map a libsql row (in PROFILE_COLUMNS order) to a Profile.
fn row_to_profile(row: &libsql::Row) -> Result<Profile, libsql::Error> {
    let id: String = row.get(0)?;
    let role: Option<String> = row.get(1).ok();
    let years: Option<i64> = row.get(2).ok();
    let country: Option<String> = row.get(3).ok();
    let leads_teams: Option<i64> = row.get(4).ok();
    let interest_level: Option<String> = row.get(5).ok();
    let score: i64 = row.get(6)?;
    let tier_str: String = row.get(7)?;
    let created_str: String = row.get(8)?;

    Ok(Profile {
        id,
        role,
        years_experience: years.map(|y| y.max(0) as u32),
        country,
        leads_teams: leads_teams.map(|v| v != 0),
        interest_level,
        score,
        tier: str_to_tier(&tier_str),
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl ProfileStore for LibSqlBackend {
    async fn get(&self, id: &str) -> Result<Option<Profile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let profile = row_to_profile(&row)
                    .map_err(|e| DatabaseError::Query(format!("get row parse: {e}")))?;
                Ok(Some(profile))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get: {e}"))),
        }
    }

    async fn create(&self, id: &str) -> Result<Profile, DatabaseError> {
        let profile = Profile::new(id);
        let _write = self.write_lock.lock().await;
        self.conn()
            .execute(
                "INSERT INTO profiles (id, score, tier, created_at) VALUES (?1, 0, ?2, ?3)",
                params![
                    profile.id.as_str(),
                    tier_to_str(profile.tier),
                    profile.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create: {e}")))?;
        debug!(profile_id = id, "Profile created");
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<(), DatabaseError> {
        let _write = self.write_lock.lock().await;
        self.update_profile(self.conn(), profile).await
    }

    async fn append_turn(
        &self,
        id: &str,
        role: TurnRole,
        content: &str,
    ) -> Result<(), DatabaseError> {
        let _write = self.write_lock.lock().await;
        self.insert_turn(self.conn(), id, role, content).await
    }

    async fn turn_count(&self, id: &str) -> Result<usize, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM turns WHERE profile_id = ?1",
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("turn_count: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("turn_count parse: {e}")))?;
                Ok(count.max(0) as usize)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("turn_count: {e}"))),
        }
    }

    async fn list_turns(&self, id: &str) -> Result<Vec<Turn>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, role, content, timestamp FROM turns
                 WHERE profile_id = ?1 ORDER BY seq ASC",
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_turns: {e}")))?;

        let mut turns = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_turns: {e}")))?
        {
            let id_str: String = row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("list_turns parse: {e}")))?;
            let role_str: String = row
                .get(1)
                .map_err(|e| DatabaseError::Query(format!("list_turns parse: {e}")))?;
            let content: String = row
                .get(2)
                .map_err(|e| DatabaseError::Query(format!("list_turns parse: {e}")))?;
            let ts_str: String = row
                .get(3)
                .map_err(|e| DatabaseError::Query(format!("list_turns parse: {e}")))?;

            turns.push(Turn {
                id: Uuid::parse_str(&id_str)
                    .map_err(|e| DatabaseError::Serialization(format!("turn id: {e}")))?,
                role: str_to_turn_role(&role_str),
                content,
                timestamp: parse_datetime(&ts_str),
            });
        }
        Ok(turns)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY score DESC, created_at ASC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_profiles: {e}")))?;

        let mut profiles = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_profiles: {e}")))?
        {
            profiles.push(
                row_to_profile(&row)
                    .map_err(|e| DatabaseError::Query(format!("list_profiles parse: {e}")))?,
            );
        }
        Ok(profiles)
    }

    async fn commit_turn(
        &self,
        profile: &Profile,
        user_message: &str,
        reply: &str,
    ) -> Result<(), DatabaseError> {
        let _write = self.write_lock.lock().await;
        let conn = self.conn();

        conn.execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("commit_turn begin: {e}")))?;

        let result: Result<(), DatabaseError> = async {
            self.insert_turn(conn, &profile.id, TurnRole::User, user_message)
                .await?;
            self.update_profile(conn, profile).await?;
            self.insert_turn(conn, &profile.id, TurnRole::Assistant, reply)
                .await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                conn.execute("COMMIT", ())
                    .await
                    .map_err(|e| DatabaseError::Query(format!("commit_turn commit: {e}")))?;
                debug!(profile_id = %profile.id, "Turn committed");
                Ok(())
            }
            Err(e) => {
                // Best effort; the connection drops the transaction anyway
                // if this fails.
                let _ = conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }
}

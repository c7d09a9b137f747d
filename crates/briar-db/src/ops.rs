use briar_core::{BriarError, BriarResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// Trust-score and behavior-log store. Writes are side effects of an
/// analysis; the scoring path never depends on their success.
pub struct TrustStore {
    conn: Arc<Mutex<Connection>>,
}

impl TrustStore {
    pub fn open(path: &str) -> BriarResult<Self> {
        let conn = Connection::open(path).map_err(|e| BriarError::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| BriarError::Database(e.to_string()))?;
        crate::schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> BriarResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| BriarError::Database(e.to_string()))?;
        crate::schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> BriarResult<T>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BriarError::Database(e.to_string()))?;
        f(&conn).map_err(|e| BriarError::Database(e.to_string()))
    }

    /// Idempotent per user; every analysis overwrites the stored score.
    pub fn upsert_trust(&self, user_id: &str, trust_score: f64) -> BriarResult<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_trust (user_id, trust_score, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                   trust_score = excluded.trust_score,
                   updated_at = excluded.updated_at",
                params![user_id, trust_score, now],
            )?;
            Ok(())
        })
    }

    pub fn get_trust(&self, user_id: &str) -> BriarResult<Option<f64>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT trust_score FROM user_trust WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
        })
    }

    /// Raises stored trust to at least `floor` after a completed CAPTCHA.
    /// The score itself is recomputed from behavior on the next sample.
    pub fn apply_captcha_boost(&self, user_id: &str, floor: f64) -> BriarResult<f64> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_trust (user_id, trust_score, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                   trust_score = max(user_trust.trust_score, excluded.trust_score),
                   updated_at = excluded.updated_at",
                params![user_id, floor, now],
            )?;
            conn.query_row(
                "SELECT trust_score FROM user_trust WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
        })
    }

    /// Append-only; never read back by the scoring path.
    pub fn append_behavior_log(
        &self,
        user_id: &str,
        behavior_json: &str,
        trust_score: f64,
        analysis_method: &str,
    ) -> BriarResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO behavior_logs (id, user_id, behavior_json, trust_score, analysis_method, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, user_id, behavior_json, trust_score, analysis_method, now],
            )?;
            Ok(id)
        })
    }

    pub fn recent_logs(&self, limit: usize) -> BriarResult<Vec<BehaviorLogRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, trust_score, analysis_method, created_at FROM behavior_logs ORDER BY created_at DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], |row| {
                Ok(BehaviorLogRow {
                    user_id: row.get(0)?,
                    trust_score: row.get(1)?,
                    analysis_method: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?;
            rows.collect()
        })
    }

    pub fn stats(&self) -> BriarResult<DbStats> {
        self.with_conn(|conn| {
            let users: i64 = conn.query_row("SELECT COUNT(*) FROM user_trust", [], |r| r.get(0))?;
            let logs: i64 =
                conn.query_row("SELECT COUNT(*) FROM behavior_logs", [], |r| r.get(0))?;
            let challenged: i64 = conn.query_row(
                "SELECT COUNT(*) FROM user_trust WHERE trust_score <= 0.45",
                [],
                |r| r.get(0),
            )?;
            Ok(DbStats {
                tracked_users: users as u64,
                behavior_logs: logs as u64,
                low_trust_users: challenged as u64,
            })
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BehaviorLogRow {
    pub user_id: String,
    pub trust_score: f64,
    pub analysis_method: String,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub tracked_users: u64,
    pub behavior_logs: u64,
    pub low_trust_users: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_previous_score() {
        let db = TrustStore::open_in_memory().unwrap();
        db.upsert_trust("u1", 0.9).unwrap();
        db.upsert_trust("u1", 0.3).unwrap();
        assert_eq!(db.get_trust("u1").unwrap(), Some(0.3));
    }

    #[test]
    fn unknown_user_has_no_stored_trust() {
        let db = TrustStore::open_in_memory().unwrap();
        assert_eq!(db.get_trust("nobody").unwrap(), None);
    }

    #[test]
    fn captcha_boost_only_raises_the_score() {
        let db = TrustStore::open_in_memory().unwrap();
        db.upsert_trust("low", 0.2).unwrap();
        assert_eq!(db.apply_captcha_boost("low", 0.8).unwrap(), 0.8);

        db.upsert_trust("high", 0.92).unwrap();
        assert_eq!(db.apply_captcha_boost("high", 0.8).unwrap(), 0.92);

        // A user never scored before lands on the floor.
        assert_eq!(db.apply_captcha_boost("new", 0.8).unwrap(), 0.8);
    }

    #[test]
    fn behavior_log_is_append_only_and_ordered() {
        let db = TrustStore::open_in_memory().unwrap();
        db.append_behavior_log("u1", "{}", 0.6, "rule_based_fallback")
            .unwrap();
        db.append_behavior_log("u1", "{}", 0.7, "openrouter").unwrap();
        let logs = db.recent_logs(10).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().any(|l| l.analysis_method == "openrouter"));
    }

    #[test]
    fn stats_count_low_trust_users() {
        let db = TrustStore::open_in_memory().unwrap();
        db.upsert_trust("bot", 0.2).unwrap();
        db.upsert_trust("human", 0.9).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.tracked_users, 2);
        assert_eq!(stats.low_trust_users, 1);
    }
}

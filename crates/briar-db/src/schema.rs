use briar_core::BriarResult;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> BriarResult<()> {
    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| briar_core::BriarError::Database(e.to_string()))?;
    Ok(())
}

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS user_trust (
    user_id TEXT PRIMARY KEY,
    trust_score REAL NOT NULL DEFAULT 0.0,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS behavior_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    behavior_json TEXT NOT NULL,
    trust_score REAL NOT NULL,
    analysis_method TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_behavior_logs_user ON behavior_logs(user_id, created_at);
"#;

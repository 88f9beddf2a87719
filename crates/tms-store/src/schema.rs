use rusqlite::Connection;

/// Provider column keeps the `service_provider` name used by databases
/// written before this crate existed.
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS t_translations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project TEXT NOT NULL,
        service_provider TEXT NOT NULL,
        source_text TEXT NOT NULL,
        target_text TEXT,
        source_lang TEXT,
        target_lang TEXT,
        note TEXT,
        created_by TEXT,
        updated_by TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_PROJECT_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_translations_project
    ON t_translations(project)
"#;

pub(crate) const RECORD_COLUMNS: &str = "id, project, service_provider, source_text, target_text, \
     source_lang, target_lang, note, created_by, updated_by, created_at, updated_at";

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!("{CREATE_TABLE};{CREATE_PROJECT_INDEX};"))
}

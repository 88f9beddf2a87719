//! SQLite-backed store for translation records.
//!
//! Every operation opens its own connection and drops it before returning,
//! so no state is shared between calls.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};

use crate::error::StoreError;
use crate::record::{NewTranslation, ProjectStats, TranslationRecord};
use crate::schema::{self, RECORD_COLUMNS};

pub const DEFAULT_LIST_LIMIT: usize = 100;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub struct TranslationStore {
    path: PathBuf,
}

impl TranslationStore {
    /// Open (creating if needed) the database at `path` and ensure the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let store = Self { path };
        let conn = store.connect()?;
        schema::init(&conn)?;
        tracing::debug!("Opened translation store at {}", store.path.display());

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        // SQLite's own lower() and LIKE only fold ASCII
        conn.create_scalar_function(
            "unicode_lower",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;
        Ok(conn)
    }

    /// Append a record and return its id
    pub fn insert(&self, new: &NewTranslation) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        let now = timestamp_now();

        conn.execute(
            r#"
            INSERT INTO t_translations
            (project, service_provider, source_text, target_text, source_lang,
             target_lang, note, created_by, updated_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9, ?9)
            "#,
            params![
                new.project,
                new.provider,
                new.source_text,
                new.target_text,
                new.source_lang,
                new.target_lang,
                new.note,
                new.user,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(
            "Saved translation {} (project '{}', {})",
            id,
            new.project,
            new.provider
        );
        Ok(id)
    }

    /// Rewrite the editable fields of record `id`.
    ///
    /// Fails with [`StoreError::NotFound`] when no such record exists.
    pub fn update(
        &self,
        id: i64,
        target_text: &str,
        note: Option<&str>,
        user: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.connect()?;

        let changed = conn.execute(
            r#"
            UPDATE t_translations
            SET target_text = ?1, note = ?2, updated_by = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![target_text, note, user, timestamp_now(), id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::info!("Updated translation {}", id);
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Option<TranslationRecord>, StoreError> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM t_translations WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Newest records first, for one project or (with `None`) for all
    pub fn list_by_project(
        &self,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        self.query_records(project, None, Some(limit))
    }

    /// Distinct project names, sorted
    pub fn list_projects(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT project FROM t_translations ORDER BY project")?;
        let projects = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(projects)
    }

    /// Case-insensitive substring search over source, target and note text
    pub fn search(
        &self,
        project: Option<&str>,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        self.query_records(project, Some(query), Some(limit))
    }

    pub fn project_stats(&self, project: &str) -> Result<ProjectStats, StoreError> {
        let conn = self.connect()?;
        let (total, completed): (i64, i64) = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COUNT(CASE WHEN target_text IS NOT NULL AND TRIM(target_text) != '' THEN 1 END)
            FROM t_translations
            WHERE project = ?1
            "#,
            params![project],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let total = total.max(0) as u64;
        let completed = completed.max(0) as u64;
        Ok(ProjectStats {
            total,
            completed,
            pending: total - completed,
        })
    }

    /// Write all matching records to `writer` as a JSON array; returns the count
    pub fn export_json<W: Write>(
        &self,
        project: Option<&str>,
        writer: W,
    ) -> Result<usize, StoreError> {
        let records = self.query_records(project, None, None)?;
        serde_json::to_writer_pretty(writer, &records)?;
        Ok(records.len())
    }

    /// Write all matching records to `writer` as CSV with a header row;
    /// returns the count
    pub fn export_csv<W: Write>(
        &self,
        project: Option<&str>,
        writer: W,
    ) -> Result<usize, StoreError> {
        let records = self.query_records(project, None, None)?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;

        Ok(records.len())
    }

    fn query_records(
        &self,
        project: Option<&str>,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        let conn = self.connect()?;

        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM t_translations WHERE 1=1");
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(project) = project.filter(|p| !p.is_empty()) {
            values.push(Box::new(project.to_string()));
            sql.push_str(&format!(" AND project = ?{}", values.len()));
        }

        if let Some(query) = query {
            values.push(Box::new(like_pattern(&query.to_lowercase())));
            let idx = values.len();
            sql.push_str(&format!(
                " AND (unicode_lower(source_text) LIKE ?{idx} ESCAPE '\\' \
                 OR unicode_lower(target_text) LIKE ?{idx} ESCAPE '\\' \
                 OR unicode_lower(note) LIKE ?{idx} ESCAPE '\\')"
            ));
        }

        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        values.push(Box::new(limit));
        sql.push_str(&format!(
            " ORDER BY created_at DESC, id DESC LIMIT ?{}",
            values.len()
        ));

        tracing::debug!("{}", sql);
        let mut stmt = conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let records = stmt
            .query_map(refs.as_slice(), row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TranslationRecord> {
    Ok(TranslationRecord {
        id: row.get(0)?,
        project: row.get(1)?,
        provider: row.get(2)?,
        source_text: row.get(3)?,
        target_text: row.get(4)?,
        source_lang: row.get(5)?,
        target_lang: row.get(6)?,
        note: row.get(7)?,
        created_by: row.get(8)?,
        updated_by: row.get(9)?,
        created_at: parse_timestamp(10, &row.get::<_, String>(10)?)?,
        updated_at: parse_timestamp(11, &row.get::<_, String>(11)?)?,
    })
}

fn timestamp_now() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts our millisecond format as well as SQLite's `CURRENT_TIMESTAMP`
fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

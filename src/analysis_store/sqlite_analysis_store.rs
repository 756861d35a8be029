use super::models::{NewAnalysis, StoredAnalysis};
use super::schema::ANALYSIS_VERSIONED_SCHEMAS;
use super::AnalysisStore;
use crate::analysis::{AnalysisResult, Modality};
use crate::sqlite_persistence::open_versioned;
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const SELECT_COLUMNS: &str = "id, user_id, content_type, song_title, aura_score, rizz_score, \
     mystic_title, analysis_text, is_public, created";

pub struct SqliteAnalysisStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAnalysisStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, "analysis", ANALYSIS_VERSIONED_SCHEMAS)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Analysis database lock poisoned"))
    }

    fn row_to_analysis(row: &rusqlite::Row) -> rusqlite::Result<StoredAnalysis> {
        let content_type: String = row.get("content_type")?;
        let content_type = Modality::parse(&content_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown content type {}", content_type).into(),
            )
        })?;
        Ok(StoredAnalysis {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            content_type,
            song_title: row.get("song_title")?,
            result: AnalysisResult {
                aura_score: row.get("aura_score")?,
                rizz_score: row.get("rizz_score")?,
                mystic_title: row.get("mystic_title")?,
                analysis_text: row.get("analysis_text")?,
            },
            is_public: row.get("is_public")?,
            created_at: row.get("created")?,
        })
    }

    fn query_many(
        conn: &Connection,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredAnalysis>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM analysis {}",
            SELECT_COLUMNS, filter
        ))?;
        let rows = stmt
            .query_map(params, Self::row_to_analysis)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_analysis_locked(conn: &Connection, id: &str) -> Result<Option<StoredAnalysis>> {
        let analysis = conn
            .query_row(
                &format!("SELECT {} FROM analysis WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_analysis,
            )
            .optional()?;
        Ok(analysis)
    }
}

impl AnalysisStore for SqliteAnalysisStore {
    fn create_analysis(&self, analysis: &NewAnalysis) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO analysis (id, user_id, content_type, song_title, aura_score, rizz_score, \
             mystic_title, analysis_text, is_public) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                analysis.user_id,
                analysis.content_type.as_str(),
                analysis.song_title,
                analysis.result.aura_score,
                analysis.result.rizz_score,
                analysis.result.mystic_title,
                analysis.result.analysis_text,
                analysis.is_public,
            ],
        )?;
        debug!(
            "Stored {} analysis {} for user {:?}",
            analysis.content_type, id, analysis.user_id
        );
        Ok(id)
    }

    fn get_analysis(&self, id: &str) -> Result<Option<StoredAnalysis>> {
        let conn = self.lock()?;
        Self::get_analysis_locked(&conn, id)
    }

    fn get_user_analyses(&self, user_id: usize) -> Result<Vec<StoredAnalysis>> {
        let conn = self.lock()?;
        Self::query_many(
            &conn,
            "WHERE user_id = ?1 ORDER BY created DESC, rowid DESC",
            params![user_id],
        )
    }

    fn get_public_analyses(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let conn = self.lock()?;
        Self::query_many(
            &conn,
            "WHERE is_public = 1 ORDER BY created DESC, rowid DESC LIMIT ?1",
            params![limit as i64],
        )
    }

    fn set_analysis_visibility(&self, id: &str, is_public: bool) -> Result<Option<StoredAnalysis>> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE analysis SET is_public = ?1 WHERE id = ?2",
            params![is_public, id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::get_analysis_locked(&conn, id)
    }
}

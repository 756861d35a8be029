//! SQLite schema definitions for the analysis database.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

const ANALYSIS_TABLE_V0: Table = Table {
    name: "analysis",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("user_id", &SqlType::Integer),
        sqlite_column!("content_type", &SqlType::Text, non_null = true),
        sqlite_column!("song_title", &SqlType::Text),
        sqlite_column!("aura_score", &SqlType::Integer, non_null = true),
        sqlite_column!("rizz_score", &SqlType::Integer, non_null = true),
        sqlite_column!("mystic_title", &SqlType::Text, non_null = true),
        sqlite_column!("analysis_text", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_public",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_analysis_user_created", "user_id, created DESC"),
        ("idx_analysis_public_created", "is_public, created DESC"),
    ],
};

pub const ANALYSIS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ANALYSIS_TABLE_V0],
    migration: None,
}];

//! Issue record repository for the `issue_records` table.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::notifier::record::{Fingerprint, IssueId, IssueKind, IssueRecord};

use super::{Database, DatabaseError};

/// Finds the record reported for this fingerprint, if any.
pub fn find(db: &Database, fingerprint: &Fingerprint) -> Result<Option<IssueRecord>, DatabaseError> {
    let kind = fingerprint.kind();
    let (key, secondary_key) = fingerprint.keys();

    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT issue_id, created_at FROM issue_records
                 WHERE kind = ?1 AND key = ?2 AND secondary_key = ?3",
                params![kind.as_str(), key, secondary_key],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((issue_id, created_at)) = row else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| DatabaseError::CorruptRow {
                table: "issue_records",
                reason: format!("invalid created_at '{}': {}", created_at, e),
            })?
            .with_timezone(&Utc);

        Ok(Some(IssueRecord {
            issue_id: IssueId(issue_id as u64),
            fingerprint: fingerprint.clone(),
            created_at,
        }))
    })
}

/// Inserts the record unless one with the same fingerprint exists.
///
/// The unique index on the fingerprint makes this an atomic conditional
/// insert. Returns `false` when another writer got there first.
pub fn insert(db: &Database, record: &IssueRecord) -> Result<bool, DatabaseError> {
    let kind = record.fingerprint.kind();
    let (key, secondary_key) = record.fingerprint.keys();

    db.with_conn(|conn| {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO issue_records (kind, key, secondary_key, issue_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                kind.as_str(),
                key,
                secondary_key,
                record.issue_id.0 as i64,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    })
}

/// Lists every record of a kind, oldest first.
pub fn find_by_kind(db: &Database, kind: IssueKind) -> Result<Vec<IssueRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT key, secondary_key, issue_id, created_at FROM issue_records
             WHERE kind = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![kind.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, secondary_key, issue_id, created_at)| {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| DatabaseError::CorruptRow {
                        table: "issue_records",
                        reason: format!("invalid created_at '{}': {}", created_at, e),
                    })?
                    .with_timezone(&Utc);
                Ok(IssueRecord {
                    issue_id: IssueId(issue_id as u64),
                    fingerprint: Fingerprint::from_keys(kind, key, secondary_key),
                    created_at,
                })
            })
            .collect()
    })
}

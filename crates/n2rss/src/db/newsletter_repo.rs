//! Newsletter repository for the `newsletters` table.

use rusqlite::{params, Row};

use crate::model::Newsletter;

use super::{Database, DatabaseError};

const COLUMNS: &str = "code, name, website, notes, feed_title, enabled, hidden";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Newsletter> {
    Ok(Newsletter {
        code: row.get(0)?,
        name: row.get(1)?,
        website: row.get(2)?,
        notes: row.get(3)?,
        feed_title: row.get(4)?,
        enabled: row.get(5)?,
        hidden: row.get(6)?,
    })
}

/// Inserts the newsletter or refreshes its attributes.
pub fn upsert(db: &Database, newsletter: &Newsletter) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO newsletters (code, name, website, notes, feed_title, enabled, hidden)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(code) DO UPDATE SET
               name = excluded.name,
               website = excluded.website,
               notes = excluded.notes,
               feed_title = excluded.feed_title,
               enabled = excluded.enabled,
               hidden = excluded.hidden",
            params![
                newsletter.code,
                newsletter.name,
                newsletter.website,
                newsletter.notes,
                newsletter.feed_title,
                newsletter.enabled,
                newsletter.hidden,
            ],
        )?;
        Ok(())
    })
}

/// Upserts every newsletter; returns how many were written.
pub fn sync_all<'a>(
    db: &Database,
    newsletters: impl IntoIterator<Item = &'a Newsletter>,
) -> Result<usize, DatabaseError> {
    let mut count = 0;
    for newsletter in newsletters {
        upsert(db, newsletter)?;
        count += 1;
    }
    Ok(count)
}

pub fn find_by_code(db: &Database, code: &str) -> Result<Option<Newsletter>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM newsletters WHERE code = ?1",
            COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![code], from_row)?;
        match rows.next() {
            Some(Ok(val)) => Ok(Some(val)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

pub fn find_all(db: &Database) -> Result<Vec<Newsletter>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM newsletters ORDER BY code",
            COLUMNS
        ))?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

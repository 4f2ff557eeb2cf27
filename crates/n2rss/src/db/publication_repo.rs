//! Publication repository for the `publications` and `articles` tables.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{Article, Publication};

use super::{Database, DatabaseError};

/// Inserts publications with their articles in a single transaction.
///
/// A publication already stored for the same newsletter, title and date is
/// skipped, so re-processing a message never duplicates content. Returns the
/// number of publications actually inserted.
pub fn insert_all(db: &Database, publications: &[Publication]) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        let mut inserted = 0;

        for publication in publications {
            let changed = tx.execute(
                "INSERT OR IGNORE INTO publications (newsletter_code, title, date)
                 VALUES (?1, ?2, ?3)",
                params![publication.newsletter_code, publication.title, publication.date],
            )?;
            if changed == 0 {
                log::debug!(
                    "Publication '{}' of '{}' on {} already stored",
                    publication.title,
                    publication.newsletter_code,
                    publication.date
                );
                continue;
            }

            let publication_id = tx.last_insert_rowid();
            let mut stmt = tx.prepare_cached(
                "INSERT INTO articles (publication_id, position, title, link, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, article) in publication.articles.iter().enumerate() {
                stmt.execute(params![
                    publication_id,
                    position as i64,
                    article.title,
                    article.link,
                    article.description,
                ])?;
            }
            inserted += 1;
        }

        tx.commit()?;
        Ok(inserted)
    })
}

/// Counts stored publications of a newsletter.
pub fn count_by_newsletter(db: &Database, code: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM publications WHERE newsletter_code = ?1",
            params![code],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Returns the `limit` most recent publications, newest first.
pub fn find_recent_by_newsletter(
    db: &Database,
    code: &str,
    limit: usize,
) -> Result<Vec<Publication>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, title, date FROM publications WHERE newsletter_code = ?1
             ORDER BY date DESC, id DESC LIMIT ?2",
        )?;
        let headers = stmt
            .query_map(params![code, limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, NaiveDate>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|(id, title, date)| {
                Ok(Publication {
                    title,
                    date,
                    newsletter_code: code.to_string(),
                    articles: load_articles(conn, id)?,
                })
            })
            .collect()
    })
}

/// Returns the first publication ever stored for the newsletter.
pub fn find_earliest_by_newsletter(
    db: &Database,
    code: &str,
) -> Result<Option<Publication>, DatabaseError> {
    db.with_conn(|conn| {
        let header = conn
            .query_row(
                "SELECT id, title, date FROM publications WHERE newsletter_code = ?1
                 ORDER BY date ASC, id ASC LIMIT 1",
                params![code],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, NaiveDate>(2)?,
                    ))
                },
            )
            .optional()?;

        match header {
            Some((id, title, date)) => Ok(Some(Publication {
                title,
                date,
                newsletter_code: code.to_string(),
                articles: load_articles(conn, id)?,
            })),
            None => Ok(None),
        }
    })
}

fn load_articles(conn: &Connection, publication_id: i64) -> Result<Vec<Article>, DatabaseError> {
    let mut stmt = conn.prepare_cached(
        "SELECT title, link, description FROM articles
         WHERE publication_id = ?1 ORDER BY position",
    )?;
    let articles = stmt
        .query_map(params![publication_id], |row| {
            Ok(Article {
                title: row.get(0)?,
                link: row.get(1)?,
                description: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(articles)
}

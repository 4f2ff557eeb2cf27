//! Storage capabilities consumed by the ingestion and monitoring jobs.

use crate::model::Publication;
use crate::notifier::record::{Fingerprint, IssueRecord};

use super::{issue_repo, publication_repo, Database, DatabaseError};

/// Append/read access to stored publications.
pub trait PublicationStore: Send + Sync {
    /// Persists the publications; already stored ones are skipped.
    fn save(&self, publications: &[Publication]) -> Result<usize, DatabaseError>;

    fn count_by_newsletter(&self, code: &str) -> Result<u64, DatabaseError>;

    /// The `limit` most recent publications, newest first.
    fn recent_by_newsletter(&self, code: &str, limit: usize)
        -> Result<Vec<Publication>, DatabaseError>;

    fn earliest_by_newsletter(&self, code: &str) -> Result<Option<Publication>, DatabaseError>;
}

/// Lookup and conditional insert of reported incidents.
pub trait IssueRecordStore: Send + Sync {
    fn find(&self, fingerprint: &Fingerprint) -> Result<Option<IssueRecord>, DatabaseError>;

    /// Returns `false` if a record with the same fingerprint already exists.
    fn save(&self, record: &IssueRecord) -> Result<bool, DatabaseError>;
}

impl PublicationStore for Database {
    fn save(&self, publications: &[Publication]) -> Result<usize, DatabaseError> {
        publication_repo::insert_all(self, publications)
    }

    fn count_by_newsletter(&self, code: &str) -> Result<u64, DatabaseError> {
        publication_repo::count_by_newsletter(self, code)
    }

    fn recent_by_newsletter(
        &self,
        code: &str,
        limit: usize,
    ) -> Result<Vec<Publication>, DatabaseError> {
        publication_repo::find_recent_by_newsletter(self, code, limit)
    }

    fn earliest_by_newsletter(&self, code: &str) -> Result<Option<Publication>, DatabaseError> {
        publication_repo::find_earliest_by_newsletter(self, code)
    }
}

impl IssueRecordStore for Database {
    fn find(&self, fingerprint: &Fingerprint) -> Result<Option<IssueRecord>, DatabaseError> {
        issue_repo::find(self, fingerprint)
    }

    fn save(&self, record: &IssueRecord) -> Result<bool, DatabaseError> {
        issue_repo::insert(self, record)
    }
}

//! Mailbox access: the [`MailboxClient`] capability and its IMAP implementation.

use std::future::Future;

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::MailboxConfig;

use super::error::{MailboxError, Result};
use super::message::{Email, Listing, MailboxId, UnreadableMessage};
use super::parser::parse_email;

/// Lists unread newsletter emails and advances their mailbox state.
#[async_trait]
pub trait MailboxClient: Send + Sync {
    /// Returns every unread email of the inbox folder in a stable order,
    /// along with the unread messages that could not be fetched or parsed.
    async fn list_unread(&self) -> Result<Listing>;

    /// Flags the email as seen.
    async fn mark_read(&self, email: &Email) -> Result<()>;

    /// Moves the email out of its folder into the processed folder.
    async fn move_to_processed(&self, email: &Email) -> Result<()>;
}

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

struct Connection {
    session: Session<TlsStream>,
    selected_folder: Option<String>,
}

/// IMAP-backed mailbox. Connects lazily and reuses one session.
pub struct ImapMailbox {
    config: MailboxConfig,
    password: SecretString,
    connection: Mutex<Option<Connection>>,
}

impl ImapMailbox {
    pub fn new(config: MailboxConfig, password: SecretString) -> Self {
        Self {
            config,
            password,
            connection: Mutex::new(None),
        }
    }

    /// Connects to the IMAP server and authenticates.
    async fn connect(&self) -> Result<Connection> {
        if !self.config.use_tls {
            return Err(MailboxError::ConfigError(
                "TLS is required for secure email connections".to_string(),
            ));
        }

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Connecting to IMAP server at {}", addr);

        // Establish TCP connection using std::net and wrap with async-io
        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| MailboxError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| MailboxError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| MailboxError::ConnectionFailed(e.to_string()))?;

        let tls = TlsConnector::new();
        let tls_stream = tls.connect(&self.config.host, tcp_stream).await?;

        let client = async_imap::Client::new(tls_stream);
        let session = client
            .login(&self.config.username, self.password.expose_secret())
            .await
            .map_err(|(e, _)| MailboxError::AuthenticationFailed(e.to_string()))?;

        info!("Successfully authenticated to IMAP server");
        Ok(Connection {
            session,
            selected_folder: None,
        })
    }

    /// Locks the shared connection, connecting first if needed.
    async fn connection(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        let mut guard = self.connection.lock().await;
        if guard.is_none() {
            let connection = self.with_timeout("connect", self.connect()).await?;
            *guard = Some(connection);
        }
        Ok(guard)
    }

    async fn with_timeout<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.timeout(), future).await {
            Ok(result) => result,
            Err(_) => Err(MailboxError::Timeout(format!(
                "{} exceeded {}s",
                operation, self.config.timeout_secs
            ))),
        }
    }

    /// Disconnects from the IMAP server gracefully.
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(mut connection) = self.connection.lock().await.take() {
            info!("Disconnecting from IMAP server");
            connection
                .session
                .logout()
                .await
                .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Selects `folder` read-write unless it is already selected.
async fn select_folder(connection: &mut Connection, folder: &str) -> Result<()> {
    if connection.selected_folder.as_deref() == Some(folder) {
        return Ok(());
    }

    debug!("Selecting folder: {}", folder);
    connection.session.select(folder).await.map_err(|e| {
        if e.to_string().contains("Mailbox doesn't exist") || e.to_string().contains("NO") {
            MailboxError::FolderNotFound(folder.to_string())
        } else {
            MailboxError::ProtocolError(e.to_string())
        }
    })?;
    connection.selected_folder = Some(folder.to_string());
    Ok(())
}

async fn fetch_unread(connection: &mut Connection, folder: &str) -> Result<Listing> {
    select_folder(connection, folder).await?;

    let mut uids: Vec<u32> = connection
        .session
        .uid_search("UNSEEN")
        .await
        .map_err(|e| MailboxError::ProtocolError(e.to_string()))?
        .into_iter()
        .collect();
    uids.sort_unstable();

    if uids.is_empty() {
        return Ok(Listing::default());
    }

    let uid_set = uids
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(",");
    debug!("Fetching {} emails with UIDs: {}", uids.len(), uid_set);

    // BODY.PEEK[] keeps the \Seen flag untouched until processing succeeds.
    let mut messages = connection
        .session
        .uid_fetch(&uid_set, "(UID BODY.PEEK[])")
        .await
        .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;

    let mut listing = Listing::default();
    while let Some(message_result) = messages.next().await {
        let message = match message_result {
            Ok(message) => message,
            Err(e) => {
                warn!("Error fetching message: {}", e);
                listing.unreadable.push(UnreadableMessage::new(
                    folder,
                    None,
                    MailboxError::ProtocolError(e.to_string()),
                ));
                continue;
            }
        };
        let Some(uid) = message.uid else {
            warn!("Message missing UID");
            listing.unreadable.push(UnreadableMessage::new(
                folder,
                None,
                MailboxError::ProtocolError("Fetched message carries no UID".to_string()),
            ));
            continue;
        };
        let Some(body) = message.body() else {
            warn!("Message UID {} has no body", uid);
            listing.unreadable.push(UnreadableMessage::new(
                folder,
                Some(uid),
                MailboxError::ProtocolError(format!("Message {}#{} returned no body", folder, uid)),
            ));
            continue;
        };
        match parse_email(body, MailboxId::new(folder, uid)) {
            Ok(email) => listing.emails.push(email),
            Err(e) => {
                warn!("Unparseable email UID {}: {}", uid, e);
                listing
                    .unreadable
                    .push(UnreadableMessage::new(folder, Some(uid), e));
            }
        }
    }

    listing.emails.sort_by_key(|email| email.mailbox_id.uid);
    Ok(listing)
}

async fn store_seen(connection: &mut Connection, id: &MailboxId) -> Result<()> {
    select_folder(connection, &id.folder).await?;

    let updates = connection
        .session
        .uid_store(id.uid.to_string(), "+FLAGS (\\Seen)")
        .await
        .map_err(|e| MailboxError::ProtocolError(e.to_string()))?;
    let updates: Vec<_> = updates.collect().await;
    for update in updates {
        update.map_err(|e| MailboxError::ProtocolError(e.to_string()))?;
    }
    Ok(())
}

async fn move_message(connection: &mut Connection, id: &MailboxId, target: &str) -> Result<()> {
    select_folder(connection, &id.folder).await?;

    connection
        .session
        .uid_mv(id.uid.to_string(), target)
        .await
        .map_err(|e| MailboxError::ProtocolError(e.to_string()))
}

#[async_trait]
impl MailboxClient for ImapMailbox {
    async fn list_unread(&self) -> Result<Listing> {
        let mut guard = self.connection().await?;
        let connection = guard
            .as_mut()
            .ok_or_else(|| MailboxError::ConnectionFailed("Not connected".to_string()))?;

        let folder = self.config.inbox_folder.clone();
        let result = self
            .with_timeout("list unread", fetch_unread(connection, &folder))
            .await;
        if result.is_err() {
            // Force a fresh session on the next call.
            *guard = None;
        }
        let listing = result?;
        info!(
            "Found {} unread emails in '{}' ({} unreadable)",
            listing.emails.len(),
            folder,
            listing.unreadable.len()
        );
        Ok(listing)
    }

    async fn mark_read(&self, email: &Email) -> Result<()> {
        let mut guard = self.connection().await?;
        let connection = guard
            .as_mut()
            .ok_or_else(|| MailboxError::ConnectionFailed("Not connected".to_string()))?;

        let result = self
            .with_timeout("mark read", store_seen(connection, &email.mailbox_id))
            .await;
        if result.is_err() {
            *guard = None;
        }
        result?;
        debug!("Marked {} as read", email.mailbox_id);
        Ok(())
    }

    async fn move_to_processed(&self, email: &Email) -> Result<()> {
        let mut guard = self.connection().await?;
        let connection = guard
            .as_mut()
            .ok_or_else(|| MailboxError::ConnectionFailed("Not connected".to_string()))?;

        let target = self.config.processed_folder.clone();
        let result = self
            .with_timeout(
                "move to processed",
                move_message(connection, &email.mailbox_id, &target),
            )
            .await;
        if result.is_err() {
            *guard = None;
        }
        result?;
        debug!("Moved {} to '{}'", email.mailbox_id, target);
        Ok(())
    }
}

impl Drop for ImapMailbox {
    fn drop(&mut self) {
        if self.connection.get_mut().is_some() {
            warn!("ImapMailbox dropped without explicit disconnect - session will be closed");
        }
    }
}

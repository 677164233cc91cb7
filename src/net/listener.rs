//! Unix socket listener for client connections.
//!
//! # Responsibilities
//! - Remove a stale socket file left by a previous run
//! - Bind the client-facing socket and open up its permissions
//! - Accept incoming connections and tag them with a connection ID

use std::io;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tokio::net::{UnixListener, UnixStream};

use crate::config::ListenerConfig;
use crate::net::connection::ConnectionId;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to the socket path.
    Bind(io::Error),
    /// Failed to accept connection.
    Accept(io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Accept(e) => write!(f, "Failed to accept: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// The bound client-facing socket.
#[derive(Debug)]
pub struct Listener {
    inner: UnixListener,
    path: PathBuf,
}

impl Listener {
    /// Bind the configured socket path.
    pub fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let path = PathBuf::from(&config.socket_path);

        remove_stale_socket(&path).map_err(ListenerError::Bind)?;

        let inner = UnixListener::bind(&path).map_err(|e| {
            ListenerError::Bind(io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(config.socket_mode))
            .map_err(ListenerError::Bind)?;

        tracing::info!(
            path = %path.display(),
            mode = %format!("{:o}", config.socket_mode),
            "Listener bound"
        );

        Ok(Self { inner, path })
    }

    /// Accept the next client connection.
    pub async fn accept(&self) -> Result<(UnixStream, ConnectionId), ListenerError> {
        let (stream, _addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        let id = ConnectionId::new();
        tracing::trace!(connection_id = %id, "Connection accepted");
        Ok((stream, id))
    }

    /// Path of the bound socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the socket file. Called once the accept loop has stopped.
    pub fn remove_socket_file(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove socket file");
            }
        }
    }
}

/// Delete a leftover socket file. Refuses to touch anything that is not a socket.
fn remove_stale_socket(path: &Path) -> io::Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) => {
            if !metadata.file_type().is_socket() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists but is not a socket", path.display()),
                ));
            }
            tracing::debug!(path = %path.display(), "Removing stale socket");
            std::fs::remove_file(path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

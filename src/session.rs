//! Session gate for the Ecko client
//!
//! Access to the backend is gated behind a password. The password itself is
//! held only in process memory for the lifetime of the session; what survives
//! a restart is a single boolean flag kept in a small pluggable store. A
//! restart therefore always forces the user to re-enter the password before
//! any authenticated call succeeds.
//!
//! The gate is a three-state machine:
//!
//! ```text
//! Locked -> (password entered) -> TentativelyUnlocked -> (probe ok) -> Unlocked
//! Unlocked/TentativelyUnlocked -> (any 401/403) -> Locked
//! ```
//!
//! There is no terminal state; the gate can cycle indefinitely.

use crate::error::{EckoError, Result};
use directories::ProjectDirs;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable overriding the session flag file location
pub const SESSION_FILE_ENV: &str = "ECKO_SESSION_FILE";

/// Gate state for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No usable secret; every backend call fails before network I/O
    Locked,

    /// A secret was entered but has not yet been confirmed by the backend
    TentativelyUnlocked,

    /// The secret was accepted by a probe call
    Unlocked,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::TentativelyUnlocked => write!(f, "UNVERIFIED"),
            Self::Unlocked => write!(f, "UNLOCKED"),
        }
    }
}

/// Persistence collaborator for the reload-surviving session flag
///
/// Only a single boolean crosses process restarts; the secret never does.
/// Injected into [`Session`] at construction so the gate has no hardcoded
/// global store.
pub trait SessionStore: Send + Sync {
    /// Whether the flag is currently set
    fn load_flag(&self) -> Result<bool>;

    /// Set the flag
    fn save_flag(&self) -> Result<()>;

    /// Clear the flag
    fn clear_flag(&self) -> Result<()>;
}

/// File-backed session store
///
/// The flag is the existence of a marker file under the user's data
/// directory. The location can be overridden with the `ECKO_SESSION_FILE`
/// environment variable or an explicit path (useful for tests).
pub struct FileSessionStore {
    flag_path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at the default location
    ///
    /// Honors the `ECKO_SESSION_FILE` override; otherwise the flag lives in
    /// the platform data directory for the application.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(SESSION_FILE_ENV) {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "eckolabs", "ecko")
            .ok_or_else(|| EckoError::Store("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("session.flag"))
    }

    /// Create a store using the specified flag file path
    ///
    /// # Examples
    ///
    /// ```
    /// use ecko::session::FileSessionStore;
    ///
    /// let store = FileSessionStore::new_with_path("/tmp/ecko-session.flag").unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(flag_path: P) -> Result<Self> {
        let flag_path = flag_path.into();

        if let Some(parent) = flag_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EckoError::Store(format!("Failed to create data directory: {}", e)))?;
        }

        Ok(Self { flag_path })
    }
}

impl SessionStore for FileSessionStore {
    fn load_flag(&self) -> Result<bool> {
        Ok(self.flag_path.exists())
    }

    fn save_flag(&self) -> Result<()> {
        std::fs::write(&self.flag_path, b"1")
            .map_err(|e| EckoError::Store(format!("Failed to write session flag: {}", e)))?;
        Ok(())
    }

    fn clear_flag(&self) -> Result<()> {
        match std::fs::remove_file(&self.flag_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EckoError::Store(format!("Failed to clear session flag: {}", e)).into()),
        }
    }
}

/// In-memory session store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemorySessionStore {
    flag: AtomicBool,
}

impl MemorySessionStore {
    /// Create a store with the flag initially clear
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the flag already set, as after a previous session
    pub fn flagged() -> Self {
        Self {
            flag: AtomicBool::new(true),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_flag(&self) -> Result<bool> {
        Ok(self.flag.load(Ordering::SeqCst))
    }

    fn save_flag(&self) -> Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear_flag(&self) -> Result<()> {
        self.flag.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// The session gate
///
/// Owns the in-memory secret, the gate state, and the injected flag store.
/// Invariant: a held secret implies the gate is not `Locked`; the reverse
/// does not hold (a fresh process can find the flag set with no secret,
/// which forces a re-entry prompt).
pub struct Session {
    state: GateState,
    secret: Option<String>,
    store: Box<dyn SessionStore>,
    resumed: bool,
}

impl Session {
    /// Build a session from the persisted flag at startup
    ///
    /// The gate always starts `Locked`: the secret does not survive a
    /// restart. When the flag was set by a previous session,
    /// [`Session::needs_reentry`] reports that the prompt should mention
    /// re-entry rather than first-time entry.
    pub fn resume(store: Box<dyn SessionStore>) -> Self {
        let resumed = match store.load_flag() {
            Ok(flag) => flag,
            Err(e) => {
                tracing::warn!("Failed to read session flag, treating as unset: {}", e);
                false
            }
        };

        if resumed {
            tracing::debug!("Session flag present, password re-entry required");
        }

        Self {
            state: GateState::Locked,
            secret: None,
            store,
            resumed,
        }
    }

    /// Current gate state
    pub fn state(&self) -> GateState {
        self.state
    }

    /// The in-memory secret, when one is held
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Whether authenticated calls may be attempted
    ///
    /// True in both `TentativelyUnlocked` and `Unlocked`; the gateway
    /// treats them the same and lets the backend arbitrate.
    pub fn is_unlocked(&self) -> bool {
        self.state != GateState::Locked
    }

    /// Whether a previous session left the flag set and the secret must be
    /// re-entered
    pub fn needs_reentry(&self) -> bool {
        self.resumed && self.secret.is_none()
    }

    /// Accept a password and tentatively unlock the gate
    ///
    /// Fails fast without touching the store if the value is empty after
    /// trimming. The value is stored verbatim; only emptiness is checked
    /// here, the backend arbitrates correctness.
    pub fn submit_password(&mut self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(EckoError::Authentication("password must not be empty".into()).into());
        }

        self.secret = Some(value.to_string());
        self.store.save_flag()?;
        self.state = GateState::TentativelyUnlocked;
        tracing::debug!("Session tentatively unlocked, awaiting probe");
        Ok(())
    }

    /// Confirm a tentative unlock after a successful probe call
    pub fn confirm(&mut self) {
        if self.state == GateState::TentativelyUnlocked {
            self.state = GateState::Unlocked;
            tracing::info!("Session unlocked");
        }
    }

    /// Force the gate back to `Locked`
    ///
    /// Clears the in-memory secret and the persisted flag. Idempotent, so
    /// overlapping calls that both observe a 401/403 may each relock safely.
    pub fn lock(&mut self) {
        self.secret = None;
        self.state = GateState::Locked;
        self.resumed = false;
        if let Err(e) = self.store.clear_flag() {
            tracing::warn!("Failed to clear session flag: {}", e);
        }
    }
}

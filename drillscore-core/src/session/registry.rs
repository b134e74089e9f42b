//! Live session registry
//!
//! Maps (principal, session id) to one live [`Evaluator`]. The map lock is only
//! held for lookup, insert and removal; each session carries its own async
//! mutex so unrelated sessions never contend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::Instant;
use tracing::instrument;

use super::config::{DuplicateStartPolicy, RegistryConfig};
use super::requests::StartRequest;
use crate::auth::PrincipalId;
use crate::error::EngineError;
use crate::evaluation::Evaluator;

/// Composite identity of a live session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub principal: PrincipalId,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(principal: PrincipalId, session_id: impl Into<String>) -> Self {
        Self {
            principal,
            session_id: session_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.principal, self.session_id)
    }
}

/// State guarded by a session's mutex
#[derive(Debug)]
pub struct LiveSession {
    evaluator: Evaluator,
    procedure_type: String,
    last_activity: Instant,
}

impl LiveSession {
    fn new(procedure_type: String, started_at: DateTime<Utc>) -> Self {
        let mut evaluator = Evaluator::new();
        evaluator.start(started_at);
        Self {
            evaluator,
            procedure_type,
            last_activity: Instant::now(),
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Procedure type given at `start`
    pub fn procedure_type(&self) -> &str {
        &self.procedure_type
    }

    fn idle_for(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.last_activity)
    }
}

/// One registry slot. `closed` is set once the session leaves the registry,
/// even while another task holds the session lock.
#[derive(Debug)]
struct SessionEntry {
    session: Mutex<LiveSession>,
    closed: AtomicBool,
}

impl SessionEntry {
    fn new(session: LiveSession) -> Self {
        Self {
            session: Mutex::new(session),
            closed: AtomicBool::new(false),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Shared reference to one registry entry
#[derive(Debug, Clone)]
pub struct SessionHandle {
    key: SessionKey,
    entry: Arc<SessionEntry>,
}

impl SessionHandle {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Acquire exclusive access to the session.
    ///
    /// Fails with `SessionNotFound` if the entry left the registry while this
    /// caller was waiting. A successful lock counts as activity for the idle
    /// sweep.
    pub async fn lock(&self) -> Result<MutexGuard<'_, LiveSession>, EngineError> {
        let mut guard = self.entry.session.lock().await;
        if self.entry.is_closed() {
            return Err(EngineError::SessionNotFound(self.key.to_string()));
        }
        guard.last_activity = Instant::now();
        Ok(guard)
    }

    /// Mark the entry gone for every current and future locker
    pub(crate) fn close(&self) {
        self.entry.close();
    }

    fn same_entry(&self, other: &Arc<SessionEntry>) -> bool {
        Arc::ptr_eq(&self.entry, other)
    }
}

/// Process-wide store of live sessions
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionKey, Arc<SessionEntry>>>,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Validate a start request and create its session
    #[instrument(name = "session::start", skip(self, request), fields(session_id = %request.session_id))]
    pub async fn start(
        &self,
        principal: &PrincipalId,
        request: StartRequest,
    ) -> Result<SessionHandle, EngineError> {
        let started_at = request.validate()?;
        let key = SessionKey::new(principal.clone(), request.session_id);
        let handle = self
            .create(key, request.procedure_type.as_str(), started_at)
            .await?;
        tracing::info!(procedure_type = %request.procedure_type, %started_at, "Session started");
        Ok(handle)
    }

    /// Register a new evaluator under `key`, applying the duplicate-start policy
    pub async fn create(
        &self,
        key: SessionKey,
        procedure_type: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Result<SessionHandle, EngineError> {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(&key) {
            match self.config.duplicate_start {
                DuplicateStartPolicy::Reject => {
                    return Err(EngineError::SessionAlreadyActive(key.to_string()));
                }
                DuplicateStartPolicy::Replace => {
                    // A holder already inside the lock finishes on the orphan; waiters are refused
                    existing.close();
                    tracing::warn!(session = %key, "Replacing live session on duplicate start");
                }
            }
        }

        let entry = Arc::new(SessionEntry::new(LiveSession::new(
            procedure_type.into(),
            started_at,
        )));
        sessions.insert(key.clone(), Arc::clone(&entry));

        Ok(SessionHandle { key, entry })
    }

    /// Look up a live session.
    ///
    /// Lookup alone does not refresh the idle clock; [`SessionHandle::lock`] does.
    pub async fn get(&self, key: &SessionKey) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(key).map(|entry| SessionHandle {
            key: key.clone(),
            entry: Arc::clone(entry),
        })
    }

    /// Look up a live session or fail with `SessionNotFound`
    pub async fn require(&self, key: &SessionKey) -> Result<SessionHandle, EngineError> {
        self.get(key)
            .await
            .ok_or_else(|| EngineError::SessionNotFound(key.to_string()))
    }

    /// Remove whatever entry is registered under `key`
    pub async fn remove(&self, key: &SessionKey) -> bool {
        self.sessions.write().await.remove(key).is_some()
    }

    /// Remove the entry only if `key` still maps to this handle's session
    pub async fn remove_if_current(&self, handle: &SessionHandle) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&handle.key) {
            Some(current) if handle.same_entry(current) => {
                sessions.remove(&handle.key);
                true
            }
            _ => false,
        }
    }

    /// Drop sessions idle for longer than the configured timeout.
    ///
    /// Sessions whose lock is currently held are in use and are skipped.
    pub async fn sweep_idle(&self, now: Instant) -> Vec<SessionKey> {
        let Some(timeout) = self.config.idle_timeout else {
            return Vec::new();
        };

        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        for (key, entry) in sessions.iter() {
            if let Ok(session) = entry.session.try_lock() {
                if session.idle_for(now) > timeout {
                    entry.close();
                    expired.push(key.clone());
                }
            }
        }
        for key in &expired {
            sessions.remove(key);
        }
        expired
    }

    /// Number of live sessions
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

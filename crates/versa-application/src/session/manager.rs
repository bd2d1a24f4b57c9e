use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, broadcast, watch};
use versa_core::api::{ApiGateway, HealthStatus};
use versa_core::auth::{AuthHeaders, AuthResponse, LoginRequest, RegisterRequest, SessionState};
use versa_core::error::{Result, VersaError};
use versa_core::persistence::{PersistedSession, PersistencePort, USER_KEY, WORKSPACE_KEY};
use versa_core::user::User;
use versa_core::workspace::{Workspace, WorkspacePatch};

use super::snapshot::{SessionEvent, SessionSnapshot};

pub const LOGIN_FALLBACK: &str = "Login failed";
pub const REGISTER_FALLBACK: &str = "Registration failed";

const EVENT_CAPACITY: usize = 32;

/// Owns the authentication state machine.
///
/// `SessionManager` is responsible for:
/// - Logging in and registering
/// - Restoring a persisted session at startup
/// - Tearing the session down on logout or on a 401 from any
///   authenticated call
/// - Keeping the persisted token, user and workspace in step with memory
///
/// State is published through a `watch` channel so observers always see the
/// latest [`SessionSnapshot`]; transitions are announced as
/// [`SessionEvent`]s on a `broadcast` channel.
pub struct SessionManager {
    gateway: Arc<dyn ApiGateway>,
    store: Arc<dyn PersistencePort>,
    state: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    /// Serializes login, register and stored-session verification
    auth_lock: Mutex<()>,
    /// Bumped by every teardown. Auth results started in an older epoch
    /// are dropped.
    epoch: StdMutex<u64>,
}

impl SessionManager {
    /// Creates a new `SessionManager`.
    ///
    /// The initial state is `Initializing` when a token is persisted,
    /// `Anonymous` otherwise. Nothing is verified until
    /// [`verify_stored_session`](Self::verify_stored_session) runs.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Backend API used for auth calls
    /// * `store` - Durable storage for the session entries
    pub fn new(gateway: Arc<dyn ApiGateway>, store: Arc<dyn PersistencePort>) -> Self {
        let initial = if PersistedSession::has_token(store.as_ref()) {
            SessionSnapshot::initializing()
        } else {
            SessionSnapshot::anonymous()
        };
        let (state, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            gateway,
            store,
            state,
            events,
            auth_lock: Mutex::new(()),
            epoch: StdMutex::new(0),
        }
    }

    // ============================================================================
    // Observation
    // ============================================================================

    /// Watches the session snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Receives session transitions from now on.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn current_workspace(&self) -> Option<Workspace> {
        self.state.borrow().workspace.clone()
    }

    pub fn current_workspace_id(&self) -> Option<String> {
        self.state.borrow().workspace.as_ref().map(|w| w.id.clone())
    }

    /// Headers for an authenticated request. Empty when there is no token.
    pub fn auth_headers(&self) -> AuthHeaders {
        self.state.borrow().auth_headers()
    }

    // ============================================================================
    // Authentication
    // ============================================================================

    /// Logs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without contacting the backend when either field
    /// is empty. Backend failures move the session to `Unauthenticated` and
    /// are returned with [`LOGIN_FALLBACK`] as the default message.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest::new(email, password);
        request.validate()?;

        let _guard = self.auth_lock.lock().await;
        tracing::info!("[SessionManager] Logging in as {}", request.email);
        let epoch = self.begin_authentication();

        let result = self.gateway.login(&request).await;
        self.complete_authentication(result, epoch, LOGIN_FALLBACK)
    }

    /// Registers a new account and signs in with it.
    ///
    /// Same contract as [`login`](Self::login). The workspace name is sent
    /// exactly as given.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        request.validate()?;

        let _guard = self.auth_lock.lock().await;
        tracing::info!("[SessionManager] Registering {}", request.email);
        let epoch = self.begin_authentication();

        let result = self.gateway.register(&request).await;
        self.complete_authentication(result, epoch, REGISTER_FALLBACK)
    }

    fn begin_authentication(&self) -> u64 {
        let epoch = self.lock_epoch();
        self.set_loading(true);
        *epoch
    }

    /// Applies a login or register result.
    ///
    /// The epoch stays locked until the session is written; a logout that
    /// got in first makes this a no-op.
    fn complete_authentication(
        &self,
        result: Result<AuthResponse>,
        epoch: u64,
        fallback: &str,
    ) -> Result<User> {
        let current = self.lock_epoch();
        if *current != epoch {
            tracing::info!("[SessionManager] Logged out while authenticating, dropping result");
            return Err(VersaError::busy("Sign-in was cancelled by logout"));
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("[SessionManager] Authentication failed: {}", err);
                self.fail_authentication();
                return Err(err.with_fallback(fallback));
            }
        };

        let session = PersistedSession {
            token: response.access_token,
            user: response.user,
            workspace: response.workspace,
        };
        if let Err(err) = session.save(self.store.as_ref()) {
            tracing::error!("[SessionManager] Failed to persist session: {}", err);
            self.fail_authentication();
            return Err(err);
        }

        let user = session.user.clone();
        self.state.send_replace(SessionSnapshot::authenticated(session));
        tracing::info!("[SessionManager] Authenticated as {}", user.id);
        self.emit(SessionEvent::LoggedIn);

        Ok(user)
    }

    fn fail_authentication(&self) {
        self.clear_persisted();
        self.state.send_replace(SessionSnapshot::unauthenticated());
    }

    /// Verifies the persisted session at startup.
    ///
    /// Runs only when token, user and workspace are all stored; otherwise
    /// the leftovers are cleared and the state becomes `Anonymous` without a
    /// network call. Any verification failure discards the stored session.
    /// The loading flag is cleared exactly once on every path.
    pub async fn verify_stored_session(&self) -> SessionState {
        let _guard = self.auth_lock.lock().await;

        if self.is_authenticated() {
            return SessionState::Authenticated;
        }

        let persisted = match PersistedSession::load(self.store.as_ref()) {
            Ok(Some(persisted)) => persisted,
            Ok(None) => {
                tracing::debug!("[SessionManager] No complete stored session");
                self.discard_stored_session();
                return SessionState::Anonymous;
            }
            Err(err) => {
                tracing::warn!("[SessionManager] Stored session unreadable: {}", err);
                self.discard_stored_session();
                return SessionState::Anonymous;
            }
        };

        let epoch = {
            let epoch = self.lock_epoch();
            self.state.send_replace(SessionSnapshot::initializing());
            *epoch
        };

        let headers = AuthHeaders::bearer(&persisted.token);
        let result = self.gateway.verify(&headers).await;

        let current = self.lock_epoch();
        if *current != epoch {
            tracing::info!("[SessionManager] Logged out while verifying, dropping result");
            return self.state();
        }
        match result {
            Ok(()) => {
                tracing::info!("[SessionManager] Restored session for {}", persisted.user.id);
                self.state
                    .send_replace(SessionSnapshot::authenticated(persisted));
                self.emit(SessionEvent::Restored);
                SessionState::Authenticated
            }
            Err(err) => {
                tracing::info!("[SessionManager] Stored session rejected: {}", err);
                self.discard_stored_session();
                SessionState::Anonymous
            }
        }
    }

    fn discard_stored_session(&self) {
        self.clear_persisted();
        self.state.send_replace(SessionSnapshot::anonymous());
    }

    /// Clears the persisted and in-memory session.
    ///
    /// Idempotent: when already anonymous, observers are not notified and
    /// no event is emitted.
    pub fn logout(&self) {
        if self.teardown() {
            tracing::info!("[SessionManager] Logged out");
            self.emit(SessionEvent::LoggedOut);
        }
    }

    /// Returns true if the snapshot changed.
    fn teardown(&self) -> bool {
        let mut epoch = self.lock_epoch();
        *epoch += 1;
        self.clear_persisted();
        self.state.send_if_modified(|snapshot| {
            let anonymous = SessionSnapshot::anonymous();
            if *snapshot == anonymous {
                false
            } else {
                *snapshot = anonymous;
                true
            }
        })
    }

    // ============================================================================
    // Authenticated calls
    // ============================================================================

    /// Runs an authenticated call with the current bearer headers.
    ///
    /// An `Unauthorized` result tears the session down and emits
    /// [`SessionEvent::Expired`], but only if the session still holds the
    /// token the call was made with.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without calling `call` when there is no
    /// token; otherwise whatever `call` returns.
    pub async fn authorized<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: FnOnce(AuthHeaders) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self
            .state
            .borrow()
            .token
            .clone()
            .ok_or(VersaError::NotAuthenticated)?;

        let result = call(AuthHeaders::bearer(&token)).await;

        if let Err(err) = &result {
            if err.is_unauthorized() {
                self.expire(&token);
            }
        }
        result
    }

    fn expire(&self, token: &str) {
        let still_current = self.state.borrow().token.as_deref() == Some(token);
        if !still_current {
            tracing::debug!("[SessionManager] Ignoring 401 from a previous session");
            return;
        }

        tracing::warn!("[SessionManager] Session expired, tearing down");
        if self.teardown() {
            self.emit(SessionEvent::Expired);
        }
    }

    // ============================================================================
    // User and workspace
    // ============================================================================

    /// Replaces the user wholesale, in memory and in storage.
    pub fn replace_user(&self, user: User) -> Result<()> {
        if !self.is_authenticated() {
            return Err(VersaError::NotAuthenticated);
        }

        self.store.write(USER_KEY, &serde_json::to_string(&user)?)?;
        self.state.send_modify(|snapshot| snapshot.user = Some(user));
        self.emit(SessionEvent::UserUpdated);
        Ok(())
    }

    /// Lists the workspaces the user belongs to.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        self.authorized(|auth| async move { self.gateway.list_workspaces(&auth).await })
            .await
            .map_err(|e| e.with_fallback("Failed to load workspaces"))
    }

    /// Makes another workspace the active one.
    ///
    /// The workspace is fetched first; the active workspace changes only
    /// once the backend confirms it.
    pub async fn switch_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        let workspace = self
            .authorized(|auth| async move { self.gateway.get_workspace(&auth, workspace_id).await })
            .await
            .map_err(|e| e.with_fallback("Failed to switch workspace"))?;

        let changed = self.current_workspace_id().as_deref() != Some(workspace.id.as_str());
        self.store_workspace(workspace.clone())?;

        if changed {
            tracing::info!("[SessionManager] Switched to workspace {}", workspace.id);
            self.emit(SessionEvent::WorkspaceChanged(workspace.id.clone()));
        }
        Ok(workspace)
    }

    /// Renames the active workspace.
    pub async fn rename_workspace(&self, name: &str) -> Result<Workspace> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VersaError::validation("Workspace name is required"));
        }
        let workspace_id = self
            .current_workspace_id()
            .ok_or(VersaError::NotAuthenticated)?;

        let patch = WorkspacePatch {
            name: Some(name.to_string()),
            ..WorkspacePatch::default()
        };
        let workspace = self
            .authorized(|auth| {
                let patch = &patch;
                let workspace_id = workspace_id.as_str();
                async move {
                    self.gateway
                        .update_workspace(&auth, workspace_id, patch)
                        .await
                }
            })
            .await
            .map_err(|e| e.with_fallback("Failed to update workspace"))?;

        self.store_workspace(workspace.clone())?;
        Ok(workspace)
    }

    fn store_workspace(&self, workspace: Workspace) -> Result<()> {
        self.store
            .write(WORKSPACE_KEY, &serde_json::to_string(&workspace)?)?;
        self.state
            .send_modify(|snapshot| snapshot.workspace = Some(workspace));
        Ok(())
    }

    /// Unauthenticated liveness probe.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.gateway.health().await
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|snapshot| {
            let changed = snapshot.loading != loading;
            snapshot.loading = loading;
            changed
        });
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_persisted(&self) {
        if let Err(err) = PersistedSession::clear(self.store.as_ref()) {
            tracing::error!("[SessionManager] Failed to clear stored session: {}", err);
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

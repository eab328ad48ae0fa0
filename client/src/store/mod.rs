//! The session store: single authoritative, persisted owner of
//! authentication and child-profile state.
//!
//! Every mutation flows through one of the named actions below. An action
//! calls its remote collaborator first and only commits to in-memory state
//! (and, write-behind, to durable persistence) once the collaborator has
//! succeeded, so readers never observe a torn or partially-applied session.
//! On failure the prior state is left byte-for-byte intact and the error is
//! returned as a value; nothing here panics across the action boundary.
//!
//! There is deliberately no cross-action mutual exclusion: two overlapping
//! mutations resolve last-write-wins at the commit point, and callers of the
//! profile-mutation actions are expected to debounce. The `is_loading` flag
//! guards the login-class actions only.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::biometric::BiometricAuthenticator;
use crate::credentials::CredentialCache;
use crate::error::StoreError;
use crate::gateway::AuthGateway;
use crate::models::{
    ChildProfile, ChildProfileUpdate, LoginCredentials, NewChildProfile, RegisterCredentials, User,
};
use crate::persist::SessionBacking;
use crate::validation::rules;
use crate::validation::Validate;

pub mod state;


pub use state::SessionState;

/// The session store. One instance is owned by the application root and
/// handed to the UI tree; see the module docs for the mutation contract.
pub struct SessionStore {
    gateway: Arc<dyn AuthGateway>,
    credentials: Arc<dyn CredentialCache>,
    biometric: Arc<dyn BiometricAuthenticator>,
    backing: Arc<dyn SessionBacking>,
    state: RwLock<SessionState>,
    watch_tx: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Builds a store and hydrates it from the persisted backing.
    ///
    /// An unreadable backing hydrates as a signed-out session; construction
    /// never fails.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        credentials: Arc<dyn CredentialCache>,
        biometric: Arc<dyn BiometricAuthenticator>,
        backing: Arc<dyn SessionBacking>,
    ) -> Self {
        let initial = match backing.load() {
            Ok(Some(persisted)) => SessionState::from_persisted(persisted),
            Ok(None) => SessionState::default(),
            Err(err) => {
                warn!(error = %err, "failed to hydrate session, starting signed out");
                SessionState::default()
            }
        };

        let (watch_tx, _) = watch::channel(initial.clone());
        Self {
            gateway,
            credentials,
            biometric,
            backing,
            state: RwLock::new(initial),
            watch_tx,
        }
    }

    // ----- readers -------------------------------------------------------

    /// A point-in-time copy of the full session state.
    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A receiver that yields a fresh snapshot after every commit.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.watch_tx.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_loading
    }

    pub fn current_user(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current_user
            .clone()
    }

    pub fn child_profiles(&self) -> Vec<ChildProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .child_profiles
            .clone()
    }

    pub fn active_child_profile(&self) -> Option<ChildProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active_child_profile
            .clone()
    }

    // ----- commit machinery ----------------------------------------------

    /// Applies a mutation under the write lock and broadcasts the result.
    /// The lock is never held across an await.
    fn commit(&self, mutate: impl FnOnce(&mut SessionState)) -> SessionState {
        let snapshot = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            mutate(&mut guard);
            guard.clone()
        };
        let _ = self.watch_tx.send(snapshot.clone());
        snapshot
    }

    /// Commits, then writes the durable subset behind the commit. The
    /// in-memory state is the source of truth for this process; a failed
    /// save only costs the next restart, so it is logged and swallowed.
    fn commit_and_persist(&self, mutate: impl FnOnce(&mut SessionState)) {
        let snapshot = self.commit(mutate);
        if let Err(err) = self.backing.save(&snapshot.persisted()) {
            warn!(error = %err, "failed to persist session state");
        }
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.commit(|state| state.is_loading = true);
        LoadingGuard { store: self }
    }

    // ----- auth actions --------------------------------------------------

    /// Signs in with an email/password pair.
    ///
    /// On success the authoritative payload replaces the current user and
    /// profile list wholesale and the pair is cached for biometric re-login.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), StoreError> {
        let _loading = self.begin_loading();
        self.login_inner(credentials).await
    }

    async fn login_inner(&self, credentials: &LoginCredentials) -> Result<(), StoreError> {
        let payload = self.gateway.login(credentials).await.map_err(|err| {
            info!(error = %err, "login failed");
            err
        })?;

        if let Err(err) = self.credentials.store(credentials) {
            warn!(error = %err, "failed to cache credentials for biometric login");
        }

        self.commit_and_persist(move |state| {
            state.current_user = Some(payload.user);
            state.child_profiles = payload.child_profiles;
            state.is_authenticated = true;
            reconcile_active(state);
        });
        info!("login succeeded");
        Ok(())
    }

    /// Signs in with a biometric proof.
    ///
    /// Two-phase gate: the platform prompt only unlocks the cached
    /// credential pair, which then performs the real login. Neither phase
    /// touches the network on failure, and a missing cached pair fails with
    /// [`StoreError::BiometricNotConfigured`] before the gateway is reached.
    pub async fn login_with_biometric(&self) -> Result<(), StoreError> {
        let _loading = self.begin_loading();

        self.biometric.authenticate().await?;

        let credentials = self
            .credentials
            .retrieve()?
            .ok_or(StoreError::BiometricNotConfigured)?;

        self.login_inner(&credentials).await
    }

    /// Creates a new parent account and signs it in.
    pub async fn register(&self, credentials: &RegisterCredentials) -> Result<(), StoreError> {
        credentials.validate()?;

        let _loading = self.begin_loading();
        let user = self.gateway.register(credentials).await.map_err(|err| {
            info!(error = %err, "registration failed");
            err
        })?;

        if let Err(err) = self.credentials.store(&credentials.login_credentials()) {
            warn!(error = %err, "failed to cache credentials for biometric login");
        }

        self.commit_and_persist(move |state| {
            state.current_user = Some(user);
            state.child_profiles = Vec::new();
            state.active_child_profile = None;
            state.is_authenticated = true;
        });
        info!("registration succeeded");
        Ok(())
    }

    /// Signs out.
    ///
    /// Remote invalidation is best-effort; local teardown is total. After
    /// this call the in-memory state, the durable blob, and the cached
    /// credential pair are all cleared no matter what the network did.
    pub async fn logout(&self) {
        let _loading = self.begin_loading();

        if let Err(err) = self.gateway.logout().await {
            warn!(error = %err, "remote logout failed, clearing local session anyway");
        }

        self.commit(|state| *state = SessionState::default());

        if let Err(err) = self.backing.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "failed to clear cached credentials");
        }
        info!("logged out");
    }

    // ----- child profile actions -----------------------------------------

    /// Creates a child profile under the current user.
    ///
    /// The gateway provisions the filtering configuration alongside the
    /// record and compensates its own partial failures; this store sees one
    /// aggregate outcome. On success the server-assigned profile is appended
    /// in place, preserving server return order.
    pub async fn create_child_profile(
        &self,
        draft: &NewChildProfile,
    ) -> Result<ChildProfile, StoreError> {
        let parent_id = self
            .current_user()
            .map(|user| user.id)
            .ok_or(StoreError::NotAuthenticated)?;

        draft.validate()?;
        if let Some(settings) = &draft.settings {
            rules::validate_settings(settings)
                .map_err(|e| StoreError::Validation(e.code.to_string()))?;
        }

        let profile = self.gateway.create_child_profile(&parent_id, draft).await?;

        let committed = profile.clone();
        self.commit_and_persist(move |state| {
            state.child_profiles.push(committed);
        });
        info!(child_id = %profile.id, "created child profile");
        Ok(profile)
    }

    /// Applies a partial update to an existing child profile.
    ///
    /// The patch is merged field-by-field into the stored record and, when
    /// the target is the active profile, into the active reference in the
    /// same commit so the two views never diverge.
    pub async fn update_child_profile(
        &self,
        id: &str,
        update: &ChildProfileUpdate,
    ) -> Result<(), StoreError> {
        if !self.knows_profile(id) {
            return Err(StoreError::ProfileNotFound(id.to_string()));
        }

        if let Some(name) = &update.name {
            rules::validate_child_name(name)
                .map_err(|e| StoreError::Validation(e.code.to_string()))?;
        }
        if let Some(date_of_birth) = &update.date_of_birth {
            rules::validate_birthdate(date_of_birth)
                .map_err(|e| StoreError::Validation(e.code.to_string()))?;
        }
        if let Some(settings) = &update.settings {
            rules::validate_settings(settings)
                .map_err(|e| StoreError::Validation(e.code.to_string()))?;
        }

        self.gateway.update_child_profile(id, update).await?;

        self.commit_and_persist(|state| {
            if let Some(profile) = state.child_profiles.iter_mut().find(|p| p.id == id) {
                profile.apply(update);
            }
            if let Some(active) = state.active_child_profile.as_mut() {
                if active.id == id {
                    active.apply(update);
                }
            }
        });
        info!(child_id = id, "updated child profile");
        Ok(())
    }

    /// Deletes a child profile.
    ///
    /// Removal and the active-reference cascade happen in one commit; no
    /// reader ever sees a deleted profile still active.
    pub async fn delete_child_profile(&self, id: &str) -> Result<(), StoreError> {
        if !self.knows_profile(id) {
            return Err(StoreError::ProfileNotFound(id.to_string()));
        }

        self.gateway.delete_child_profile(id).await?;

        self.commit_and_persist(|state| {
            state.child_profiles.retain(|profile| profile.id != id);
            if let Some(active) = &state.active_child_profile {
                if active.id == id {
                    state.active_child_profile = None;
                }
            }
        });
        info!(child_id = id, "deleted child profile");
        Ok(())
    }

    /// Selects the child the UI focuses on, or `None` for the all-children
    /// view. Pure local transition; an id the session does not know is
    /// ignored so the active reference always points into the profile list.
    pub fn set_active_child_profile(&self, id: Option<&str>) {
        self.commit_and_persist(|state| match id {
            None => state.active_child_profile = None,
            Some(id) => match state.child_profiles.iter().find(|p| p.id == id) {
                Some(profile) => state.active_child_profile = Some(profile.clone()),
                None => {
                    warn!(child_id = id, "ignoring unknown child profile selection");
                }
            },
        });
    }

    // ----- biometric actions ---------------------------------------------

    /// Enrolls biometric unlock for the current user.
    ///
    /// Fails when the platform capability is unavailable or enrollment is
    /// refused; it never silently succeeds without a sensor.
    pub async fn enable_biometric(&self) -> Result<(), StoreError> {
        if self.current_user().is_none() {
            return Err(StoreError::NotAuthenticated);
        }

        if !self.biometric.is_available().await {
            return Err(crate::biometric::BiometricError::Unavailable.into());
        }
        self.biometric.enroll().await?;

        self.commit_and_persist(|state| {
            if let Some(user) = state.current_user.as_mut() {
                user.biometric_enabled = true;
            }
        });
        info!("biometric unlock enabled");
        Ok(())
    }

    /// Removes biometric unlock. Key removal is best-effort; the flag is
    /// always cleared.
    pub async fn disable_biometric(&self) -> Result<(), StoreError> {
        if let Err(err) = self.biometric.remove_keys().await {
            warn!(error = %err, "failed to remove biometric keys");
        }

        self.commit_and_persist(|state| {
            if let Some(user) = state.current_user.as_mut() {
                user.biometric_enabled = false;
            }
        });
        info!("biometric unlock disabled");
        Ok(())
    }

    // ----- refresh and supplements ---------------------------------------

    /// Re-fetches the account payload and replaces local copies wholesale.
    ///
    /// This is an authoritative refresh, not a merge; it reconciles state
    /// after changes made from another device. No-op when signed out.
    pub async fn refresh_user_data(&self) -> Result<(), StoreError> {
        let Some(user) = self.current_user() else {
            return Ok(());
        };

        let payload = self.gateway.get_user_data(&user.id).await?;

        self.commit_and_persist(move |state| {
            state.current_user = Some(payload.user);
            state.child_profiles = payload.child_profiles;
            reconcile_active(state);
        });
        Ok(())
    }

    /// Checks a child's PIN against the backend. Read-only.
    pub async fn verify_child_pin(&self, child_id: &str, pin: &str) -> Result<bool, StoreError> {
        if !self.knows_profile(child_id) {
            return Err(StoreError::ProfileNotFound(child_id.to_string()));
        }
        self.gateway.verify_child_pin(child_id, pin).await
    }

    /// Starts the email-based password reset flow. No local state changes.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), StoreError> {
        self.gateway.request_password_reset(email).await
    }

    /// Completes a password reset with the emailed token. The new password
    /// is checked locally before the gateway is contacted.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), StoreError> {
        rules::validate_password(new_password)
            .map_err(|e| StoreError::Validation(e.code.to_string()))?;
        self.gateway.reset_password(token, new_password).await
    }

    fn knows_profile(&self, id: &str) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .child_profiles
            .iter()
            .any(|profile| profile.id == id)
    }
}

/// Re-points the active reference at its fresh copy in the profile list, or
/// clears it when the profile is gone.
fn reconcile_active(state: &mut SessionState) {
    if let Some(active_id) = state.active_child_profile.as_ref().map(|p| p.id.clone()) {
        state.active_child_profile = state
            .child_profiles
            .iter()
            .find(|profile| profile.id == active_id)
            .cloned();
    }
}

/// Scoped loading flag: set on entry to a login-class action, cleared on
/// every exit path, including unwinds.
struct LoadingGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.commit(|state| state.is_loading = false);
    }
}

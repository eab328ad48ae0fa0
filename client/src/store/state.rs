//! The session state shape shared with every reader.

use serde::{Deserialize, Serialize};

use crate::models::{ChildProfile, User};
use crate::persist::PersistedSession;

/// The in-memory authoritative session record.
///
/// Readers receive clones of this value; only the store's actions write it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// The signed-in parent, present iff authenticated.
    pub current_user: Option<User>,
    /// True iff `current_user` is set and the last auth action succeeded.
    pub is_authenticated: bool,
    /// True while a login-class action is in flight.
    pub is_loading: bool,
    /// Child profiles owned by the current user, in server return order.
    pub child_profiles: Vec<ChildProfile>,
    /// The child the UI is focused on, or `None` for the all-children view.
    pub active_child_profile: Option<ChildProfile>,
}

impl SessionState {
    /// The durable subset of this state.
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.current_user.clone(),
            is_authenticated: self.is_authenticated,
            child_profiles: self.child_profiles.clone(),
            active_child_profile: self.active_child_profile.clone(),
        }
    }

    /// Rebuilds session state from a persisted blob.
    ///
    /// The authenticated flag is re-derived from user presence so a mangled
    /// blob can never hydrate into a half-authenticated session, and the
    /// active reference is dropped if its profile is missing from the list.
    pub fn from_persisted(persisted: PersistedSession) -> Self {
        let is_authenticated = persisted.is_authenticated && persisted.user.is_some();
        let active_child_profile = persisted.active_child_profile.filter(|active| {
            persisted
                .child_profiles
                .iter()
                .any(|profile| profile.id == active.id)
        });
        Self {
            current_user: persisted.user,
            is_authenticated,
            is_loading: false,
            child_profiles: persisted.child_profiles,
            active_child_profile,
        }
    }

    /// Whether the structural invariants hold: the authenticated flag agrees
    /// with user presence, profile ids are unique, and the active reference
    /// points into the profile list.
    pub fn is_consistent(&self) -> bool {
        if self.is_authenticated != self.current_user.is_some() {
            return false;
        }

        let mut seen = std::collections::HashSet::new();
        for profile in &self.child_profiles {
            if !seen.insert(&profile.id) {
                return false;
            }
        }

        match &self.active_child_profile {
            None => true,
            Some(active) => self
                .child_profiles
                .iter()
                .any(|profile| profile.id == active.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeGroup, ChildSettings, SubscriptionTier};
    use chrono::NaiveDate;

    fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            phone_number: None,
            profile_image: None,
            created_at: "2025-01-02T10:00:00Z".parse().unwrap(),
            updated_at: "2025-01-02T10:00:00Z".parse().unwrap(),
            subscription: SubscriptionTier::Free,
            biometric_enabled: false,
        }
    }

    fn sample_profile(id: &str) -> ChildProfile {
        ChildProfile {
            id: id.to_string(),
            parent_id: "u1".to_string(),
            name: "Sam".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2015, 5, 20).unwrap(),
            profile_image: None,
            pin: None,
            device_token: None,
            age_group: AgeGroup::Child,
            settings: ChildSettings::default(),
            created_at: "2025-01-02T10:00:00Z".parse().unwrap(),
            updated_at: "2025-01-02T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn hydration_never_authenticates_without_a_user() {
        let state = SessionState::from_persisted(PersistedSession {
            user: None,
            is_authenticated: true,
            child_profiles: Vec::new(),
            active_child_profile: None,
        });
        assert!(!state.is_authenticated);
        assert!(state.is_consistent());
    }

    #[test]
    fn hydration_drops_dangling_active_reference() {
        let state = SessionState::from_persisted(PersistedSession {
            user: Some(sample_user()),
            is_authenticated: true,
            child_profiles: vec![sample_profile("c1")],
            active_child_profile: Some(sample_profile("c2")),
        });
        assert!(state.active_child_profile.is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn persisted_subset_excludes_loading_flag() {
        let mut state = SessionState::default();
        state.is_loading = true;
        let persisted = state.persisted();
        let rehydrated = SessionState::from_persisted(persisted);
        assert!(!rehydrated.is_loading);
    }

    #[test]
    fn duplicate_profile_ids_are_inconsistent() {
        let state = SessionState {
            current_user: Some(sample_user()),
            is_authenticated: true,
            is_loading: false,
            child_profiles: vec![sample_profile("c1"), sample_profile("c1")],
            active_child_profile: None,
        };
        assert!(!state.is_consistent());
    }
}

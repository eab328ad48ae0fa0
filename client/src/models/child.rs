//! Models for managed child profiles and their embedded settings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A managed dependent, owned by exactly one parent account.
pub struct ChildProfile {
    /// Server-assigned identifier, immutable after creation.
    pub id: String,
    /// Identifier of the owning parent account.
    pub parent_id: String,
    /// Display name of the child.
    pub name: String,
    /// Date of birth, used for age-group suggestions.
    pub date_of_birth: NaiveDate,
    /// Optional avatar image URL.
    pub profile_image: Option<String>,
    /// Optional PIN the child uses to confirm sensitive actions.
    pub pin: Option<String>,
    /// Push token of the paired child device, once enrolled.
    pub device_token: Option<String>,
    /// Age bracket driving default settings and filtering presets.
    pub age_group: AgeGroup,
    /// Per-child restrictions, always present.
    pub settings: ChildSettings,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

impl ChildProfile {
    /// Merges a partial update into this profile, field by field.
    ///
    /// Absent fields are left untouched; `settings`, being a single embedded
    /// value, is replaced as a whole when present.
    pub fn apply(&mut self, update: &ChildProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(profile_image) = &update.profile_image {
            self.profile_image = Some(profile_image.clone());
        }
        if let Some(pin) = &update.pin {
            self.pin = Some(pin.clone());
        }
        if let Some(device_token) = &update.device_token {
            self.device_token = Some(device_token.clone());
        }
        if let Some(age_group) = update.age_group {
            self.age_group = age_group;
        }
        if let Some(settings) = &update.settings {
            let mut settings = settings.clone();
            settings.dedup_lists();
            self.settings = settings;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
/// Age brackets recognized by the filtering presets.
pub enum AgeGroup {
    /// Ages 3-5.
    Preschool,
    /// Ages 6-12.
    #[default]
    Child,
    /// Ages 13-17.
    Teen,
    /// Parent-managed settings without a preset.
    Custom,
}

impl AgeGroup {
    /// Returns the canonical snake_case representation of the bracket.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Preschool => "preschool",
            AgeGroup::Child => "child",
            AgeGroup::Teen => "teen",
            AgeGroup::Custom => "custom",
        }
    }

    /// Human-readable label including the covered age range.
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Preschool => "Preschool (3-5)",
            AgeGroup::Child => "Child (6-12)",
            AgeGroup::Teen => "Teen (13-17)",
            AgeGroup::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
/// Strictness of the content filter applied to the child's traffic.
pub enum ContentFilterLevel {
    Strict,
    #[default]
    Moderate,
    Relaxed,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Per-child restriction values, embedded in the profile.
pub struct ChildSettings {
    /// Daily screen-time allowance in minutes.
    pub screen_time_limit: u32,
    /// App identifiers always permitted.
    pub allowed_apps: Vec<String>,
    /// App identifiers always blocked.
    pub blocked_apps: Vec<String>,
    /// Website hosts always blocked.
    pub blocked_websites: Vec<String>,
    /// Website hosts always permitted.
    pub allowed_websites: Vec<String>,
    /// Daily device lock time in "HH:MM" format.
    pub bedtime: String,
    /// Daily device unlock time in "HH:MM" format.
    pub wake_time: String,
    /// Content filter strictness.
    pub content_filter_level: ContentFilterLevel,
    /// Whether homework mode (distraction blocking) is active.
    pub homework_mode: bool,
    /// Whether the child device reports its location.
    pub location_tracking_enabled: bool,
    /// Whether task-based rewards are offered.
    pub task_rewards_enabled: bool,
}

impl Default for ChildSettings {
    fn default() -> Self {
        Self {
            screen_time_limit: 480,
            allowed_apps: Vec::new(),
            blocked_apps: Vec::new(),
            blocked_websites: Vec::new(),
            allowed_websites: Vec::new(),
            bedtime: "21:00".to_string(),
            wake_time: "07:00".to_string(),
            content_filter_level: ContentFilterLevel::Moderate,
            homework_mode: false,
            location_tracking_enabled: true,
            task_rewards_enabled: true,
        }
    }
}

impl ChildSettings {
    /// Removes duplicate identifiers from the allow/block lists, keeping the
    /// first occurrence of each entry.
    pub fn dedup_lists(&mut self) {
        for list in [
            &mut self.allowed_apps,
            &mut self.blocked_apps,
            &mut self.blocked_websites,
            &mut self.allowed_websites,
        ] {
            let mut seen = std::collections::HashSet::new();
            list.retain(|entry| seen.insert(entry.clone()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
/// Payload for creating a new child profile.
///
/// Identity and timestamps are server-assigned; when `settings` is absent the
/// defaults for the chosen age group are applied.
pub struct NewChildProfile {
    #[validate(custom(function = "rules::validate_child_name"))]
    pub name: String,
    #[validate(custom(function = "rules::validate_birthdate"))]
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[validate(length(min = 4, max = 8, message = "PIN must be 4-8 characters"))]
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub device_token: Option<String>,
    pub age_group: AgeGroup,
    #[serde(default)]
    pub settings: Option<ChildSettings>,
}

impl NewChildProfile {
    /// Resolves the draft settings, falling back to defaults and dropping
    /// duplicate list entries.
    pub fn resolved_settings(&self) -> ChildSettings {
        let mut settings = self.settings.clone().unwrap_or_default();
        settings.dedup_lists();
        settings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Partial update for an existing child profile. Absent fields are unchanged.
pub struct ChildProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ChildSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> ChildProfile {
        ChildProfile {
            id: "c1".to_string(),
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
    fn apply_merges_named_fields_only() {
        let mut profile = sample_profile();
        profile.apply(&ChildProfileUpdate {
            name: Some("Sammy".to_string()),
            ..Default::default()
        });

        assert_eq!(profile.name, "Sammy");
        assert_eq!(
            profile.date_of_birth,
            NaiveDate::from_ymd_opt(2015, 5, 20).unwrap()
        );
        assert_eq!(profile.settings.bedtime, "21:00");
    }

    #[test]
    fn apply_replaces_settings_as_a_whole() {
        let mut profile = sample_profile();
        let mut settings = ChildSettings::default();
        settings.screen_time_limit = 120;
        settings.blocked_apps = vec!["games".to_string(), "games".to_string()];

        profile.apply(&ChildProfileUpdate {
            settings: Some(settings),
            ..Default::default()
        });

        assert_eq!(profile.settings.screen_time_limit, 120);
        // duplicates dropped on the way in
        assert_eq!(profile.settings.blocked_apps, vec!["games".to_string()]);
    }

    #[test]
    fn default_settings_match_creation_defaults() {
        let settings = ChildSettings::default();
        assert_eq!(settings.screen_time_limit, 480);
        assert_eq!(settings.bedtime, "21:00");
        assert_eq!(settings.wake_time, "07:00");
        assert_eq!(settings.content_filter_level, ContentFilterLevel::Moderate);
        assert!(settings.location_tracking_enabled);
        assert!(settings.task_rewards_enabled);
        assert!(!settings.homework_mode);
    }

    #[test]
    fn resolved_settings_fall_back_to_defaults() {
        let draft = NewChildProfile {
            name: "Sam".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2015, 5, 20).unwrap(),
            profile_image: None,
            pin: None,
            device_token: None,
            age_group: AgeGroup::Child,
            settings: None,
        };
        assert_eq!(draft.resolved_settings(), ChildSettings::default());
    }

    #[test]
    fn age_group_serde_uses_snake_case() {
        let teen: AgeGroup = serde_json::from_str("\"teen\"").unwrap();
        assert_eq!(teen, AgeGroup::Teen);
        assert_eq!(
            serde_json::to_value(AgeGroup::Preschool).unwrap(),
            serde_json::Value::String("preschool".into())
        );
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = ChildProfileUpdate {
            name: Some("Sammy".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Sammy" }));
    }

    #[test]
    fn date_of_birth_serializes_as_iso_date() {
        let json = serde_json::to_value(sample_profile()).unwrap();
        assert_eq!(json["date_of_birth"], "2015-05-20");
    }
}

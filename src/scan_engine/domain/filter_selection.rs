use super::{License, Scope, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted form of a [`FilterSelection`]: plain `name -> selected` maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersState {
    pub severities: BTreeMap<String, bool>,
    pub licenses: BTreeMap<String, bool>,
    pub scopes: BTreeMap<String, bool>,
}

/// User-selected severities, licenses and scopes.
///
/// Every axis defaults to "all selected". License and scope names are only
/// known once a scan reports them, so persisted values for those axes are
/// parked until the name is first registered.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    severities: BTreeMap<Severity, bool>,
    licenses: BTreeMap<String, bool>,
    scopes: BTreeMap<String, bool>,
    pending: FiltersState,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterSelection {
    pub fn new() -> Self {
        Self {
            severities: Severity::ALL.iter().map(|s| (*s, true)).collect(),
            licenses: BTreeMap::new(),
            scopes: BTreeMap::new(),
            pending: FiltersState::default(),
        }
    }

    /// Rebuilds a selection from persisted state.
    ///
    /// Severity names are applied at once; unknown severity names are ignored.
    pub fn restore(state: FiltersState) -> Self {
        let mut selection = Self::new();
        for (name, selected) in &state.severities {
            if let Ok(severity) = name.parse::<Severity>() {
                selection.severities.insert(severity, *selected);
            }
        }
        selection.pending.licenses = state.licenses;
        selection.pending.scopes = state.scopes;
        selection
    }

    /// Snapshot for persisting. Parked values that never got registered are
    /// kept so they survive a session that did not see those names.
    pub fn state(&self) -> FiltersState {
        let mut licenses = self.pending.licenses.clone();
        licenses.extend(self.licenses.iter().map(|(k, v)| (k.clone(), *v)));
        let mut scopes = self.pending.scopes.clone();
        scopes.extend(self.scopes.iter().map(|(k, v)| (k.clone(), *v)));

        FiltersState {
            severities: self
                .severities
                .iter()
                .map(|(s, v)| (s.as_str().to_string(), *v))
                .collect(),
            licenses,
            scopes,
        }
    }

    pub fn register_license(&mut self, name: &str) {
        if !self.licenses.contains_key(name) {
            let selected = self.pending.licenses.remove(name).unwrap_or(true);
            self.licenses.insert(name.to_string(), selected);
        }
    }

    pub fn register_scope(&mut self, name: &str) {
        if !self.scopes.contains_key(name) {
            let selected = self.pending.scopes.remove(name).unwrap_or(true);
            self.scopes.insert(name.to_string(), selected);
        }
    }

    pub fn register_licenses<'a>(&mut self, licenses: impl IntoIterator<Item = &'a License>) {
        for license in licenses {
            self.register_license(license.name());
        }
    }

    pub fn register_scopes<'a>(&mut self, scopes: impl IntoIterator<Item = &'a Scope>) {
        for scope in scopes {
            self.register_scope(scope.name());
        }
    }

    pub fn set_severity(&mut self, severity: Severity, selected: bool) {
        self.severities.insert(severity, selected);
    }

    pub fn set_license(&mut self, name: &str, selected: bool) {
        self.licenses.insert(name.to_string(), selected);
    }

    pub fn set_scope(&mut self, name: &str, selected: bool) {
        self.scopes.insert(name.to_string(), selected);
    }

    pub fn is_severity_selected(&self, severity: Severity) -> bool {
        self.severities.get(&severity).copied().unwrap_or(true)
    }

    /// Names never registered count as selected
    pub fn is_license_selected(&self, name: &str) -> bool {
        self.licenses.get(name).copied().unwrap_or(true)
    }

    pub fn is_scope_selected(&self, name: &str) -> bool {
        self.scopes.get(name).copied().unwrap_or(true)
    }

    pub fn all_licenses_selected(&self) -> bool {
        self.licenses.values().all(|v| *v)
    }

    pub fn all_severities_selected(&self) -> bool {
        self.severities.values().all(|v| *v)
    }

    pub fn known_licenses(&self) -> impl Iterator<Item = (&str, bool)> {
        self.licenses.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn known_scopes(&self) -> impl Iterator<Item = (&str, bool)> {
        self.scopes.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selects_everything() {
        let selection = FilterSelection::new();
        for severity in Severity::ALL {
            assert!(selection.is_severity_selected(severity));
        }
        assert!(selection.is_license_selected("MIT"));
        assert!(selection.is_scope_selected("test"));
        assert!(selection.all_licenses_selected());
    }

    #[test]
    fn test_axes_are_independent() {
        let mut selection = FilterSelection::new();
        selection.set_severity(Severity::Low, false);
        selection.set_license("GPL-3.0", false);

        assert!(!selection.is_severity_selected(Severity::Low));
        assert!(selection.is_severity_selected(Severity::High));
        assert!(!selection.is_license_selected("GPL-3.0"));
        assert!(selection.is_scope_selected("compile"));
        assert!(!selection.all_licenses_selected());
    }

    #[test]
    fn test_restore_applies_only_seen_names() {
        let mut state = FiltersState::default();
        state.severities.insert("Critical".to_string(), false);
        state.severities.insert("Catastrophic".to_string(), false);
        state.licenses.insert("GPL-3.0".to_string(), false);
        state.scopes.insert("test".to_string(), false);

        let mut selection = FilterSelection::restore(state);
        assert!(!selection.is_severity_selected(Severity::Critical));
        assert!(selection.is_severity_selected(Severity::High));

        // Parked until a scan reports the name
        assert_eq!(selection.known_licenses().count(), 0);

        selection.register_license("GPL-3.0");
        selection.register_license("MIT");
        selection.register_scope("test");

        assert!(!selection.is_license_selected("GPL-3.0"));
        assert!(selection.is_license_selected("MIT"));
        assert!(!selection.is_scope_selected("test"));
    }

    #[test]
    fn test_register_does_not_override_user_choice() {
        let mut selection = FilterSelection::new();
        selection.register_license("MIT");
        selection.set_license("MIT", false);
        selection.register_license("MIT");
        assert!(!selection.is_license_selected("MIT"));
    }

    #[test]
    fn test_state_round_trip_keeps_unseen_values() {
        let mut state = FiltersState::default();
        state.licenses.insert("AGPL-3.0".to_string(), false);
        let mut selection = FilterSelection::restore(state);
        selection.register_license("MIT");
        selection.set_severity(Severity::Minimal, false);

        let saved = selection.state();
        assert_eq!(saved.licenses.get("AGPL-3.0"), Some(&false));
        assert_eq!(saved.licenses.get("MIT"), Some(&true));
        assert_eq!(saved.severities.get("Minimal"), Some(&false));
        assert_eq!(saved.severities.len(), 5);
    }

    #[test]
    fn test_filters_state_deserializes_partial_json() {
        let state: FiltersState = serde_json::from_str(r#"{"licenses":{"MIT":false}}"#).unwrap();
        assert!(state.severities.is_empty());
        assert_eq!(state.licenses.get("MIT"), Some(&false));
    }
}

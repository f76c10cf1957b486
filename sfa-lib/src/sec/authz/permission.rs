use std::collections::HashSet;

use serde::{Serialize, Deserialize};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    View,
    Create,
    Edit,
    Delete,
}

impl ActionKind {
    pub fn from_str(v: &str) -> Option<Self> {
        match v {
            "view" => Some(ActionKind::View),
            "create" => Some(ActionKind::Create),
            "edit" => Some(ActionKind::Edit),
            "delete" => Some(ActionKind::Delete),
            _ => None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::View => "view",
            ActionKind::Create => "create",
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub module: String,
    pub actions: Vec<ActionKind>,
}

impl Grant {
    pub fn allows(&self, action: &ActionKind) -> bool {
        self.actions.contains(action)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    grants: Vec<Grant>,
}

impl PermissionSet {
    pub fn new() -> Self {
        PermissionSet {
            grants: Vec::new()
        }
    }

    /// collapses duplicate modules; the first occurrence wins and later
    /// entries for the same module are dropped
    pub fn from_grants<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Grant>
    {
        let mut seen = HashSet::new();
        let mut grants = Vec::new();

        for grant in iter {
            if !seen.insert(grant.module.clone()) {
                continue;
            }

            grants.push(grant);
        }

        PermissionSet { grants }
    }

    pub fn get(&self, module: &str) -> Option<&Grant> {
        self.grants.iter().find(|grant| grant.module == module)
    }

    pub fn allows(&self, module: &str, action: &ActionKind) -> bool {
        self.get(module)
            .map(|grant| grant.allows(action))
            .unwrap_or(false)
    }

    /// every requested action must be granted for the module
    pub fn allows_all(&self, module: &str, actions: &[ActionKind]) -> bool {
        match self.get(module) {
            Some(grant) => actions.iter().all(|action| grant.allows(action)),
            None => false
        }
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn grant(module: &str, actions: Vec<ActionKind>) -> Grant {
        Grant {
            module: module.into(),
            actions
        }
    }

    #[test]
    fn action_kind_strings() {
        let pairs = vec![
            ("view", ActionKind::View),
            ("create", ActionKind::Create),
            ("edit", ActionKind::Edit),
            ("delete", ActionKind::Delete),
        ];

        for (value, expected) in pairs {
            assert_eq!(ActionKind::from_str(value), Some(expected.clone()), "parse failed for {:?}", value);
            assert_eq!(expected.as_str(), value);
        }

        assert_eq!(ActionKind::from_str("View"), None);
        assert_eq!(ActionKind::from_str("destroy"), None);
    }

    #[test]
    fn duplicate_modules_keep_first() {
        let set = PermissionSet::from_grants(vec![
            grant("products", vec![ActionKind::View]),
            grant("products", vec![ActionKind::View, ActionKind::Edit, ActionKind::Delete]),
        ]);

        assert_eq!(set.len(), 1);
        assert!(set.allows("products", &ActionKind::View));
        assert!(!set.allows("products", &ActionKind::Edit), "later duplicate must not contribute actions");
        assert!(!set.allows("products", &ActionKind::Delete), "later duplicate must not contribute actions");
    }

    #[test]
    fn allows_all_requires_every_action() {
        let set = PermissionSet::from_grants(vec![
            grant("products", vec![ActionKind::View]),
        ]);

        assert!(set.allows_all("products", &[ActionKind::View]));
        assert!(!set.allows_all("products", &[ActionKind::View, ActionKind::Edit]));
    }

    #[test]
    fn unknown_module_denies() {
        let set = PermissionSet::from_grants(vec![
            grant("products", vec![ActionKind::View]),
        ]);

        assert!(!set.allows("orders", &ActionKind::View));
        assert!(!set.allows_all("orders", &[ActionKind::View]));
    }
}

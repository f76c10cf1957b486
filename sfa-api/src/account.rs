use std::collections::HashSet;

use serde::{Serialize, Deserialize};

use sfa_lib::sec::authz::permission::{ActionKind, Grant};
use sfa_lib::validation::module_name_valid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub name: String,

    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,
}

impl Account {
    /// tolerant conversion of the wire list; entries with unusable module
    /// names and unknown action strings are dropped, duplicates are kept in
    /// order and collapsed later by `PermissionSet`
    pub fn grants(&self) -> Vec<Grant> {
        let mut seen = HashSet::new();
        let mut rtn = Vec::with_capacity(self.permissions.len());

        for entry in &self.permissions {
            if !module_name_valid(&entry.name) {
                tracing::debug!("dropping grant with unusable module name {:?}", entry.name);
                continue;
            }

            if !seen.insert(entry.name.as_str()) {
                tracing::debug!("duplicate grant for module {:?}; the first entry wins", entry.name);
            }

            let mut actions = Vec::with_capacity(entry.actions.len());

            for value in &entry.actions {
                match ActionKind::from_str(value) {
                    Some(action) => actions.push(action),
                    None => tracing::debug!("unknown action {:?} for module {:?}", value, entry.name)
                }
            }

            rtn.push(Grant {
                module: entry.name.clone(),
                actions
            });
        }

        rtn
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_shape() {
        let account: Account = serde_json::from_str(
            r#"{"permissions":[{"name":"products","actions":["view","edit"]},{"name":"orders"}]}"#
        ).unwrap();

        assert_eq!(account.permissions.len(), 2);
        assert_eq!(account.permissions[0].name, "products");
        assert!(account.permissions[1].actions.is_empty(), "missing actions default to empty");
    }

    #[test]
    fn grants_drop_unusable_entries() {
        let account = Account {
            permissions: vec![
                PermissionEntry {
                    name: String::from("products"),
                    actions: vec![String::from("view"), String::from("publish")]
                },
                PermissionEntry {
                    name: String::new(),
                    actions: vec![String::from("view")]
                },
            ]
        };

        let grants = account.grants();

        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].module, "products");
        assert_eq!(grants[0].actions, vec![ActionKind::View], "unknown actions are dropped");
    }

    #[test]
    fn grants_keep_duplicates_in_order() {
        let account = Account {
            permissions: vec![
                PermissionEntry {
                    name: String::from("products"),
                    actions: vec![String::from("view")]
                },
                PermissionEntry {
                    name: String::from("products"),
                    actions: vec![String::from("delete")]
                },
            ]
        };

        let grants = account.grants();

        assert_eq!(grants.len(), 2, "collapsing happens in PermissionSet, not here");
        assert_eq!(grants[0].actions, vec![ActionKind::View]);
    }
}

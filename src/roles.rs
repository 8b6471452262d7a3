// 🔍 Column Role Resolver
// Maps loosely-named headers onto the three semantic roles downstream code reads.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    AccountName,
    Classification,
    Value,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::AccountName, Role::Classification, Role::Value];

    /// Accepted header synonyms, highest priority first (lowercase)
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Role::AccountName => &[
                "akun",
                "nama akun",
                "nama_akun",
                "account",
                "account name",
                "account_name",
            ],
            Role::Classification => &[
                "jenis akun",
                "jenis_akun",
                "klasifikasi",
                "kategori",
                "account type",
                "type",
                "classification",
                "category",
            ],
            Role::Value => &["nilai", "amount", "value", "nominal"],
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Role::AccountName => "Account Name",
            Role::Classification => "Account Classification",
            Role::Value => "Monetary Value",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Header a role was resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub header: String,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub account_name: Option<ResolvedColumn>,
    pub classification: Option<ResolvedColumn>,
    pub value: Option<ResolvedColumn>,
}

impl RoleMapping {
    /// Resolve every role against a header set. Exact, case-insensitive; no fuzzy matching.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();

        let mut mapping = RoleMapping::default();
        for role in Role::ALL {
            let resolved = role.synonyms().iter().find_map(|synonym| {
                lowered.iter().position(|h| h == synonym).map(|index| ResolvedColumn {
                    header: headers[index].as_ref().to_string(),
                    index,
                })
            });
            debug!(%role, header = ?resolved.as_ref().map(|c| c.header.as_str()), "role resolution");
            *mapping.slot_mut(role) = resolved;
        }

        mapping
    }

    pub fn get(&self, role: Role) -> Option<&ResolvedColumn> {
        match role {
            Role::AccountName => self.account_name.as_ref(),
            Role::Classification => self.classification.as_ref(),
            Role::Value => self.value.as_ref(),
        }
    }

    pub fn has(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    /// Roles that matched no header
    pub fn unresolved(&self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| !self.has(*r)).collect()
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<ResolvedColumn> {
        match role {
            Role::AccountName => &mut self.account_name,
            Role::Classification => &mut self.classification,
            Role::Value => &mut self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indonesian_headers() {
        let mapping = RoleMapping::resolve(&["Akun", "Jenis Akun", "Nilai"]);

        assert_eq!(mapping.account_name.unwrap().index, 0);
        assert_eq!(mapping.classification.unwrap().header, "Jenis Akun");
        assert_eq!(mapping.value.unwrap().index, 2);
    }

    #[test]
    fn test_value_role_is_case_insensitive() {
        for header in ["NILAI", "Nilai", "nilai"] {
            let mapping = RoleMapping::resolve(&[header]);
            let value = mapping.value.expect("value role");
            assert_eq!(value.header, header);
            assert_eq!(value.index, 0);
        }
    }

    #[test]
    fn test_english_synonyms() {
        let mapping = RoleMapping::resolve(&["Account", "Type", "Amount"]);

        assert_eq!(mapping.account_name.unwrap().header, "Account");
        assert_eq!(mapping.classification.unwrap().header, "Type");
        assert_eq!(mapping.value.unwrap().header, "Amount");
    }

    #[test]
    fn test_synonym_priority_not_column_order() {
        // "nilai" outranks "amount" even though "Amount" comes first
        let mapping = RoleMapping::resolve(&["Amount", "Akun", "Nilai"]);
        assert_eq!(mapping.value.unwrap().header, "Nilai");
    }

    #[test]
    fn test_leftmost_header_wins_on_duplicates() {
        let mapping = RoleMapping::resolve(&["nilai", "NILAI"]);
        assert_eq!(mapping.value.unwrap().index, 0);
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let mapping = RoleMapping::resolve(&["Nama Akun Lengkap", "Nilai (Rp)", "Jenis"]);

        assert!(mapping.account_name.is_none());
        assert!(mapping.value.is_none());
        assert!(mapping.classification.is_none());
        assert_eq!(mapping.unresolved(), Role::ALL.to_vec());
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let mapping = RoleMapping::resolve(&["  Jenis_Akun "]);
        assert!(mapping.has(Role::Classification));
    }
}

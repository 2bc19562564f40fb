//! Role inference from permission-record text.
//!
//! This is a heuristic: permission records were never designed to carry role
//! semantics, so a page called "Administración Académica" will make its holder
//! look like an admin. Prefer asserted roles (see
//! [`crate::context::SessionContext::with_asserted_roles`]) when the backend
//! provides them.

use serde::Serialize;
use tracing::{debug, trace};

use campus_core::{PageId, fold_key};

use crate::config::RoleKeywords;
use crate::permissions::PermissionRecord;
use crate::roles::{Role, RoleSet};

/// Which record and keyword made a role appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleEvidence {
    pub role: Role,
    pub page_id: PageId,
    pub keyword: String,
}

/// Keyword-table classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInferencer {
    // Folded keywords per role, in `Role::ALL` order.
    tables: Vec<(Role, Vec<String>)>,
}

impl Default for RoleInferencer {
    fn default() -> Self {
        Self::new(&RoleKeywords::default())
    }
}

impl RoleInferencer {
    pub fn new(keywords: &RoleKeywords) -> Self {
        let tables = Role::ALL
            .into_iter()
            .map(|role| {
                let words = keywords
                    .for_role(role)
                    .iter()
                    .map(|k| fold_key(k))
                    .filter(|k| !k.is_empty())
                    .collect();
                (role, words)
            })
            .collect();
        Self { tables }
    }

    /// Roles whose keyword tables match at least one record.
    pub fn classify(&self, records: &[PermissionRecord]) -> RoleSet {
        let roles: RoleSet = self.evidence(records).map(|e| e.role).collect();
        debug!(records = records.len(), roles = %roles, "roles inferred");
        roles
    }

    /// Every (role, record, keyword) match, for diagnosing mis-classification.
    pub fn explain(&self, records: &[PermissionRecord]) -> Vec<RoleEvidence> {
        self.evidence(records).collect()
    }

    fn evidence<'a>(
        &'a self,
        records: &'a [PermissionRecord],
    ) -> impl Iterator<Item = RoleEvidence> + 'a {
        records.iter().flat_map(move |record| {
            let route = fold_key(&record.page_route);
            let name = fold_key(&record.page_name);
            self.tables
                .iter()
                .filter_map(move |(role, words)| {
                    let keyword = words
                        .iter()
                        .find(|k| route.contains(k.as_str()) || name.contains(k.as_str()))?;
                    trace!(role = %role, page_id = %record.page_id, keyword = %keyword, "role keyword matched");
                    Some(RoleEvidence {
                        role: *role,
                        page_id: record.page_id.clone(),
                        keyword: keyword.clone(),
                    })
                })
                .collect::<Vec<_>>()
        })
    }
}

/// Classify with the default keyword tables.
pub fn classify(records: &[PermissionRecord]) -> RoleSet {
    RoleInferencer::default().classify(records)
}

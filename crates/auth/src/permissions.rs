//! Permission catalog: raw per-page permission records and the capability
//! index derived from them.
//!
//! Matching is fuzzy on purpose: a fragment matches a record when its folded
//! form is a substring of the record's route or display name. That mirrors how
//! screens ask for permissions ("/periodos", "calificacion") but it also means
//! unrelated pages sharing a word can match each other. Backends that issue
//! explicit grant tags avoid the problem for named capabilities.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use campus_core::{PageId, ValueObject, contains_folded, fold_key};

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// One of the four actions a permission record can allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four action flags of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionFlags {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl ActionFlags {
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.view,
            Action::Create => self.create,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
        }
    }

    pub fn any(&self) -> bool {
        self.view || self.create || self.edit || self.delete
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A per-page permission record as issued by the user-profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub page_id: PageId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_route: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_view: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_create: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_edit: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_delete: bool,
    /// Explicit capability tags (e.g. `edit_grades`). Older payloads omit it.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<String>,
}

/// Missing and `null` fields both decode as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PermissionRecord {
    /// Record for a page with no actions enabled yet.
    pub fn new(
        page_id: impl Into<PageId>,
        page_name: impl Into<String>,
        page_route: impl Into<String>,
    ) -> Self {
        Self {
            page_id: page_id.into(),
            page_name: page_name.into(),
            page_route: page_route.into(),
            can_view: false,
            can_create: false,
            can_edit: false,
            can_delete: false,
            grants: Vec::new(),
        }
    }

    pub fn allow(mut self, action: Action) -> Self {
        match action {
            Action::View => self.can_view = true,
            Action::Create => self.can_create = true,
            Action::Edit => self.can_edit = true,
            Action::Delete => self.can_delete = true,
        }
        self
    }

    pub fn allow_all(self) -> Self {
        Action::ALL.into_iter().fold(self, PermissionRecord::allow)
    }

    pub fn grant(mut self, tag: impl Into<String>) -> Self {
        self.grants.push(tag.into());
        self
    }

    pub fn flags(&self) -> ActionFlags {
        ActionFlags {
            view: self.can_view,
            create: self.can_create,
            edit: self.can_edit,
            delete: self.can_delete,
        }
    }
}

/// Decode a raw permission payload.
///
/// Anything other than a JSON array decodes as an empty list; elements that
/// fail to decode are skipped. Neither case is an error for the caller.
pub fn records_from_value(value: &serde_json::Value) -> Vec<PermissionRecord> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!(kind = json_kind(value), "permission payload is not an array; using empty snapshot");
        }
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            match PermissionRecord::deserialize(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(position, error = %err, "skipping malformed permission record");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capability set
// ─────────────────────────────────────────────────────────────────────────────

/// One normalized record: folded route/name keys plus its action flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityEntry {
    page_id: PageId,
    route_key: String,
    name_key: String,
    flags: ActionFlags,
}

impl CapabilityEntry {
    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    pub fn flags(&self) -> ActionFlags {
        self.flags
    }

    /// True iff `fragment` (folded) is a substring of the route or name key.
    pub fn matches(&self, fragment: &str) -> bool {
        contains_folded(&self.route_key, fragment) || contains_folded(&self.name_key, fragment)
    }
}

/// Queryable capability index for one permission snapshot.
///
/// Built once per snapshot by [`normalize`] and never mutated afterwards; a
/// permission refresh produces a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: Vec<CapabilityEntry>,
    grants: BTreeSet<String>,
}

impl ValueObject for CapabilitySet {}

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.grants.is_empty()
    }

    pub fn entries(&self) -> &[CapabilityEntry] {
        &self.entries
    }

    /// Explicit grant tags, folded and sorted.
    pub fn grant_tags(&self) -> impl Iterator<Item = &str> {
        self.grants.iter().map(String::as_str)
    }

    /// Add explicit grant tags on top of the record-derived entries.
    pub fn with_grants<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.grants.extend(
            tags.into_iter()
                .map(|t| fold_key(t.as_ref()))
                .filter(|t| !t.is_empty()),
        );
        self
    }

    /// True iff some record matching `fragment` allows `action`.
    pub fn allows(&self, fragment: &str, action: Action) -> bool {
        self.entries
            .iter()
            .any(|e| e.flags.allows(action) && e.matches(fragment))
    }

    /// True iff the named capability is held: either issued as an explicit
    /// grant tag, or matched as a fragment by a record with any action enabled.
    pub fn grants(&self, capability: &str) -> bool {
        let key = fold_key(capability);
        if key.is_empty() {
            return false;
        }
        self.grants.contains(&key)
            || self
                .entries
                .iter()
                .any(|e| e.flags.any() && e.matches(capability))
    }

    /// True iff any of the named capabilities is held.
    pub fn grants_any<'a, I>(&self, capabilities: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        capabilities.into_iter().any(|c| self.grants(c))
    }
}

/// Build the capability index for a permission snapshot.
pub fn normalize(records: &[PermissionRecord]) -> CapabilitySet {
    let entries: Vec<CapabilityEntry> = records
        .iter()
        .map(|r| CapabilityEntry {
            page_id: r.page_id.clone(),
            route_key: fold_key(&r.page_route),
            name_key: fold_key(&r.page_name),
            flags: r.flags(),
        })
        .collect();

    let set = CapabilitySet {
        entries,
        grants: BTreeSet::new(),
    }
    .with_grants(records.iter().flat_map(|r| r.grants.iter()));

    debug!(
        records = records.len(),
        grant_tags = set.grants.len(),
        "capability set built"
    );
    set
}

/// Build the capability index straight from a raw JSON payload.
pub fn normalize_value(value: &serde_json::Value) -> CapabilitySet {
    normalize(&records_from_value(value))
}

/// Capability check used by screens and the menu.
pub fn has_capability(set: &CapabilitySet, fragment: &str, action: Action) -> bool {
    set.allows(fragment, action)
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use folio_core::{AppError, JournalId};
use serde::{Deserialize, Serialize};

/// Legacy context id that marks a user group as site-wide.
pub const LEGACY_SITE_CONTEXT_ID: i64 = 0;

/// Symbolic role names used by the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RolePath {
    /// Site administrator.
    #[serde(rename = "admin")]
    Admin,
    /// Journal manager.
    #[serde(rename = "manager")]
    Manager,
    /// Journal editor. Shares the manager role id in the legacy model.
    #[serde(rename = "editor")]
    Editor,
    /// Section editor.
    #[serde(rename = "section_editor")]
    SectionEditor,
    /// Guest editor. Shares the section editor role id in the legacy model.
    #[serde(rename = "guest_editor")]
    GuestEditor,
    /// Reviewer.
    #[serde(rename = "reviewer")]
    Reviewer,
    /// Author.
    #[serde(rename = "author")]
    Author,
    /// Reader.
    #[serde(rename = "reader")]
    Reader,
    /// Copyeditor.
    #[serde(rename = "copyeditor")]
    Copyeditor,
    /// Proofreader.
    #[serde(rename = "proofreader")]
    Proofreader,
    /// Layout editor.
    #[serde(rename = "layout-editor")]
    LayoutEditor,
    /// Subscription manager.
    #[serde(rename = "subscription-manager")]
    SubscriptionManager,
}

impl RolePath {
    /// Returns the stable storage value for this role path.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Editor => "editor",
            Self::SectionEditor => "section_editor",
            Self::GuestEditor => "guest_editor",
            Self::Reviewer => "reviewer",
            Self::Author => "author",
            Self::Reader => "reader",
            Self::Copyeditor => "copyeditor",
            Self::Proofreader => "proofreader",
            Self::LayoutEditor => "layout-editor",
            Self::SubscriptionManager => "subscription-manager",
        }
    }

    /// Returns the legacy numeric role id this path is stored under.
    #[must_use]
    pub fn legacy_role_id(&self) -> LegacyRoleId {
        match self {
            Self::Admin => LegacyRoleId::SITE_ADMIN,
            Self::Manager | Self::Editor => LegacyRoleId::MANAGER,
            Self::SectionEditor | Self::GuestEditor => LegacyRoleId::SUB_EDITOR,
            Self::Reviewer => LegacyRoleId::REVIEWER,
            Self::Copyeditor | Self::Proofreader | Self::LayoutEditor => LegacyRoleId::ASSISTANT,
            Self::Author => LegacyRoleId::AUTHOR,
            Self::Reader => LegacyRoleId::READER,
            Self::SubscriptionManager => LegacyRoleId::SUBSCRIPTION_MANAGER,
        }
    }

    /// Returns all known role paths.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RolePath] = &[
            RolePath::Admin,
            RolePath::Manager,
            RolePath::Editor,
            RolePath::SectionEditor,
            RolePath::GuestEditor,
            RolePath::Reviewer,
            RolePath::Author,
            RolePath::Reader,
            RolePath::Copyeditor,
            RolePath::Proofreader,
            RolePath::LayoutEditor,
            RolePath::SubscriptionManager,
        ];

        ALL
    }

    /// Roles that get a default user group when a journal is created.
    #[must_use]
    pub fn journal_defaults() -> &'static [Self] {
        const DEFAULTS: &[RolePath] = &[
            RolePath::Manager,
            RolePath::SectionEditor,
            RolePath::Reviewer,
            RolePath::Author,
            RolePath::Reader,
            RolePath::Copyeditor,
            RolePath::SubscriptionManager,
        ];

        DEFAULTS
    }

    /// Roles allowed to run the editorial workflow of a journal.
    #[must_use]
    pub fn editorial() -> &'static [Self] {
        const EDITORIAL: &[RolePath] = &[
            RolePath::Manager,
            RolePath::Editor,
            RolePath::SectionEditor,
            RolePath::GuestEditor,
        ];

        EDITORIAL
    }

    /// Parses a transport value into a role path.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl Display for RolePath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RolePath {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown role path '{value}'")))
    }
}

/// Numeric role id of the legacy group-membership model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LegacyRoleId(i64);

impl LegacyRoleId {
    /// Site administrator.
    pub const SITE_ADMIN: Self = Self(1);
    /// Journal manager and editor.
    pub const MANAGER: Self = Self(16);
    /// Section editor and guest editor.
    pub const SUB_EDITOR: Self = Self(17);
    /// Reviewer.
    pub const REVIEWER: Self = Self(4096);
    /// Copyeditor, proofreader and layout editor.
    pub const ASSISTANT: Self = Self(4097);
    /// Author.
    pub const AUTHOR: Self = Self(65536);
    /// Reader.
    pub const READER: Self = Self(1_048_576);
    /// Subscription manager.
    pub const SUBSCRIPTION_MANAGER: Self = Self(2_097_152);

    /// Wraps a stored role id without checking it against the known constants.
    #[must_use]
    pub fn from_stored(value: i64) -> Self {
        Self(value)
    }

    /// Returns the stored numeric value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for LegacyRoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Maps requested role paths to legacy role ids.
///
/// Paths without a mapping are dropped. The result is sorted and free of duplicates.
#[must_use]
pub fn legacy_role_ids_for_paths<S: AsRef<str>>(role_paths: &[S]) -> Vec<LegacyRoleId> {
    let mut role_ids: Vec<LegacyRoleId> = role_paths
        .iter()
        .filter_map(|value| RolePath::from_str(value.as_ref()).ok())
        .map(|role| role.legacy_role_id())
        .collect();
    role_ids.sort();
    role_ids.dedup();
    role_ids
}

/// Scope a role grant or user group applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleContext {
    /// Site-wide scope.
    Site,
    /// Scoped to one journal.
    Journal(JournalId),
}

impl RoleContext {
    /// Builds a context from a flat-table column value, where `NULL` means site-wide.
    pub fn from_flat(context_id: Option<i64>) -> Result<Self, AppError> {
        match context_id {
            None => Ok(Self::Site),
            Some(value) => JournalId::new(value).map(Self::Journal),
        }
    }

    /// Builds a context from a legacy column value, where `0` and `NULL` mean site-wide.
    pub fn from_legacy(context_id: Option<i64>) -> Result<Self, AppError> {
        match context_id {
            None | Some(LEGACY_SITE_CONTEXT_ID) => Ok(Self::Site),
            Some(value) => JournalId::new(value).map(Self::Journal),
        }
    }

    /// Returns the flat-table context column value.
    #[must_use]
    pub fn flat_context_id(&self) -> Option<i64> {
        match self {
            Self::Site => None,
            Self::Journal(journal_id) => Some(journal_id.as_i64()),
        }
    }

    /// Returns the context id written to legacy user groups.
    #[must_use]
    pub fn legacy_context_id(&self) -> i64 {
        match self {
            Self::Site => LEGACY_SITE_CONTEXT_ID,
            Self::Journal(journal_id) => journal_id.as_i64(),
        }
    }

    /// Returns the journal for journal-scoped contexts.
    #[must_use]
    pub fn journal_id(&self) -> Option<JournalId> {
        match self {
            Self::Site => None,
            Self::Journal(journal_id) => Some(*journal_id),
        }
    }
}

impl Display for RoleContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Site => formatter.write_str("site"),
            Self::Journal(journal_id) => write!(formatter, "journal {journal_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use folio_core::JournalId;
    use proptest::prelude::*;

    use super::{LegacyRoleId, RoleContext, RolePath, legacy_role_ids_for_paths};

    #[test]
    fn shared_role_ids_match_legacy_constants() {
        assert_eq!(RolePath::Editor.legacy_role_id(), LegacyRoleId::MANAGER);
        assert_eq!(RolePath::Manager.legacy_role_id().as_i64(), 16);
        assert_eq!(RolePath::GuestEditor.legacy_role_id().as_i64(), 17);
        assert_eq!(RolePath::LayoutEditor.legacy_role_id().as_i64(), 4097);
        assert_eq!(RolePath::Proofreader.legacy_role_id().as_i64(), 4097);
        assert_eq!(RolePath::SubscriptionManager.legacy_role_id().as_i64(), 2_097_152);
    }

    #[test]
    fn unknown_role_path_is_rejected() {
        assert!(RolePath::from_str("layout_editor").is_err());
        assert!(RolePath::from_str("Admin").is_err());
    }

    #[test]
    fn unmapped_paths_are_dropped() {
        let role_ids = legacy_role_ids_for_paths(&["manager", "janitor", "editor"]);
        assert_eq!(role_ids, vec![LegacyRoleId::MANAGER]);
        assert!(legacy_role_ids_for_paths(&["janitor"]).is_empty());
    }

    #[test]
    fn legacy_zero_context_is_site() {
        assert_eq!(RoleContext::from_legacy(Some(0)).ok(), Some(RoleContext::Site));
        assert_eq!(RoleContext::from_legacy(None).ok(), Some(RoleContext::Site));
        assert!(RoleContext::from_flat(Some(0)).is_err());
        assert_eq!(RoleContext::Site.legacy_context_id(), 0);
        assert_eq!(RoleContext::Site.flat_context_id(), None);
    }

    #[test]
    fn journal_defaults_have_distinct_legacy_ids() {
        let role_ids: BTreeSet<_> = RolePath::journal_defaults()
            .iter()
            .map(RolePath::legacy_role_id)
            .collect();
        assert_eq!(role_ids.len(), RolePath::journal_defaults().len());
    }

    proptest! {
        #[test]
        fn every_role_path_roundtrips_through_storage(index in 0usize..12) {
            let role = RolePath::all()[index];
            prop_assert_eq!(RolePath::from_str(role.as_str()).ok(), Some(role));
        }

        #[test]
        fn mapped_ids_are_subset_of_known_roles(paths in proptest::collection::vec("[a-z_-]{1,12}", 0..8)) {
            let known: BTreeSet<_> = RolePath::all().iter().map(RolePath::legacy_role_id).collect();
            for role_id in legacy_role_ids_for_paths(&paths) {
                prop_assert!(known.contains(&role_id));
            }
        }

        #[test]
        fn journal_context_roundtrips_in_both_stores(value in 1i64..1_000_000) {
            let context = RoleContext::Journal(JournalId::new(value).unwrap_or_else(|_| unreachable!()));
            prop_assert_eq!(RoleContext::from_flat(context.flat_context_id()).ok(), Some(context));
            prop_assert_eq!(RoleContext::from_legacy(Some(context.legacy_context_id())).ok(), Some(context));
        }
    }
}

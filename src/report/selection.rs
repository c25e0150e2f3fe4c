//! Static group selection.
//!
//! Selection happens entirely before any snapshot work: unknown names
//! in only/enable are configuration errors and abort the run, while
//! unknown names in skip only warn (skipping something that does not
//! exist is harmless).

use crate::report::group::GroupSpec;

/// External selection input, constructed by CLI/config parsing. The
/// core consumes exactly these four fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Restrict the universe to these groups when non-empty.
    pub only: Vec<String>,
    /// Remove these groups. Skip wins over only naming the same group.
    pub skip: Vec<String>,
    /// Opt in experimental or default-disabled groups by name.
    pub enable: Vec<String>,
    /// Allow all experimental groups without naming them.
    pub experimental: bool,
}

/// Fatal selection error, raised before the snapshot is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("unknown group '{name}' in --{flag} (known groups: {known})")]
    UnknownGroup {
        flag: &'static str,
        name: String,
        known: String,
    },
}

fn known_names(groups: &[GroupSpec]) -> String {
    groups
        .iter()
        .map(|g| g.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate(
    names: &[String],
    flag: &'static str,
    groups: &[GroupSpec],
) -> Result<(), SelectionError> {
    for name in names {
        if !groups.iter().any(|g| g.name == name) {
            return Err(SelectionError::UnknownGroup {
                flag,
                name: name.clone(),
                known: known_names(groups),
            });
        }
    }
    Ok(())
}

/// Apply the selection policy to the declared groups, preserving
/// declaration order. Precedence, in order:
///
/// 1. a non-empty only-list restricts the universe;
/// 2. skip-list removal (skip wins over only);
/// 3. experimental groups stay out unless enabled by name or globally;
/// 4. default-disabled groups stay out unless named in enable or only.
pub fn resolve<'a>(
    groups: &'a [GroupSpec],
    policy: &SelectionPolicy,
) -> Result<Vec<&'a GroupSpec>, SelectionError> {
    validate(&policy.only, "only", groups)?;
    validate(&policy.enable, "enable", groups)?;
    for name in &policy.skip {
        if !groups.iter().any(|g| g.name == name) {
            tracing::warn!(group = %name, "unknown group in skip list, ignoring");
        }
    }

    let named = |list: &[String], g: &GroupSpec| list.iter().any(|n| n == g.name);

    let mut selected = Vec::new();
    for group in groups {
        if !policy.only.is_empty() && !named(&policy.only, group) {
            continue;
        }
        if named(&policy.skip, group) {
            tracing::debug!(group = %group.name, "skipped by policy");
            continue;
        }
        if group.experimental
            && !policy.experimental
            && !named(&policy.enable, group)
        {
            continue;
        }
        if !group.default_enabled && !named(&policy.enable, group) && !named(&policy.only, group) {
            continue;
        }
        selected.push(group);
    }
    Ok(selected)
}

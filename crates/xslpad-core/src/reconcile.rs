use std::borrow::Cow;

use tracing::trace;

use crate::params::ParameterEntry;
use crate::scope::extract_global_names;

/// Brings a parameter list back in line with the global parameters
/// declared in `text`.
///
/// `text` is normally the annotated editor buffer, so names that are only
/// tracked through the marker block stay present. Every global name
/// without an entry gets a new closed, empty-valued entry at the end.
/// Existing entries survive when their name is still declared or when they
/// carry a value. Entries without a name are always kept, even with an
/// empty value: they are rows the user has added but not named yet.
/// Order is preserved.
///
/// Returns the input borrowed when nothing was added or removed.
pub fn reconcile<'a>(text: &str, current: &'a [ParameterEntry]) -> Cow<'a, [ParameterEntry]> {
    let names = extract_global_names(text);

    let additions: Vec<&String> = names
        .iter()
        .filter(|name| !current.iter().any(|entry| &entry.name == *name))
        .collect();
    let keep = |entry: &ParameterEntry| {
        !entry.is_named() || !entry.value.is_empty() || names.contains(&entry.name)
    };
    let removals = current.iter().filter(|entry| !keep(*entry)).count();

    if additions.is_empty() && removals == 0 {
        return Cow::Borrowed(current);
    }
    trace!(
        added = additions.len(),
        removed = removals,
        "reconciled parameter list"
    );

    let mut next: Vec<ParameterEntry> = current
        .iter()
        .filter(|entry| keep(*entry))
        .cloned()
        .collect();
    next.extend(
        additions
            .into_iter()
            .map(|name| ParameterEntry::discovered(name.as_str())),
    );
    Cow::Owned(next)
}

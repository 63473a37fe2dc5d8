//! Command-name uniqueness within one device profile.

use std::collections::HashMap;

use metacat_domain::command::Command;
use metacat_domain::error::ValidationError;

/// Check that no name occurs twice among `existing` plus `proposed`.
///
/// Used both for a full command list (`proposed = None`) and for
/// introducing a single name into an existing list.
///
/// # Errors
///
/// Returns [`ValidationError::DuplicateCommandName`] naming the first
/// repeated name.
pub fn validate(existing: &[Command], proposed: Option<&str>) -> Result<(), ValidationError> {
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(existing.len() + 1);
    let names = existing
        .iter()
        .map(|command| command.name.as_str())
        .chain(proposed);
    for name in names {
        let count = counts.entry(name).or_default();
        *count += 1;
        if *count > 1 {
            return Err(ValidationError::DuplicateCommandName(name.to_owned()));
        }
    }
    Ok(())
}

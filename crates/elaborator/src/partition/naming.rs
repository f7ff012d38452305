use crate::notice::Notices;
use model::core::identifiers::truncate_identifier;

/// Prefix for names generated from `name`, clipped to `budget` bytes.
pub fn name_prefix(name: &str, budget: usize) -> &str {
    truncate_identifier(name, budget)
}

/// Like [`name_prefix`], raising a notice when the prefix had to be clipped.
pub fn announced_prefix<'a>(name: &'a str, budget: usize, notices: &mut Notices) -> &'a str {
    let prefix = name_prefix(name, budget);
    if prefix.len() < name.len() {
        notices.push(format!(
            "Partition name's prefix \"{name}\" will be truncated to \"{prefix}\""
        ));
    }
    prefix
}

/// `<prefix>_<n>`
pub fn numbered(prefix: &str, n: usize) -> String {
    format!("{prefix}_{n}")
}

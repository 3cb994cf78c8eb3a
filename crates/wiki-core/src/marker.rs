//! Title markers
//!
//! Page state that must survive between runs is carried in the page title as
//! a literal prefix. Comparisons are byte-exact.

/// Placeholder created during conversion, completed or removed by the next run
pub const TEMPORARY: &str = "[Temp]";

/// Page whose source disappeared; never matched, never deleted
pub const DEPRECATED: &str = "[Deprecated]";

/// Page exempt from deprecation
pub const PROTECTED: &str = "[Protected]";

pub fn is_temporary(title: &str) -> bool {
    title.starts_with(TEMPORARY)
}

pub fn is_deprecated(title: &str) -> bool {
    title.starts_with(DEPRECATED)
}

pub fn is_protected(title: &str) -> bool {
    title.starts_with(PROTECTED)
}

/// Whether the deprecation pass must leave the page alone
pub fn is_exempt_from_deprecation(title: &str) -> bool {
    is_deprecated(title) || is_protected(title)
}

pub fn temporary(title: &str) -> String {
    format!("{TEMPORARY}{title}")
}

pub fn deprecated(title: &str) -> String {
    format!("{DEPRECATED}{title}")
}

/// `title` without a leading temporary marker
pub fn strip_temporary(title: &str) -> &str {
    title.strip_prefix(TEMPORARY).unwrap_or(title)
}

// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform path-list parsing for search path environment variables.

/// Separator between entries of a path-list environment variable.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

#[cfg(windows)]
const DIR_SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const DIR_SEPARATORS: &[char] = &['/'];

/// Strip surrounding whitespace and trailing directory separators.
///
/// A path made only of separators (the filesystem root) keeps one separator.
pub fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim();
    let stripped = trimmed.trim_end_matches(DIR_SEPARATORS);
    if stripped.is_empty() && !trimmed.is_empty() {
        return trimmed[..1].to_string();
    }
    stripped.to_string()
}

/// Split a path-list value into normalized directories, skipping empty entries.
pub fn split_path_list(value: &str) -> Vec<String> {
    value
        .split(PATH_LIST_SEPARATOR)
        .map(|entry| entry.trim_matches(|c: char| c.is_whitespace() || c == PATH_LIST_SEPARATOR))
        .map(normalize_dir)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Read and split the path-list environment variable `var`.
///
/// An unset or non-unicode variable yields no entries.
pub fn path_list_from_env(var: &str) -> Vec<String> {
    std::env::var(var)
        .map(|value| split_path_list(&value))
        .unwrap_or_default()
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_separators() {
        assert_eq!(normalize_dir("/opt/lib///"), "/opt/lib");
        assert_eq!(normalize_dir("  /opt/lib/ "), "/opt/lib");
        assert_eq!(normalize_dir("/"), "/");
        assert_eq!(normalize_dir(""), "");
    }

    #[test]
    fn split_trims_and_skips_empty_entries() {
        assert_eq!(
            split_path_list(" /usr/lib/ :/opt/a::  /opt/b//:"),
            vec!["/usr/lib", "/opt/a", "/opt/b"]
        );
        assert!(split_path_list("").is_empty());
        assert!(split_path_list(" : ").is_empty());
    }
}

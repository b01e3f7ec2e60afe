//! Identifier hygiene: mapping caller-supplied ids onto file names inside the
//! store directory.

use uuid::Uuid;

/// Suffix shared by every record file
pub const RECORD_EXTENSION: &str = ".json";

/// Utilities for turning raw identifiers and names into safe file names
pub struct TemplateAddress;

impl TemplateAddress {
    /// Resolve a raw identifier to its canonical id (file stem).
    ///
    /// Directory components are discarded, whatever separator they use, and a
    /// trailing `.json` is stripped so `"foo"` and `"foo.json"` name the same
    /// record. Returns `None` when nothing usable is left.
    ///
    /// Example: `"../../etc/passwd"` -> `Some("passwd")`
    pub fn resolve(raw_id: &str) -> Option<String> {
        let base = raw_id.rsplit(['/', '\\']).next().unwrap_or_default();
        let stem = base.strip_suffix(RECORD_EXTENSION).unwrap_or(base);

        if stem.is_empty() || stem == "." || stem == ".." || stem.contains('\0') {
            return None;
        }

        Some(stem.to_string())
    }

    /// File name for a resolved id
    /// Example: "welcome" -> "welcome.json"
    pub fn file_name(id: &str) -> String {
        format!("{}{}", id, RECORD_EXTENSION)
    }

    /// Recover the id from a directory entry, ignoring anything that is not a
    /// record file. Temporary files end in `.tmp` and never match.
    pub fn id_from_file_name(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(RECORD_EXTENSION)
            .filter(|stem| !stem.is_empty())
    }

    /// Derive a file stem from a human-readable name.
    ///
    /// Keeps alphanumerics (any script), `-`, `_` and spaces, then trims.
    /// Example: "Sale: -50%!" -> "Sale -50"
    pub fn stem_from_name(name: &str) -> String {
        name.chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Stem with a collision counter appended
    /// Example: ("Foo", 2) -> "Foo-2"
    pub fn with_counter(stem: &str, counter: u32) -> String {
        format!("{}-{}", stem, counter)
    }

    /// Short random identifier: the first 8 hex characters of a v4 UUID
    pub fn random_id() -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        id
    }
}

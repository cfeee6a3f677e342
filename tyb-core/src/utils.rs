//! Shared string helpers for naming and output paths.

/// File suffixes removed before a file name is turned into an identifier.
/// Longer suffixes come first so `.d.ts` wins over `.ts`.
const SOURCE_SUFFIXES: &[&str] = &[".d.mts", ".d.cts", ".d.ts", ".tsx", ".mts", ".cts", ".ts", ".js"];

/// Convert a string to PascalCase, treating every non-alphanumeric
/// character as a word break (e.g., "user-profile" -> "UserProfile")
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// PascalCase form of a file's base name without its TypeScript extension.
///
/// `src/models/user-profile.d.ts` becomes `UserProfile`.
pub fn file_stem_pascal_case(path: &std::path::Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = SOURCE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(&name);
    to_pascal_case(stem)
}

/// Replace characters that are unsafe in an output file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

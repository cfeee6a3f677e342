//! Validation utilities for TypeScript identifiers

use miette::SourceSpan;

/// Words that cannot name a declaration in a module
/// (reserved words plus the strict-mode future reserved words)
pub(crate) const TS_RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with",
    // Strict mode
    "implements", "interface", "let", "package", "private", "protected", "public", "static",
    "yield",
];

pub(crate) fn is_reserved_word(name: &str) -> bool {
    TS_RESERVED_WORDS.contains(&name)
}

/// Validate that a name can be used as a TypeScript declaration name.
/// Returns None if valid, Some(reason) if invalid
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        Some(_) => return Some("name must start with a letter, '_' or '$'"),
        None => return Some("name cannot be empty"),
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Some("name must contain only letters, digits, '_' and '$'");
    }

    if is_reserved_word(name) {
        return Some("name is a reserved word");
    }

    None
}

/// Find the span of a `key = "value"` pair's value in TOML source, starting
/// the search at `from`.
pub(crate) fn find_value_span(src: &str, value: &str, from: usize) -> Option<SourceSpan> {
    let quoted = format!("\"{}\"", value);
    let rest = src.get(from..)?;
    rest.find(&quoted)
        .map(|pos| SourceSpan::from((from + pos + 1, value.len())))
}

/// Find the span of a TOML table header such as `[bundle]`.
pub(crate) fn find_table_span(src: &str, table: &str) -> Option<SourceSpan> {
    let header = format!("[{}]", table);
    src.find(&header)
        .map(|pos| SourceSpan::from((pos, header.len())))
}

//! Reference rewriting and bundle emission.
//!
//! The parser records where the declared name and every type reference sit
//! in a declaration's text. Rewriting replaces only those ranges, so
//! property keys, string and template literal text and comments are never
//! touched. A qualified reference (`ns.Foo`, `Status.Active`) is replaced
//! up to the end of the longest prefix that resolves to a kept declaration.

use std::ops::Range;

use tybundle_core::{Declaration, FileScope, FinalNameAssignment, ResolutionMaps};

use crate::{naming::lookup, registry::Registry};

/// Separator placed between emitted declarations.
pub const SEPARATOR: &str = "\n\n";

/// Rewrite `decl`'s source so its own name and every resolvable reference
/// use their final names. References that resolve to nothing, or to a
/// declaration without a final name, are left as written.
pub fn rewrite_declaration(
    decl: &Declaration,
    scope: Option<&FileScope>,
    final_names: &FinalNameAssignment,
) -> String {
    let mut edits: Vec<(Range<usize>, &str)> = Vec::new();

    if let Some(name) = final_names.get(&decl.id)
        && name != decl.name()
    {
        edits.push((decl.name_range.clone(), name.as_str()));
    }

    for span in &decl.spans {
        // The declaration's own name always means itself, even when an
        // import shadows it in the file scope.
        let resolved = if span.name == decl.name() {
            Some((&decl.id, span.name.as_str()))
        } else {
            scope.and_then(|scope| lookup(scope, &span.name))
        };
        let Some((id, matched)) = resolved else {
            continue;
        };
        let Some(name) = final_names.get(id) else {
            continue;
        };
        if matched == name.as_str() {
            continue;
        }
        let Some(text) = decl.raw.get(span.range.clone()) else {
            continue;
        };
        let end = span.range.start + qualified_prefix_end(text, matched.len());
        edits.push((span.range.start..end, name.as_str()));
    }

    splice(&decl.raw, edits)
}

/// Rewrite every declaration named in `final_names` and join them, ordered
/// by final name.
pub fn emit(
    registry: &Registry,
    scopes: &ResolutionMaps,
    final_names: &FinalNameAssignment,
) -> String {
    let mut rendered: Vec<(&str, String)> = final_names
        .iter()
        .filter_map(|(id, name)| {
            let decl = registry.get(id)?;
            let text = rewrite_declaration(decl, scopes.get(decl.file()), final_names);
            Some((name.as_str(), text))
        })
        .collect();
    rendered.sort_by(|(a, _), (b, _)| a.cmp(b));

    rendered
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Byte offset in `text` just past its first `len` non-whitespace bytes.
/// Qualified names are matched without whitespace, the source may have some.
fn qualified_prefix_end(text: &str, len: usize) -> usize {
    let mut seen = 0;
    for (i, c) in text.char_indices() {
        if seen >= len {
            return i;
        }
        if !c.is_whitespace() {
            seen += c.len_utf8();
        }
    }
    text.len()
}

/// Apply non-overlapping replacements to `source`.
fn splice(source: &str, mut edits: Vec<(Range<usize>, &str)>) -> String {
    if edits.is_empty() {
        return source.to_string();
    }
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for (range, replacement) in edits {
        if range.start < last || range.end > source.len() {
            continue;
        }
        out.push_str(&source[last..range.start]);
        out.push_str(replacement);
        last = range.end;
    }
    out.push_str(&source[last..]);
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tybundle_core::DeclId;

    use super::*;
    use crate::parser::TypeScriptParser;

    /// Parse `source` as `file` and return the declaration called `name`.
    fn decl(file: &str, source: &str, name: &str) -> Declaration {
        TypeScriptParser::new()
            .parse_source(Path::new(file), source)
            .unwrap()
            .declarations
            .into_iter()
            .find(|d| d.name == name)
            .map(|d| d.into_declaration(Path::new(file)))
            .unwrap()
    }

    #[test]
    fn test_renames_own_name_on_word_boundaries() {
        let d = decl("/p/a.ts", "type T = T1 | string;", "T");
        let finals = FinalNameAssignment::from([(d.id.clone(), "TFromA".to_string())]);
        let scope = FileScope::from([("T".to_string(), d.id.clone())]);

        assert_eq!(
            rewrite_declaration(&d, Some(&scope), &finals),
            "type TFromA = T1 | string;"
        );
    }

    #[test]
    fn test_flattens_namespace_reference() {
        let alias = decl("/p/index.ts", "export type Alias = ns.Foo;", "Alias");
        let foo = DeclId::new("/p/m.ts", "Foo");
        let scope = FileScope::from([
            ("Alias".to_string(), alias.id.clone()),
            ("ns.Foo".to_string(), foo.clone()),
        ]);
        let finals = FinalNameAssignment::from([
            (alias.id.clone(), "Alias".to_string()),
            (foo, "ns_Foo".to_string()),
        ]);

        assert_eq!(
            rewrite_declaration(&alias, Some(&scope), &finals),
            "export type Alias = ns_Foo;"
        );
    }

    #[test]
    fn test_keeps_member_after_renamed_head() {
        let d = decl("/p/a.ts", "type A = Status.Active;", "A");
        let status = DeclId::new("/p/s.ts", "Status");
        let scope = FileScope::from([("Status".to_string(), status.clone())]);
        let finals = FinalNameAssignment::from([
            (d.id.clone(), "A".to_string()),
            (status, "StatusFromS".to_string()),
        ]);

        assert_eq!(
            rewrite_declaration(&d, Some(&scope), &finals),
            "type A = StatusFromS.Active;"
        );
    }

    #[test]
    fn test_skips_keys_strings_and_comments() {
        let d = decl(
            "/p/a.ts",
            "interface U {\n  T: T; // T\n  label?: \"T\" | T;\n}",
            "U",
        );
        let t = DeclId::new("/p/t.ts", "T");
        let scope = FileScope::from([("T".to_string(), t.clone())]);
        let finals = FinalNameAssignment::from([
            (d.id.clone(), "U".to_string()),
            (t, "Other".to_string()),
        ]);

        assert_eq!(
            rewrite_declaration(&d, Some(&scope), &finals),
            "interface U {\n  T: Other; // T\n  label?: \"T\" | Other;\n}"
        );
    }

    #[test]
    fn test_keys_after_modifiers_and_comments_keep_their_name() {
        let d = decl(
            "/p/index.ts",
            "interface Root {\n  readonly Key: Key;\n  /** doc */ Key2: Key;\n  // note\n  Key3: { Key: Key };\n}",
            "Root",
        );
        let key = DeclId::new("/p/a.ts", "Key");
        let scope = FileScope::from([("Key".to_string(), key.clone())]);
        let finals = FinalNameAssignment::from([
            (d.id.clone(), "Root".to_string()),
            (key, "Id".to_string()),
        ]);

        assert_eq!(
            rewrite_declaration(&d, Some(&scope), &finals),
            "interface Root {\n  readonly Key: Id;\n  /** doc */ Key2: Id;\n  // note\n  Key3: { Key: Id };\n}"
        );
    }

    #[test]
    fn test_template_literal_text_is_kept() {
        let d = decl("/p/a.ts", "type Route = `User-${User}`;", "Route");
        let user = DeclId::new("/p/u.ts", "User");
        let scope = FileScope::from([("User".to_string(), user.clone())]);
        let finals = FinalNameAssignment::from([
            (d.id.clone(), "Route".to_string()),
            (user, "Member".to_string()),
        ]);

        assert_eq!(
            rewrite_declaration(&d, Some(&scope), &finals),
            "type Route = `User-${Member}`;"
        );
    }

    #[test]
    fn test_unresolved_reference_is_untouched() {
        let d = decl("/p/a.ts", "type P = FC<Props>;", "P");
        let scope = FileScope::from([("P".to_string(), d.id.clone())]);
        let finals = FinalNameAssignment::from([(d.id.clone(), "P".to_string())]);

        assert_eq!(
            rewrite_declaration(&d, Some(&scope), &finals),
            "type P = FC<Props>;"
        );
    }

    #[test]
    fn test_qualified_prefix_end_skips_whitespace() {
        assert_eq!(qualified_prefix_end("ns . Foo", 2), 2);
        assert_eq!(qualified_prefix_end("ns . Foo", 6), 8);
        assert_eq!(qualified_prefix_end("Status.Active", 6), 6);
    }

    #[test]
    fn test_emit_sorts_by_final_name() {
        let source = "type B = A;\ntype A = 1;";
        let b = decl("/p/a.ts", source, "B");
        let a = decl("/p/a.ts", source, "A");
        let scope = FileScope::from([
            ("A".to_string(), a.id.clone()),
            ("B".to_string(), b.id.clone()),
        ]);
        let finals = FinalNameAssignment::from([
            (a.id.clone(), "Zed".to_string()),
            (b.id.clone(), "B".to_string()),
        ]);
        let mut registry = Registry::new();
        registry.insert(b);
        registry.insert(a);
        let mut scopes = ResolutionMaps::new();
        scopes.insert("/p/a.ts".into(), scope);

        assert_eq!(
            emit(&registry, &scopes, &finals),
            "type B = Zed;\n\ntype Zed = 1;"
        );
    }
}

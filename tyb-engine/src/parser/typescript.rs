use std::{collections::BTreeSet, ops::Range, path::Path};

use tree_sitter::{Node, Parser};
use tybundle_core::{DeclKind, ReferenceSpan};

use super::{
    DeclarationParser, ExportRecord, ImportKind, ImportRecord, ParseError, ParsedDeclaration,
    ParsedFile,
};

/// Tree-sitter backed parser for `.ts`, `.tsx` and `.d.ts` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptParser;

impl TypeScriptParser {
    pub fn new() -> Self {
        Self
    }

    // tree_sitter::Parser is not Sync, so one is created per call
    fn create_parser(path: &Path) -> Result<Parser, ParseError> {
        let language = match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX,
            _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
        };
        let mut parser = Parser::new();
        parser.set_language(&language.into())?;
        Ok(parser)
    }

    /// Parse already loaded source text; `path` selects the grammar.
    pub fn parse_source(&self, path: &Path, source: &str) -> Result<ParsedFile, ParseError> {
        let mut parser = Self::create_parser(path)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Syntax {
                path: path.to_path_buf(),
            })?;

        let root = tree.root_node();
        let mut extractor = Extractor::new(source);
        extractor.extract(root);

        if root.has_error() && extractor.file.is_empty() {
            return Err(ParseError::Syntax {
                path: path.to_path_buf(),
            });
        }
        Ok(extractor.file)
    }
}

impl DeclarationParser for TypeScriptParser {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(path, &source)
    }
}

struct Extractor<'a> {
    source: &'a str,
    file: ParsedFile,
}

impl<'a> Extractor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            file: ParsedFile::default(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn extract(&mut self, root: Node) {
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "export_statement" => self.export_statement(child),
                "import_statement" => self.import_statement(child),
                _ => {
                    self.declaration(child, false);
                }
            }
        }
    }

    /// Record a declaration statement, returning its name.
    fn declaration(&mut self, node: Node, exported: bool) -> Option<String> {
        let kind = match node.kind() {
            "interface_declaration" => DeclKind::Interface,
            "type_alias_declaration" => DeclKind::TypeAlias,
            "enum_declaration" => DeclKind::Enum,
            "ambient_declaration" => {
                // declare interface / declare type / declare enum
                let mut cursor = node.walk();
                let inner: Vec<Node> = node.named_children(&mut cursor).collect();
                return inner
                    .into_iter()
                    .find_map(|child| self.declaration(child, exported));
            }
            _ => return None,
        };

        let name_node = node.child_by_field_name("name")?;
        let name = self.text(name_node).to_string();
        let prefix = if exported { "export " } else { "" };
        let raw = format!("{}{}", prefix, self.text(node));
        let base = SpanBase {
            start: node.start_byte(),
            shift: prefix.len(),
        };
        let (references, spans) = self.references(node, name_node, base);

        self.file.declarations.push(ParsedDeclaration {
            name: name.clone(),
            kind,
            raw,
            name_range: base.range(name_node),
            references,
            spans,
        });
        Some(name)
    }

    fn export_statement(&mut self, node: Node) {
        let is_default = has_child_kind(node, "default");

        if let Some(decl) = node.child_by_field_name("declaration") {
            let name = self.declaration(decl, true);
            if is_default && name.is_some() {
                self.file.default_export = name;
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            if is_default && value.kind() == "identifier" {
                self.file.default_export = Some(self.text(value).to_string());
            }
            return;
        }

        let source = node
            .child_by_field_name("source")
            .map(|n| unquote(self.text(n)).to_string());

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "export_clause" => self.export_clause(child, source.as_deref()),
                "*" => {
                    if let Some(source) = &source {
                        self.file.exports.push(ExportRecord::wildcard(source));
                    }
                }
                "namespace_export" => {
                    let mut inner = child.walk();
                    let name = child
                        .named_children(&mut inner)
                        .last()
                        .map(|n| unquote(self.text(n)).to_string());
                    if let (Some(name), Some(source)) = (name, &source) {
                        self.file.exports.push(ExportRecord::namespace(name, source));
                    }
                }
                _ => {}
            }
        }
    }

    fn export_clause(&mut self, node: Node, source: Option<&str>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let local = unquote(self.text(name_node)).to_string();
            let exported = spec
                .child_by_field_name("alias")
                .map(|n| unquote(self.text(n)).to_string())
                .unwrap_or_else(|| local.clone());

            let record = match source {
                Some(source) => ExportRecord::reexport(exported, local, source),
                None => ExportRecord::local(exported, local),
            };
            self.file.exports.push(record);
        }
    }

    fn import_statement(&mut self, node: Node) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let specifier = unquote(self.text(source)).to_string();

        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for child in clause.named_children(&mut clause_cursor) {
                match child.kind() {
                    "identifier" => self.file.imports.push(ImportRecord {
                        local_name: self.text(child).to_string(),
                        imported_name: "default".to_string(),
                        kind: ImportKind::Default,
                        specifier: specifier.clone(),
                    }),
                    "namespace_import" => {
                        let mut inner = child.walk();
                        let local = child
                            .named_children(&mut inner)
                            .find(|n| n.kind() == "identifier")
                            .map(|n| self.text(n).to_string());
                        if let Some(local) = local {
                            self.file.imports.push(ImportRecord {
                                local_name: local,
                                imported_name: "*".to_string(),
                                kind: ImportKind::Namespace,
                                specifier: specifier.clone(),
                            });
                        }
                    }
                    "named_imports" => self.named_imports(child, &specifier),
                    _ => {}
                }
            }
        }
    }

    fn named_imports(&mut self, node: Node, specifier: &str) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if spec.kind() != "import_specifier" {
                continue;
            }
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let imported = unquote(self.text(name_node)).to_string();
            let local = spec
                .child_by_field_name("alias")
                .map(|n| self.text(n).to_string())
                .unwrap_or_else(|| imported.clone());
            self.file.imports.push(ImportRecord {
                local_name: local,
                imported_name: imported,
                kind: ImportKind::Named,
                specifier: specifier.to_string(),
            });
        }
    }

    /// Type references inside `decl`, minus its own name and the names it
    /// binds itself (type parameters, mapped-type keys, `infer` bindings).
    fn references(
        &self,
        decl: Node,
        name_node: Node,
        base: SpanBase,
    ) -> (BTreeSet<String>, Vec<ReferenceSpan>) {
        let mut bound = BTreeSet::new();
        let mut spans = Vec::new();
        self.walk_references(decl, name_node, base, &mut bound, &mut spans);
        spans.retain(|span| !bound.contains(&span.name));
        let references = spans.iter().map(|span| span.name.clone()).collect();
        (references, spans)
    }

    fn walk_references(
        &self,
        node: Node,
        skip: Node,
        base: SpanBase,
        bound: &mut BTreeSet<String>,
        spans: &mut Vec<ReferenceSpan>,
    ) {
        if node == skip {
            return;
        }

        match node.kind() {
            "type_identifier" => {
                spans.push(ReferenceSpan::new(base.range(node), self.text(node)));
            }
            "nested_type_identifier" => {
                let qualified: String = self
                    .text(node)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                spans.push(ReferenceSpan::new(base.range(node), qualified));
                return;
            }
            "type_parameter" | "mapped_type_clause" => {
                if let Some(name) = node.child_by_field_name("name") {
                    bound.insert(self.text(name).to_string());
                }
            }
            "infer_type" => {
                let mut cursor = node.walk();
                let name = node
                    .named_children(&mut cursor)
                    .find(|n| n.kind() == "type_identifier")
                    .map(|n| self.text(n).to_string());
                if let Some(name) = name {
                    bound.insert(name);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk_references(child, skip, base, bound, spans);
        }
    }
}

/// Maps source byte offsets to offsets in a declaration's raw text, which
/// may carry an `export ` prefix the declaration node itself lacks.
#[derive(Debug, Clone, Copy)]
struct SpanBase {
    start: usize,
    shift: usize,
}

impl SpanBase {
    fn range(&self, node: Node) -> Range<usize> {
        let offset = |byte: usize| byte - self.start + self.shift;
        offset(node.start_byte())..offset(node.end_byte())
    }
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| child.kind() == kind)
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '\'' || c == '"')
}

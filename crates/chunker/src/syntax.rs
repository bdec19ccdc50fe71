use crate::error::{ChunkerError, Result};
use crate::pack::{pack_by_size, OverflowRule};
use crate::types::{Chunk, ChunkKind};
use tree_sitter::{Node, Parser, Tree};

/// Default byte budget for serialized code chunks and batches
pub const DEFAULT_CODE_BUDGET: usize = 8192;

/// AST-aware chunker for Python source files.
///
/// Walks the tree-sitter parse tree and emits one chunk per import block,
/// per class (recursively subdividing oversized classes into
/// header/attribute/method chunks), and per top-level function, then packs
/// the serialized records into size-bounded batches.
///
/// Pure and stateless per invocation: the only input is the content given
/// at construction, and `create_chunks` never mutates shared state.
pub struct SyntaxChunker {
    content: String,
    file_name: String,
    budget: usize,
}

impl SyntaxChunker {
    /// Create a new chunker over already-decoded file content
    pub fn new(content: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
            budget: DEFAULT_CODE_BUDGET,
        }
    }

    /// Builder: override the byte budget
    #[must_use]
    pub const fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Get the configured byte budget
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Produce the ordered chunk records for this file.
    ///
    /// Order is fixed: the combined import block first, then classes in
    /// source order, then top-level functions in source order.
    pub fn chunk_records(&self) -> Result<Vec<Chunk>> {
        let tree = self.parse()?;
        let root = tree.root_node();

        let mut chunks = Vec::new();
        self.collect_imports(root, &mut chunks);
        self.collect_classes(root, &mut chunks);
        self.collect_functions(root, &mut chunks);

        log::debug!(
            "Extracted {} chunks from {}",
            chunks.len(),
            self.file_name
        );
        Ok(chunks)
    }

    /// Create serialized, size-bounded batches of chunk records.
    ///
    /// Each batch is a plain concatenation of records; a new batch starts
    /// whenever appending the next record would make the current batch
    /// reach or exceed the budget. A single record larger than the budget
    /// is emitted as its own oversized batch.
    pub fn create_chunks(&self) -> Result<Vec<String>> {
        let records = self
            .chunk_records()?
            .iter()
            .map(Chunk::to_record)
            .collect::<Result<Vec<String>>>()?;

        let batches = pack_by_size(records, self.budget, String::len, OverflowRule::Reach)
            .into_iter()
            .map(|group| group.concat())
            .collect();

        Ok(batches)
    }

    fn parse(&self) -> Result<Tree> {
        if self.content.is_empty() {
            return Err(ChunkerError::EmptyContent);
        }

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(&self.content, None)
            .ok_or_else(|| ChunkerError::parse("Parser produced no tree"))?;

        // A file that fails to parse aborts chunking for that file only;
        // the caller skips it and moves on.
        if tree.root_node().has_error() {
            return Err(ChunkerError::parse(format!(
                "Invalid Python syntax in {}",
                self.file_name
            )));
        }

        Ok(tree)
    }

    fn node_text(&self, node: Node) -> &str {
        &self.content[node.start_byte()..node.end_byte()]
    }

    /// Collect every import statement in the file, at any nesting depth,
    /// into one combined chunk. No chunk is emitted for import-free files.
    fn collect_imports(&self, root: Node, chunks: &mut Vec<Chunk>) {
        let mut imports = Vec::new();
        self.walk_imports(root, &mut imports);

        if imports.is_empty() {
            return;
        }

        chunks.push(
            Chunk::new(
                imports.join("\n"),
                ChunkKind::Import,
                "imports",
                &self.file_name,
            )
            .with_docstring("Module imports"),
        );
    }

    fn walk_imports<'a>(&'a self, node: Node<'a>, imports: &mut Vec<&'a str>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    imports.push(self.node_text(child));
                }
                _ => self.walk_imports(child, imports),
            }
        }
    }

    /// Collect every class definition in source order, nested ones
    /// included, splitting classes whose full text exceeds the budget.
    fn collect_classes(&self, root: Node, chunks: &mut Vec<Chunk>) {
        let mut classes = Vec::new();
        collect_nodes(root, "class_definition", &mut classes);

        for class_node in classes {
            let class_code = self.node_text(class_node);
            if class_code.len() > self.budget {
                self.split_large_class(class_node, chunks);
            } else {
                chunks.push(
                    Chunk::new(
                        class_code,
                        ChunkKind::ClassDefinition,
                        self.definition_name(class_node),
                        &self.file_name,
                    )
                    .with_docstring(self.docstring_of(class_node)),
                );
            }
        }
    }

    /// Split an oversized class into a synthetic header chunk, packed
    /// attribute chunks, and packed method-group chunks.
    fn split_large_class(&self, class_node: Node, chunks: &mut Vec<Chunk>) {
        let class_name = self.definition_name(class_node);
        let docstring = self.docstring_of(class_node);

        // Header: the only chunk whose content is not a substring of the
        // input. The class body is replaced by the docstring alone.
        let header = if docstring.is_empty() {
            class_name.clone()
        } else {
            let indented = docstring
                .lines()
                .map(|line| format!("    {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{class_name}\n{indented}")
        };
        chunks.push(
            Chunk::new(
                header,
                ChunkKind::ClassDefinition,
                &class_name,
                &self.file_name,
            )
            .with_docstring(docstring),
        );

        let mut attributes: Vec<&str> = Vec::new();
        let mut methods: Vec<Node> = Vec::new();

        if let Some(body) = class_node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for stmt in body.named_children(&mut cursor) {
                match stmt.kind() {
                    "expression_statement" => {
                        if let Some(expr) = stmt.named_child(0) {
                            if expr.kind() == "assignment" {
                                attributes.push(self.node_text(stmt));
                            }
                        }
                    }
                    "function_definition" => methods.push(stmt),
                    "decorated_definition" => {
                        if let Some(def) = stmt.child_by_field_name("definition") {
                            if def.kind() == "function_definition" {
                                methods.push(def);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.pack_attributes(&attributes, &class_name, chunks);
        self.pack_methods(&methods, &class_name, chunks);
    }

    /// Pack class-level assignments into attribute chunks. A lone chunk is
    /// named `<class>_attributes`; several get a `_part_<index>` suffix.
    fn pack_attributes(&self, attributes: &[&str], class_name: &str, chunks: &mut Vec<Chunk>) {
        if attributes.is_empty() {
            return;
        }

        let groups = pack_by_size(
            attributes.iter().copied(),
            self.budget,
            |attr| attr.len(),
            OverflowRule::Exceed,
        );
        let single = groups.len() == 1;

        for (index, group) in groups.into_iter().enumerate() {
            let name = if single {
                format!("{class_name}_attributes")
            } else {
                format!("{class_name}_attributes_part_{index}")
            };
            chunks.push(
                Chunk::new(
                    group.join("\n"),
                    ChunkKind::ClassAttributes,
                    name,
                    &self.file_name,
                )
                .with_parent(class_name),
            );
        }
    }

    /// Pack methods into groups named after their first member. Method
    /// bodies are never subdivided, so a single overlong method forms an
    /// oversized group of its own.
    fn pack_methods(&self, methods: &[Node], class_name: &str, chunks: &mut Vec<Chunk>) {
        if methods.is_empty() {
            return;
        }

        let named: Vec<(String, &str)> = methods
            .iter()
            .map(|node| (self.definition_name(*node), self.node_text(*node)))
            .collect();

        let groups = pack_by_size(
            named,
            self.budget,
            |(_, code)| code.len(),
            OverflowRule::Exceed,
        );

        for group in groups {
            let name = group
                .first()
                .map(|(method_name, _)| method_name.clone())
                .unwrap_or_default();
            let content = group
                .iter()
                .map(|(_, code)| *code)
                .collect::<Vec<_>>()
                .join("\n");
            chunks.push(
                Chunk::new(content, ChunkKind::MethodGroup, name, &self.file_name)
                    .with_parent(class_name),
            );
        }
    }

    /// Collect functions defined directly at module scope, decorated ones
    /// included. Functions nested in classes or other functions belong to
    /// their enclosing chunk and are skipped here.
    fn collect_functions(&self, root: Node, chunks: &mut Vec<Chunk>) {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            let func_node = match child.kind() {
                "function_definition" => Some(child),
                "decorated_definition" => child
                    .child_by_field_name("definition")
                    .filter(|def| def.kind() == "function_definition"),
                _ => None,
            };

            if let Some(func) = func_node {
                chunks.push(
                    Chunk::new(
                        self.node_text(func),
                        ChunkKind::Function,
                        self.definition_name(func),
                        &self.file_name,
                    )
                    .with_docstring(self.docstring_of(func)),
                );
            }
        }
    }

    fn definition_name(&self, node: Node) -> String {
        node.child_by_field_name("name")
            .map(|name| self.node_text(name).to_string())
            .unwrap_or_default()
    }

    /// Extract the docstring of a class or function definition: the string
    /// literal standing alone as the first statement of its body. Empty
    /// string when there is none; class and function chunks always carry
    /// the field, only grouping chunks leave it unset.
    fn docstring_of(&self, definition: Node) -> String {
        let Some(body) = definition.child_by_field_name("body") else {
            return String::new();
        };
        let Some(first) = body.named_child(0) else {
            return String::new();
        };
        if first.kind() != "expression_statement" {
            return String::new();
        }
        let Some(expr) = first.named_child(0) else {
            return String::new();
        };
        if expr.kind() != "string" {
            return String::new();
        }
        self.string_text(expr)
    }

    fn string_text(&self, string_node: Node) -> String {
        let mut cursor = string_node.walk();
        for child in string_node.children(&mut cursor) {
            if child.kind() == "string_content" {
                return dedent_docstring(self.node_text(child));
            }
        }
        dedent_docstring(
            self.node_text(string_node)
                .trim_matches(|c| c == '"' || c == '\''),
        )
    }
}

/// Normalize a docstring the way Python documentation tooling renders it:
/// trim the first line and strip the common leading whitespace from the
/// remaining lines.
fn dedent_docstring(raw: &str) -> String {
    let mut lines = raw.lines();
    let first = lines.next().unwrap_or("").trim();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = String::from(first);
    for line in rest {
        out.push('\n');
        if line.len() >= indent {
            out.push_str(line[indent..].trim_end());
        } else {
            out.push_str(line.trim_end());
        }
    }
    out.trim().to_string()
}

/// Depth-first, source-order collection of every node of the given kind.
fn collect_nodes<'a>(node: Node<'a>, kind: &str, out: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == kind {
            out.push(child);
        }
        collect_nodes(child, kind, out);
    }
}

//! Object containers
//!
//! An object bundles one code block with named children: raw data blobs and
//! nested objects. Children are addressed from code through dotted paths
//! (`"B.C"`, `"A.x"`), see [`Object::data_names`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::ast::{indent, quote, Block};
use crate::common::Ident;

/// Child of an [`Object`]
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectNode {
    Data(Data),
    Object(Object),
}

impl ObjectNode {
    pub fn name(&self) -> Ident {
        match self {
            Self::Data(data) => data.name,
            Self::Object(object) => object.name,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            Self::Data(_) => None,
        }
    }
}

impl From<Data> for ObjectNode {
    fn from(data: Data) -> Self {
        Self::Data(data)
    }
}

impl From<Object> for ObjectNode {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl fmt::Display for ObjectNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => write!(f, "{data}"),
            Self::Object(object) => write!(f, "{object}"),
        }
    }
}

/// Named byte payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    name: Ident,
    data: Vec<u8>,
}

impl Data {
    pub fn new(name: impl Into<Ident>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> Ident {
        self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.data.iter().map(|byte| format!("{byte:02x}")).collect();
        write!(f, "data {} hex\"{hex}\"", quote(&self.name.as_string()))
    }
}

/// Code block plus ordered, uniquely named children
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    name: Ident,
    code: Block,
    sub_objects: Vec<ObjectNode>,
    sub_index_by_name: HashMap<Ident, usize>,
}

impl Object {
    pub fn new(name: impl Into<Ident>, code: Block) -> Self {
        Self {
            name: name.into(),
            code,
            sub_objects: Vec::new(),
            sub_index_by_name: HashMap::new(),
        }
    }

    pub fn name(&self) -> Ident {
        self.name
    }

    pub fn code(&self) -> &Block {
        &self.code
    }

    /// Append `node` under `name`.
    ///
    /// The first registration of a name wins; returns `false` and drops
    /// `node` if `name` is already taken at this level.
    pub fn add_named_sub_object(&mut self, name: Ident, node: impl Into<ObjectNode>) -> bool {
        if self.sub_index_by_name.contains_key(&name) {
            return false;
        }
        self.sub_index_by_name.insert(name, self.sub_objects.len());
        self.sub_objects.push(node.into());
        true
    }

    /// Children in insertion order
    pub fn sub_objects(&self) -> &[ObjectNode] {
        &self.sub_objects
    }

    pub fn sub_object(&self, name: Ident) -> Option<&ObjectNode> {
        self.sub_index_by_name.get(&name).map(|&i| &self.sub_objects[i])
    }

    /// Every name code in this object may refer to: the object's own name,
    /// the names of its children and, recursively, the names inside child
    /// objects qualified with the child's name.
    pub fn data_names(&self) -> BTreeSet<Ident> {
        let mut names = self.descendant_names();
        names.insert(self.name);
        names.remove(&Ident::empty());
        names
    }

    /// Names below this object, relative to it
    fn descendant_names(&self) -> BTreeSet<Ident> {
        let mut names = BTreeSet::new();
        for node in &self.sub_objects {
            let child = node.name();
            names.insert(child);
            if let Some(object) = node.as_object() {
                names.extend(
                    object
                        .descendant_names()
                        .into_iter()
                        .map(|name| child.qualify(name)),
                );
            }
        }
        names
    }

    /// Qualified names of the nested objects reachable from this one.
    ///
    /// Only objects are keys; data leaves never are, even though
    /// [`data_names`](Self::data_names) lists them.
    pub fn sub_objects_by_data_name(&self) -> BTreeMap<Ident, &Object> {
        let mut objects = BTreeMap::new();
        for object in self.sub_objects.iter().filter_map(ObjectNode::as_object) {
            objects.insert(object.name, object);
            let nested = object.sub_objects_by_data_name();
            for name in object.descendant_names() {
                if let Some(&inner) = nested.get(&name) {
                    objects.insert(object.name.qualify(name), inner);
                }
            }
        }
        objects
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inner = format!("code {}", self.code);
        for node in &self.sub_objects {
            inner.push('\n');
            inner.push_str(&node.to_string());
        }
        write!(f, "object {} {{\n{}\n}}", quote(&self.name.as_string()), indent(&inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Literal, Stmt, StmtKind};
    use crate::common::Span;
    use pretty_assertions::assert_eq;
    use std::ptr;

    fn ident(name: &str) -> Ident {
        Ident::new(name)
    }

    fn object(name: &str) -> Object {
        Object::new(name, Block::empty(Span::dummy()))
    }

    /// root { A { data x }, B { C { data y } } }
    fn sample() -> Object {
        let mut a = object("A");
        a.add_named_sub_object(ident("x"), Data::new("x", vec![1]));
        let mut c = object("C");
        c.add_named_sub_object(ident("y"), Data::new("y", vec![2]));
        let mut b = object("B");
        b.add_named_sub_object(ident("C"), c);

        let mut root = object("root");
        root.add_named_sub_object(ident("A"), a);
        root.add_named_sub_object(ident("B"), b);
        root
    }

    #[test]
    fn test_data_names() {
        let names = sample().data_names();
        let expected: BTreeSet<_> =
            ["root", "A", "A.x", "B", "B.C", "B.C.y"].into_iter().map(ident).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_sub_objects_by_data_name_skips_data() {
        let root = sample();
        let objects = root.sub_objects_by_data_name();
        let keys: BTreeSet<_> = objects.keys().copied().collect();
        let expected: BTreeSet<_> = ["A", "B", "B.C"].into_iter().map(ident).collect();
        assert_eq!(keys, expected);

        assert_eq!(objects[&ident("A")].name(), ident("A"));
        assert_eq!(objects[&ident("B.C")].name(), ident("C"));
        assert!(!objects.contains_key(&ident("A.x")));
        assert!(!objects.contains_key(&ident("B.C.y")));
    }

    #[test]
    fn test_child_named_like_its_parent() {
        let mut inner = object("B");
        inner.add_named_sub_object(ident("y"), Data::new("y", vec![]));
        let mut outer = object("B");
        outer.add_named_sub_object(ident("B"), inner);
        let mut root = object("root");
        root.add_named_sub_object(ident("B"), outer);

        let expected: BTreeSet<_> = ["root", "B", "B.B", "B.B.y"].into_iter().map(ident).collect();
        assert_eq!(root.data_names(), expected);

        let objects = root.sub_objects_by_data_name();
        let keys: BTreeSet<_> = objects.keys().copied().collect();
        let expected: BTreeSet<_> = ["B", "B.B"].into_iter().map(ident).collect();
        assert_eq!(keys, expected);
        assert!(!ptr::eq(objects[&ident("B")], objects[&ident("B.B")]));
    }

    #[test]
    fn test_render_escapes_non_ascii_name() {
        assert_eq!(Data::new("café", vec![0xab]).to_string(), "data \"caf\\xc3\\xa9\" hex\"ab\"");
    }

    #[test]
    fn test_unnamed_root_excluded() {
        let mut root = object("");
        root.add_named_sub_object(ident("d"), Data::new("d", vec![]));
        let names: Vec<_> = root.data_names().into_iter().collect();
        assert_eq!(names, vec![ident("d")]);
    }

    #[test]
    fn test_duplicate_child_keeps_first() {
        let mut root = object("root");
        assert!(root.add_named_sub_object(ident("d"), Data::new("d", vec![1])));
        assert!(!root.add_named_sub_object(ident("d"), Data::new("d", vec![2])));
        assert_eq!(root.sub_objects().len(), 1);

        let Some(ObjectNode::Data(data)) = root.sub_object(ident("d")) else {
            panic!("expected data node");
        };
        assert_eq!(data.data(), &[1]);
    }

    #[test]
    fn test_render() {
        let span = Span::dummy();
        let code = Block::new(
            vec![Stmt::new(
                StmtKind::Expr(Expr::call(
                    "sstore",
                    vec![
                        Expr::literal(Literal::number("0"), span),
                        Expr::call(
                            "datasize",
                            vec![Expr::literal(Literal::string("A"), span)],
                            span,
                        ),
                    ],
                    span,
                )),
                span,
            )],
            span,
        );
        let mut a = object("A");
        a.add_named_sub_object(ident("x"), Data::new("x", vec![0xde, 0xad]));
        let mut root = Object::new("root", code);
        root.add_named_sub_object(ident("A"), a);
        root.add_named_sub_object(ident("q\""), Data::new("q\"", vec![]));

        let expected = r#"object "root" {
    code {
        sstore(0, datasize("A"))
    }
    object "A" {
        code { }
        data "x" hex"dead"
    }
    data "q\"" hex""
}"#;
        assert_eq!(root.to_string(), expected);
    }
}

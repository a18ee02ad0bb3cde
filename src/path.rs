use std::fmt;

/// A step from a container to one of its children.
///
/// Paths locate values inside a document tree; the evaluator uses them to
/// find reference placeholders and to report where an unresolved one sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object field access by name
    ///
    /// # Examples
    /// - `{server: {port: 1}}` → `[Field("server"), Field("port")]`
    Field(String),

    /// Array element by position
    ///
    /// # Examples
    /// - `{hosts: ["a", "b"]}` → `[Field("hosts"), Index(1)]` for `"b"`
    Index(usize),
}

/// A sequence of path segments from the document root.
///
/// Renders as `server.hosts[1]`; the root itself renders as `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{Expr, Literal},
    lexer::Span,
    path::{Path, PathSegment},
    value::{Map, Value},
};

/// Resolution passes run before leftover references are reported.
pub const DEFAULT_MAX_PASSES: usize = 3;

/// Called bottom-up on every resolved value as `(key, value, holder)`.
///
/// Array elements get their index as the key; the root gets `""` with a
/// holder of `{"": root}`. The holder is live: siblings visited earlier
/// already carry their revived values. Returning `None` removes the entry.
pub type Reviver = dyn Fn(&str, Value, &Value) -> Option<Value> + Send + Sync;

/// Why a reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// The target exists but never became concrete: a cycle, or a chain of
    /// references longer than the pass limit.
    Circular,
    /// Nothing exists at the target path.
    Undefined,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::Circular => f.write_str("circular reference"),
            Unresolved::Undefined => f.write_str("undefined reference"),
        }
    }
}

/// Errors that can occur after a document parsed successfully.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A reference still unresolved after the last pass
    #[error("Unresolved reference '{path}' in {location}: {reason} at {}", .span.start)]
    UnresolvedReference {
        /// Dotted target path, e.g. `server.port`
        path: String,
        /// Where the reference appears in the document
        location: Path,
        reason: Unresolved,
        span: Span,
    },

    /// Integer literal beyond 2^53 - 1 while BigInt promotion is disabled
    #[error(
        "Integer literal {raw} exceeds the safe integer range; add the 'n' suffix to make it a BigInt at {}",
        .span.start
    )]
    UnsafeInteger { raw: String, span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::UnresolvedReference { span, .. } | EvalError::UnsafeInteger { span, .. } => {
                *span
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            EvalError::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            EvalError::UnsafeInteger { .. } => "UNSAFE_INTEGER",
        }
    }
}

/// Draft value tree. References are pending until their target is concrete.
#[derive(Debug)]
enum Slot<'a> {
    Ready(Value),
    Array(Vec<Slot<'a>>),
    Object(IndexMap<String, Slot<'a>>),
    Pending(&'a Expr),
}

enum Lookup {
    Found(Value),
    Pending,
    Missing,
}

impl<'a> Slot<'a> {
    /// Build the draft tree from the syntax tree.
    fn materialize(expr: &'a Expr) -> Slot<'a> {
        match expr {
            Expr::Literal { value, .. } => Slot::Ready(literal_value(value)),
            Expr::Object { properties, .. } => {
                let mut map = IndexMap::with_capacity(properties.len());
                for property in properties {
                    // Last write wins; the key keeps its first position
                    map.insert(property.key.clone(), Slot::materialize(&property.value));
                }
                Slot::Object(map)
            }
            Expr::Array { elements, .. } => {
                Slot::Array(elements.iter().map(Slot::materialize).collect())
            }
            Expr::Identifier { .. } | Expr::Member { .. } | Expr::Template { .. } => {
                Slot::Pending(expr)
            }
        }
    }

    /// Concrete copy, or `None` if anything inside is still pending.
    fn to_value(&self) -> Option<Value> {
        match self {
            Slot::Ready(value) => Some(value.clone()),
            Slot::Array(items) => items
                .iter()
                .map(Slot::to_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Slot::Object(map) => map
                .iter()
                .map(|(key, slot)| slot.to_value().map(|value| (key.clone(), value)))
                .collect::<Option<Map>>()
                .map(Value::Object),
            Slot::Pending(_) => None,
        }
    }

    /// Callers must have checked that no placeholder is left.
    fn into_value(self) -> Value {
        match self {
            Slot::Ready(value) => value,
            Slot::Array(items) => Value::Array(items.into_iter().map(Slot::into_value).collect()),
            Slot::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, slot)| (key, slot.into_value()))
                    .collect(),
            ),
            Slot::Pending(_) => Value::Null,
        }
    }

    fn lookup(&self, segments: &[&str]) -> Lookup {
        let Some((first, rest)) = segments.split_first() else {
            return match self.to_value() {
                Some(value) => Lookup::Found(value),
                None => Lookup::Pending,
            };
        };

        match self {
            Slot::Object(map) => match map.get(*first) {
                Some(child) => child.lookup(rest),
                None => Lookup::Missing,
            },
            Slot::Ready(value) => match value.get_path(segments) {
                Some(found) => Lookup::Found(found.clone()),
                None => Lookup::Missing,
            },
            Slot::Pending(_) => Lookup::Pending,
            Slot::Array(_) => Lookup::Missing,
        }
    }

    fn at_mut(&mut self, path: &Path) -> Option<&mut Slot<'a>> {
        path.segments()
            .iter()
            .try_fold(self, |slot, segment| match (slot, segment) {
                (Slot::Object(map), PathSegment::Field(key)) => map.get_mut(key),
                (Slot::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
                _ => None,
            })
    }

    fn at(&self, path: &Path) -> Option<&Slot<'a>> {
        path.segments()
            .iter()
            .try_fold(self, |slot, segment| match (slot, segment) {
                (Slot::Object(map), PathSegment::Field(key)) => map.get(key),
                (Slot::Array(items), PathSegment::Index(index)) => items.get(*index),
                _ => None,
            })
    }

    /// Locations of every placeholder, in document order.
    fn collect_pending(&self, current: &mut Path, out: &mut Vec<Path>) {
        match self {
            Slot::Ready(_) => {}
            Slot::Pending(_) => out.push(current.clone()),
            Slot::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    current.push(PathSegment::Index(index));
                    item.collect_pending(current, out);
                    current.pop();
                }
            }
            Slot::Object(map) => {
                for (key, item) in map {
                    current.push(PathSegment::Field(key.clone()));
                    item.collect_pending(current, out);
                    current.pop();
                }
            }
        }
    }

    fn pending_locations(&self) -> Vec<Path> {
        let mut out = Vec::new();
        self.collect_pending(&mut Path::root(), &mut out);
        out
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::BigInt(n) => Value::BigInt(n.clone()),
        Literal::String(s) => Value::String(s.clone()),
    }
}

/// Value of `expr` against the current draft root, if every reference it
/// contains is already concrete.
fn resolve(expr: &Expr, root: &Slot<'_>) -> Option<Value> {
    match expr {
        Expr::Literal { value, .. } => Some(literal_value(value)),
        Expr::Identifier { .. } | Expr::Member { .. } => {
            let segments = expr.reference_segments()?;
            match root.lookup(&segments) {
                Lookup::Found(value) => Some(value),
                Lookup::Pending | Lookup::Missing => None,
            }
        }
        Expr::Template {
            quasis,
            expressions,
            ..
        } => {
            let mut out = quasis.first().cloned().unwrap_or_default();
            for (expression, quasi) in expressions.iter().zip(quasis.iter().skip(1)) {
                out.push_str(&resolve(expression, root)?.coerce_to_string());
                out.push_str(quasi);
            }
            Some(Value::String(out))
        }
        Expr::Object { properties, .. } => {
            let mut map = Map::with_capacity(properties.len());
            for property in properties {
                map.insert(property.key.clone(), resolve(&property.value, root)?);
            }
            Some(Value::Object(map))
        }
        Expr::Array { elements, .. } => elements
            .iter()
            .map(|element| resolve(element, root))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
    }
}

/// The first reference inside `expr` that does not resolve, with the reason.
fn first_unresolved<'e>(expr: &'e Expr, root: &Slot<'_>) -> Option<(&'e Expr, Unresolved)> {
    match expr {
        Expr::Literal { .. } => None,
        Expr::Identifier { .. } | Expr::Member { .. } => {
            let segments = expr.reference_segments()?;
            match root.lookup(&segments) {
                Lookup::Found(_) => None,
                Lookup::Pending => Some((expr, Unresolved::Circular)),
                Lookup::Missing => Some((expr, Unresolved::Undefined)),
            }
        }
        Expr::Template { expressions, .. } => expressions
            .iter()
            .find_map(|expression| first_unresolved(expression, root)),
        Expr::Object { properties, .. } => properties
            .iter()
            .find_map(|property| first_unresolved(&property.value, root)),
        Expr::Array { elements, .. } => elements
            .iter()
            .find_map(|element| first_unresolved(element, root)),
    }
}

/// Resolves the references in a parsed document.
///
/// Works in passes instead of building a dependency graph: every pass walks
/// the draft tree and replaces each placeholder whose target is already
/// concrete. A pass that resolves nothing ends the loop early. Chains needing
/// more hops than the pass limit are reported like cycles.
#[derive(Clone)]
pub struct Evaluator {
    max_passes: usize,
    reviver: Option<Arc<Reviver>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            max_passes: DEFAULT_MAX_PASSES,
            reviver: None,
        }
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("max_passes", &self.max_passes)
            .field("reviver", &self.reviver.is_some())
            .finish()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_reviver(mut self, reviver: Option<Arc<Reviver>>) -> Self {
        self.reviver = reviver;
        self
    }

    /// Evaluates a parsed document into a concrete value.
    ///
    /// # Examples
    ///
    /// ```
    /// use refjson::{Evaluator, Lexer, Parser, Value};
    ///
    /// let lexer = Lexer::new("{a: b, b: 42}");
    /// let mut parser = Parser::new(lexer).unwrap();
    /// let expr = parser.parse().unwrap();
    ///
    /// let value = Evaluator::new().evaluate(&expr).unwrap();
    /// assert_eq!(value.get("a"), Some(&Value::Number(42.0)));
    /// ```
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, EvalError> {
        let mut root = Slot::materialize(expr);
        self.run_passes(&mut root);
        let value = self.finalize(root)?;

        Ok(match &self.reviver {
            Some(reviver) => revive(value, reviver.as_ref()),
            None => value,
        })
    }

    fn run_passes(&self, root: &mut Slot<'_>) {
        for pass in 1..=self.max_passes {
            let locations = root.pending_locations();
            if locations.is_empty() {
                debug!(pass, "all references resolved");
                return;
            }

            let mut resolved = 0;
            for location in &locations {
                let Some(Slot::Pending(expr)) = root.at(location) else {
                    continue;
                };
                let expr = *expr;

                if let Some(value) = resolve(expr, root)
                    && let Some(slot) = root.at_mut(location)
                {
                    *slot = Slot::Ready(value);
                    resolved += 1;
                }
            }

            trace!(
                pass,
                resolved,
                remaining = locations.len() - resolved,
                "reference resolution pass"
            );

            if resolved == 0 {
                debug!(pass, "reference resolution reached a fixed point");
                return;
            }
        }
        debug!(max_passes = self.max_passes, "reference resolution hit the pass limit");
    }

    fn finalize(&self, root: Slot<'_>) -> Result<Value, EvalError> {
        if let Some(location) = root.pending_locations().into_iter().next() {
            return Err(self.unresolved(&root, location));
        }
        Ok(root.into_value())
    }

    fn unresolved(&self, root: &Slot<'_>, location: Path) -> EvalError {
        let placeholder = match root.at(&location) {
            Some(Slot::Pending(expr)) => Some(*expr),
            _ => None,
        };

        match placeholder {
            Some(expr) => {
                let (target, reason) =
                    first_unresolved(expr, root).unwrap_or((expr, Unresolved::Circular));
                EvalError::UnresolvedReference {
                    path: target.reference_path(),
                    location,
                    reason,
                    span: target.span(),
                }
            }
            None => EvalError::UnresolvedReference {
                path: location.to_string(),
                location,
                reason: Unresolved::Circular,
                span: Span::default(),
            },
        }
    }
}

/// Apply a reviver bottom-up; the root is wrapped in a `{"": root}` holder.
fn revive(value: Value, reviver: &Reviver) -> Value {
    let mut wrapper = Map::new();
    wrapper.insert(String::new(), value);
    let mut holder = Value::Object(wrapper);

    internalize(&mut holder, &PathSegment::Field(String::new()), reviver);
    match holder {
        Value::Object(mut wrapper) => wrapper.shift_remove("").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Revives the entry at `key` in place. Its children go first, then the
/// reviver sees the live holder: earlier siblings are already replaced, and
/// removed ones are gone (objects) or `null` (arrays). Returns `false` if the
/// entry was removed.
fn internalize(holder: &mut Value, key: &PathSegment, reviver: &Reviver) -> bool {
    let Some(entry) = entry_mut(holder, key) else {
        return true;
    };
    revive_children(entry, reviver);
    let value = entry.clone();

    let name = match key {
        PathSegment::Field(name) => name.clone(),
        PathSegment::Index(index) => index.to_string(),
    };
    let revived = reviver(&name, value, holder);

    match (holder, revived) {
        (holder, Some(value)) => {
            if let Some(entry) = entry_mut(holder, key) {
                *entry = value;
            }
            true
        }
        (Value::Object(map), None) => {
            map.shift_remove(&name);
            false
        }
        (Value::Array(items), None) => {
            if let PathSegment::Index(index) = key
                && let Some(entry) = items.get_mut(*index)
            {
                *entry = Value::Null;
            }
            false
        }
        (_, None) => false,
    }
}

fn revive_children(value: &mut Value, reviver: &Reviver) {
    let keys: Vec<PathSegment> = match value {
        Value::Object(map) => map.keys().cloned().map(PathSegment::Field).collect(),
        Value::Array(items) => (0..items.len()).map(PathSegment::Index).collect(),
        _ => return,
    };
    let kept: Vec<bool> = keys
        .iter()
        .map(|key| internalize(value, key, reviver))
        .collect();

    // Removed array elements were nulled in place; drop them now
    if let Value::Array(items) = value {
        let mut kept = kept.into_iter();
        items.retain(|_| kept.next().unwrap_or(true));
    }
}

fn entry_mut<'v>(holder: &'v mut Value, key: &PathSegment) -> Option<&'v mut Value> {
    match (holder, key) {
        (Value::Object(map), PathSegment::Field(name)) => map.get_mut(name),
        (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval(source: &str) -> Result<Value, EvalError> {
        let expr = Parser::new(Lexer::new(source)).unwrap().parse().unwrap();
        Evaluator::new().evaluate(&expr)
    }

    #[test]
    fn test_forward_reference() {
        let value = eval("{a: b, b: 1}").unwrap();
        assert_eq!(value.get("a"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_cycle_is_reported() {
        let err = eval("{a: b, b: a}").unwrap_err();
        match err {
            EvalError::UnresolvedReference { reason, .. } => {
                assert_eq!(reason, Unresolved::Circular)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pending_inside_nested_object() {
        let value = eval("{x: {y: z}, z: [1, 2]}").unwrap();
        assert_eq!(
            value.get_path(&["x", "y"]),
            Some(&Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]))
        );
    }
}

//! Lexical locals as a persistent chain of frames.
//!
//! Extending never touches the parent: each lambda invocation or loop
//! iteration gets its own frame on top of a shared, immutable tail.

use std::rc::Rc;

use crate::value::Value;

#[derive(Debug)]
struct Frame {
    bindings: Vec<(String, Value)>,
    parent: Option<Rc<Frame>>,
}

/// Name → value bindings visible to an expression.
#[derive(Debug, Clone, Default)]
pub struct Locals {
    head: Option<Rc<Frame>>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost binding for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if let Some((_, value)) = current.bindings.iter().rev().find(|(n, _)| n == name) {
                return Some(value);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// A new chain with `bindings` layered over this one.
    pub fn extend<I>(&self, bindings: I) -> Locals
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Locals {
            head: Some(Rc::new(Frame {
                bindings: bindings.into_iter().collect(),
                parent: self.head.clone(),
            })),
        }
    }
}

impl FromIterator<(String, Value)> for Locals {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Locals::new().extend(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        assert_eq!(Locals::new().get("x"), None);
    }

    #[test]
    fn test_extend_shadows_without_mutating_parent() {
        let outer: Locals = [("x".to_string(), Value::from(1))].into_iter().collect();
        let inner = outer.extend([("x".to_string(), Value::from(2))]);
        assert_eq!(inner.get("x"), Some(&Value::from(2)));
        assert_eq!(outer.get("x"), Some(&Value::from(1)));
    }

    #[test]
    fn test_inner_sees_outer() {
        let outer: Locals = [("item".to_string(), Value::from("a"))].into_iter().collect();
        let inner = outer.extend([("v".to_string(), Value::from(3))]);
        assert!(inner.contains("item"));
        assert!(inner.contains("v"));
        assert!(!outer.contains("v"));
    }

    #[test]
    fn test_siblings_do_not_share_frames() {
        let base = Locals::new();
        let first = base.extend([("a".to_string(), Value::Null)]);
        let second = base.extend([("b".to_string(), Value::Null)]);
        assert!(!first.contains("b"));
        assert!(!second.contains("a"));
    }
}

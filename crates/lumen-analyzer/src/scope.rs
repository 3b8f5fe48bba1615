//! Symbol environment for static analysis.
//!
//! Tracks declared state fields plus a stack of lexical scope frames. Frames
//! are pushed around exactly the subtree where their bindings are legal and
//! popped right after, which keeps sibling subtrees from seeing each other's
//! bindings.

use std::collections::HashSet;

/// Where a resolved name was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    State,
    LambdaParam,
    LambdaIndex,
    EachItem,
    EachIndex,
    ComponentParam,
    /// `event` / `payload` inside action steps, fetch `result` / `error`.
    ActionInput,
}

impl Origin {
    /// True for bindings introduced by a scope frame rather than by state.
    pub fn is_lexical(self) -> bool {
        !matches!(self, Origin::State)
    }
}

/// Scope construction error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("'{name}' is bound twice in the same scope")]
    DuplicateBinding { name: String },
}

/// The names introduced at one nesting level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeFrame {
    bindings: Vec<(String, Origin)>,
}

impl ScopeFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, failing if the frame already binds `name`.
    pub fn bind(mut self, name: &str, origin: Origin) -> Result<Self, ScopeError> {
        if self.lookup(name).is_some() {
            return Err(ScopeError::DuplicateBinding { name: name.into() });
        }
        self.bindings.push((name.into(), origin));
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<Origin> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, origin)| *origin)
    }
}

/// Declared state plus the lexical scope stack.
#[derive(Debug, Default)]
pub struct SymbolEnvironment {
    state: HashSet<String>,
    frames: Vec<ScopeFrame>,
}

impl SymbolEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_state<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.extend(names.into_iter().map(Into::into));
    }

    pub fn is_state(&self, name: &str) -> bool {
        self.state.contains(name)
    }

    /// Push a frame built from `bindings`. Duplicate names fail before
    /// anything is pushed.
    pub fn push_scope<'a, I>(&mut self, bindings: I) -> Result<(), ScopeError>
    where
        I: IntoIterator<Item = (&'a str, Origin)>,
    {
        let frame = bindings
            .into_iter()
            .try_fold(ScopeFrame::new(), |frame, (name, origin)| {
                frame.bind(name, origin)
            })?;
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    /// Resolve innermost frame first, then declared state.
    pub fn resolve(&self, name: &str) -> Option<Origin> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.lookup(name))
            .or_else(|| self.is_state(name).then_some(Origin::State))
    }

    /// True if any open frame binds `name` with exactly `origin`, even when
    /// an inner frame shadows it with a different origin.
    pub fn has_binding(&self, name: &str, origin: Origin) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.lookup(name) == Some(origin))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

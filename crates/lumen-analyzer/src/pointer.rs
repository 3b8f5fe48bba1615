//! JSON pointer tracking for error locations.

/// A JSON pointer under construction, e.g. `/view/value/args/0/body`.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl ToString) {
        self.segments.push(segment.to_string());
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Render the pointer, escaping `~` and `/` inside segments.
    pub fn render(&self) -> String {
        if self.segments.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        for seg in &self.segments {
            out.push('/');
            out.push_str(&seg.replace('~', "~0").replace('/', "~1"));
        }
        out
    }
}

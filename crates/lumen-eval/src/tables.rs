//! Runtime tables seeded from a loaded program.

use indexmap::IndexMap;
use lumen_ast::{Program, StylePreset};
use serde_json::Value as Json;

use crate::context::EvalContext;
use crate::host::HostAdapter;
use crate::value::Value;

/// Initial state, imports and style presets of one program.
///
/// `data` sources are merged into the import table, so `import` and `data`
/// expressions read the same names. A `data` source shadows an import of the
/// same name; the collision is logged at `warn`.
#[derive(Debug, Clone, Default)]
pub struct ProgramTables {
    pub state: IndexMap<String, Value>,
    pub imports: IndexMap<String, Value>,
    pub styles: IndexMap<String, StylePreset>,
}

impl ProgramTables {
    pub fn from_program(program: &Program) -> Self {
        let state = program
            .state
            .iter()
            .map(|(name, field)| (name.clone(), Value::from(&field.initial)))
            .collect();
        let mut imports: IndexMap<String, Value> = program
            .imports
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value)))
            .collect();
        for (name, value) in &program.data {
            if imports.insert(name.clone(), Value::from(value)).is_some() {
                tracing::warn!(%name, "data source shadows import");
            }
        }
        Self {
            state,
            imports,
            styles: program.styles.clone(),
        }
    }

    /// Replace state values, adding fields the program did not declare.
    pub fn overlay_state<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Json)>,
    {
        for (name, value) in values {
            self.state.insert(name.clone(), Value::from(value));
        }
    }

    /// A context reading from these tables.
    pub fn context<'h>(&'h self, env: &'h dyn HostAdapter) -> EvalContext<'h> {
        EvalContext::new(&self.state, env)
            .with_imports(&self.imports)
            .with_styles(&self.styles)
    }
}

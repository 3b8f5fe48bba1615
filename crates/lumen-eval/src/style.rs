//! Style preset resolution: `base` plus one class string per active variant.

use indexmap::IndexMap;
use lumen_ast::{Expression, StylePreset};

use crate::context::EvalContext;
use crate::evaluator::evaluate;

/// Resolve a `style` expression to its class string. Any other expression,
/// or a preset the context does not know, resolves to `""`.
pub fn evaluate_style(expr: &Expression, ctx: &EvalContext<'_>) -> String {
    match expr {
        Expression::Style { name, variants } => resolve(name, variants, ctx),
        other => {
            tracing::trace!(kind = other.kind(), "not a style expression");
            String::new()
        }
    }
}

pub(crate) fn resolve(
    name: &str,
    overrides: &IndexMap<String, Expression>,
    ctx: &EvalContext<'_>,
) -> String {
    let Some(preset) = ctx.style(name) else {
        tracing::trace!(name, "unknown style preset");
        return String::new();
    };
    compose(preset, |variant| match overrides.get(variant) {
        Some(expr) => {
            let value = evaluate(expr, ctx);
            (!value.is_nullish()).then(|| value.to_string())
        }
        None => preset.default_variants.get(variant).cloned(),
    })
}

/// Join `base` with the class of each variant, in declaration order.
fn compose(preset: &StylePreset, mut active: impl FnMut(&str) -> Option<String>) -> String {
    let mut classes = preset.base.trim().to_string();
    for (variant, options) in &preset.variants {
        let Some(value) = active(variant) else {
            continue;
        };
        if let Some(class) = options.get(&value).map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;
    use crate::value::Value;
    use lumen_ast::BinaryOp;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn presets() -> IndexMap<String, StylePreset> {
        serde_json::from_value(json!({
            "button": {
                "base": "btn",
                "variants": {
                    "size": { "sm": "text-sm", "lg": "text-lg" },
                    "tone": { "primary": "bg-blue", "danger": "bg-red" },
                    "block": { "true": "w-full" }
                },
                "defaultVariants": { "size": "sm" }
            },
            "bare": { "variants": { "size": { "sm": "text-sm" } } }
        }))
        .unwrap()
    }

    fn resolve_with(expr: &Expression, state: &IndexMap<String, Value>) -> String {
        let styles = presets();
        let ctx = EvalContext::new(state, &DefaultHost).with_styles(&styles);
        evaluate_style(expr, &ctx)
    }

    // =========================================================================
    // Defaults and overrides
    // =========================================================================

    #[test]
    fn test_default_variant() {
        let expr = Expression::style("button", vec![]);
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "btn text-sm");
    }

    #[test]
    fn test_literal_override() {
        let expr = Expression::style("button", vec![("size", Expression::lit("lg"))]);
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "btn text-lg");
    }

    #[test]
    fn test_variants_follow_declaration_order() {
        let expr = Expression::style(
            "button",
            vec![
                ("tone", Expression::lit("danger")),
                ("size", Expression::lit("lg")),
            ],
        );
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "btn text-lg bg-red");
    }

    #[test]
    fn test_state_driven_variant() {
        let mut state = IndexMap::new();
        state.insert("wide".to_string(), Value::from(true));
        let expr = Expression::style("button", vec![("block", Expression::state("wide"))]);
        assert_eq!(resolve_with(&expr, &state), "btn text-sm w-full");
    }

    #[test]
    fn test_computed_variant() {
        let expr = Expression::style(
            "button",
            vec![(
                "size",
                Expression::cond(
                    Expression::bin(BinaryOp::Gt, Expression::lit(3), Expression::lit(1)),
                    Expression::lit("lg"),
                    Expression::lit("sm"),
                ),
            )],
        );
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "btn text-lg");
    }

    // =========================================================================
    // Degenerate inputs
    // =========================================================================

    #[test]
    fn test_undefined_override_contributes_nothing() {
        let expr = Expression::style("button", vec![("size", Expression::state("missing"))]);
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "btn");
    }

    #[test]
    fn test_unknown_variant_value() {
        let expr = Expression::style("button", vec![("size", Expression::lit("xl"))]);
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "btn");
    }

    #[test]
    fn test_empty_base() {
        let expr = Expression::style("bare", vec![("size", Expression::lit("sm"))]);
        assert_eq!(resolve_with(&expr, &IndexMap::new()), "text-sm");
    }

    #[test]
    fn test_unknown_preset_and_non_style() {
        assert_eq!(resolve_with(&Expression::style("nope", vec![]), &IndexMap::new()), "");
        assert_eq!(resolve_with(&Expression::lit("btn"), &IndexMap::new()), "");
    }
}

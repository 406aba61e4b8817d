//! Alias resolver (C9, §4.5): rewrites compiler-generated identifiers back
//! to user-chosen external names, and computes the resolved imported and
//! exported sets the dead-code pass (C11) and mangle pass (C12) need.

use std::collections::HashSet;

use crate::{
    env::Environment,
    ops::Sort,
    tree::{Kind, Tree},
};

pub struct Resolved {
    pub imported: HashSet<String>,
    pub exported: HashSet<String>,
}

/// Renames every `variable` leaf equal to an import alias to its target, and
/// every `variable` leaf carrying an export's compiler-prefixed name (or one
/// of its `_e<i>`/`_r<i>_c<j>` suffixed forms) to the export's target,
/// preserving the suffix (§4.5 step 1–2).
pub fn resolve(dst: &mut Tree, env: &Environment) -> Resolved {
    let mut imported = HashSet::new();
    let mut exported = HashSet::new();

    for (alias, target) in env.imports() {
        rename_exact(dst, alias, target);
        imported.insert(target.clone());
    }

    for (alias, target) in env.exports() {
        // `variable_index`/sort can't fail here: `add_export` already
        // required `alias` to be a bound variable.
        let sort = env
            .lookup_variable(alias, &crate::diagnostics::Context::new())
            .expect("export alias was validated at add_export time")
            .sort();
        let index = env
            .variable_index(alias, &crate::diagnostics::Context::new())
            .expect("export alias was validated at add_export time");
        let prefix = match sort {
            Sort::Scalar => format!("N{index}"),
            Sort::Vector => format!("V{index}"),
            Sort::Matrix => format!("M{index}"),
        };
        rename_by_prefix(dst, &prefix, target, &mut exported);
    }

    Resolved { imported, exported }
}

fn rename_exact(dst: &mut Tree, alias: &str, target: &str) {
    for node in dst.all_ids() {
        if dst.kind(node) == Kind::Variable && dst.value(node) == Some(alias) {
            dst.replace_in_place(node, Kind::Variable, Some(target.to_owned()), Vec::new());
        }
    }
}

fn rename_by_prefix(dst: &mut Tree, prefix: &str, target: &str, exported: &mut HashSet<String>) {
    for node in dst.all_ids() {
        if dst.kind(node) != Kind::Variable {
            continue;
        }
        let Some(name) = dst.value(node).map(str::to_owned) else {
            continue;
        };
        if let Some(suffix) = name.strip_prefix(prefix) {
            // Guard against e.g. prefix "N1" matching "N10": a real suffix
            // is either empty (bare scalar) or starts with `_`.
            if suffix.is_empty() || suffix.starts_with('_') {
                let renamed = format!("{target}{suffix}");
                dst.replace_in_place(node, Kind::Variable, Some(renamed.clone()), Vec::new());
                exported.insert(renamed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decimal::Decimal,
        diagnostics::Context,
        value::{Num, Value},
    };

    #[test]
    fn renames_import_alias_to_target() {
        let mut dst = Tree::new();
        let var = dst.leaf(Kind::Variable, "X");
        dst.branch(Kind::Line, vec![var]);
        let env = Environment::new().add_import("X", "x", &Context::new()).unwrap();
        let resolved = resolve(&mut dst, &env);
        assert_eq!(dst.value(var), Some("x"));
        assert!(resolved.imported.contains("x"));
    }

    #[test]
    fn renames_export_prefix_preserving_suffix() {
        let mut dst = Tree::new();
        let e0 = dst.leaf(Kind::Variable, "V0_e0");
        let e1 = dst.leaf(Kind::Variable, "V0_e1");
        dst.branch(Kind::Line, vec![e0, e1]);

        let (env, _) = Environment::new()
            .define_variable(
                "VEC",
                Value::Vector(crate::value::Vector::new(vec![Num::literal(Decimal::from_i64(1)), Num::literal(Decimal::from_i64(2))], &Context::new()).unwrap()),
                &Context::new(),
            )
            .unwrap();
        let env = env.add_export("VEC", "v", &Context::new()).unwrap();

        let resolved = resolve(&mut dst, &env);
        assert_eq!(dst.value(e0), Some("v_e0"));
        assert_eq!(dst.value(e1), Some("v_e1"));
        assert!(resolved.exported.contains("v_e0"));
        assert!(resolved.exported.contains("v_e1"));
    }
}

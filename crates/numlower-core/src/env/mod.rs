//! Environment (C6): the immutable-style mapping of identifiers to values,
//! macros, imports, and exports threaded through expansion.
//!
//! Every update consumes `self` and returns a fresh `Environment` (Design
//! Notes §9's "copy-on-write environment"). Since there is exactly one
//! environment alive per compilation and no branching reuse of an older
//! snapshot, ownership-transfer is simpler than an explicit persistent map
//! or snapshot/restore stack and observes identically from the outside.

pub mod macro_def;

use std::{collections::HashMap, rc::Rc};

use crate::{
    diagnostics::{CompileError, Context},
    ops::Sort,
    value::Value,
};

pub use macro_def::Macro;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, (Value, u32)>,
    macros: HashMap<String, Rc<Macro>>,
    imports: HashMap<String, String>,
    exports: HashMap<String, String>,
    scalar_count: u32,
    vector_count: u32,
    matrix_count: u32,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_in_use(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.macros.contains_key(name)
    }

    /// The index `define_variable` would allocate next for `sort`, without
    /// mutating anything. Callers use this to name a value's intermediate
    /// Dst identifiers before the value (and its post-assignment `Num`) is
    /// constructed, then pass that same value to `define_variable`.
    pub fn next_index(&self, sort: Sort) -> u32 {
        match sort {
            Sort::Scalar => self.scalar_count,
            Sort::Vector => self.vector_count,
            Sort::Matrix => self.matrix_count,
        }
    }

    /// Binds `name` to `value`, allocating the next per-sort index.
    /// Fails on redefinition (§3: variables are assignable exactly once) or
    /// if the name is already a macro (§3: variable and macro identifiers
    /// are disjoint).
    pub fn define_variable(mut self, name: &str, value: Value, context: &Context) -> Result<(Self, u32), CompileError> {
        if self.name_in_use(name) {
            return Err(CompileError::redefinition(format!("variable `{name}`"), context));
        }
        let index = match value.sort() {
            Sort::Scalar => {
                let i = self.scalar_count;
                self.scalar_count += 1;
                i
            }
            Sort::Vector => {
                let i = self.vector_count;
                self.vector_count += 1;
                i
            }
            Sort::Matrix => {
                let i = self.matrix_count;
                self.matrix_count += 1;
                i
            }
        };
        self.variables.insert(name.to_owned(), (value, index));
        Ok((self, index))
    }

    pub fn lookup_variable(&self, name: &str, context: &Context) -> Result<&Value, CompileError> {
        self.variables
            .get(name)
            .map(|(value, _)| value)
            .ok_or_else(|| CompileError::resolution(format!("variable `{name}`"), context))
    }

    pub fn variable_index(&self, name: &str, context: &Context) -> Result<u32, CompileError> {
        self.variables
            .get(name)
            .map(|(_, index)| *index)
            .ok_or_else(|| CompileError::resolution(format!("variable `{name}`"), context))
    }

    pub fn define_macro(mut self, macro_def: Macro, context: &Context) -> Result<Self, CompileError> {
        if self.name_in_use(&macro_def.name) {
            return Err(CompileError::redefinition(format!("macro `{}`", macro_def.name), context));
        }
        self.macros.insert(macro_def.name.clone(), Rc::new(macro_def));
        Ok(self)
    }

    pub fn lookup_macro(&self, name: &str, context: &Context) -> Result<Rc<Macro>, CompileError> {
        self.macros
            .get(name)
            .cloned()
            .ok_or_else(|| CompileError::resolution(format!("macro `{name}`"), context))
    }

    fn target_in_use(&self, target: &str) -> bool {
        self.imports.values().any(|t| t == target) || self.exports.values().any(|t| t == target)
    }

    /// Binds an import alias to an external target name. Fails if the alias
    /// is already imported or the target collides with any existing import
    /// or export target (§3).
    pub fn add_import(mut self, alias: &str, target: &str, context: &Context) -> Result<Self, CompileError> {
        if self.imports.contains_key(alias) {
            return Err(CompileError::redefinition(format!("import `{alias}`"), context));
        }
        if self.target_in_use(target) {
            return Err(CompileError::redefinition(format!("external name `{target}`"), context));
        }
        self.imports.insert(alias.to_owned(), target.to_owned());
        Ok(self)
    }

    /// Binds an export alias (a previously-defined variable) to an external
    /// target name, under the same target-uniqueness rule as imports.
    pub fn add_export(mut self, alias: &str, target: &str, context: &Context) -> Result<Self, CompileError> {
        self.lookup_variable(alias, context)?;
        if self.exports.contains_key(alias) {
            return Err(CompileError::redefinition(format!("export `{alias}`"), context));
        }
        if self.target_in_use(target) {
            return Err(CompileError::redefinition(format!("external name `{target}`"), context));
        }
        self.exports.insert(alias.to_owned(), target.to_owned());
        Ok(self)
    }

    pub fn import_target(&self, alias: &str) -> Option<&str> {
        self.imports.get(alias).map(String::as_str)
    }

    pub fn imports(&self) -> &HashMap<String, String> {
        &self.imports
    }

    pub fn exports(&self) -> &HashMap<String, String> {
        &self.exports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decimal::Decimal, value::Num};

    #[test]
    fn variables_and_macros_share_one_namespace() {
        let env = Environment::new();
        let ctx = Context::new();
        let (env, idx) = env.define_variable("A", Value::Scalar(Num::literal(Decimal::from_i64(1))), &ctx).unwrap();
        assert_eq!(idx, 0);
        assert!(env.define_variable("A", Value::Scalar(Num::literal(Decimal::from_i64(2))), &ctx).is_err());
    }

    #[test]
    fn import_and_export_targets_must_not_collide() {
        let env = Environment::new();
        let ctx = Context::new();
        let env = env.add_import("X", "x", &ctx).unwrap();
        let (env, _) = env.define_variable("A", Value::Scalar(Num::literal(Decimal::from_i64(1))), &ctx).unwrap();
        assert!(env.clone().add_export("A", "x", &ctx).is_err());
        let env = env.add_export("A", "a", &ctx).unwrap();
        assert_eq!(env.exports().get("A"), Some(&"a".to_owned()));
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Commands that only produce horizontal space.
pub const SPACING_COMMANDS: &[&str] = &[",", ":", ";", "!", "quad", "qquad"];

/// Commands that end a table row.
pub const ROW_BREAKS: &[&str] = &["\\", "cr"];

/// One argument position of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSlot {
    pub name: String,
    /// Source text used when an optional slot is skipped. A slot with a
    /// default is optional and only binds a `[...]` group.
    #[serde(default)]
    pub default: Option<String>,
    /// The slot holds a `{...}` table split on `&` and row breaks.
    #[serde(default)]
    pub tabular: bool,
}

impl ArgSlot {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            default: None,
            tabular: false,
        }
    }

    pub fn optional(name: &str, default: &str) -> Self {
        Self {
            name: name.to_owned(),
            default: Some(default.to_owned()),
            tabular: false,
        }
    }

    pub fn tabular(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            default: None,
            tabular: true,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// The argument layout of a named command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub slots: Vec<ArgSlot>,
}

impl CommandSpec {
    pub fn new(name: &str, slots: Vec<ArgSlot>) -> Self {
        Self {
            name: name.to_owned(),
            slots,
        }
    }

    /// A command without arguments.
    pub fn symbol(name: &str) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }
}

/// Maps command names to their argument layout.
///
/// ## Overview
///
/// The registry is append-only: [`CommandRegistry::define`] never replaces an
/// existing entry. Names that are not registered resolve to a fresh
/// zero-argument descriptor at lookup time, so a shared registry is never
/// written to while parsing.
///
/// [`CommandRegistry::global`] is the process-wide copy of the built-ins.
/// Callers that need extra commands build their own from
/// [`CommandRegistry::builtin`] and extend it, in code or from JSON.
///
/// ## Examples
///
/// ```
/// use texmath_syntax::{ArgSlot, CommandRegistry, CommandSpec};
///
/// let mut registry = CommandRegistry::builtin();
/// assert!(registry.define(CommandSpec::new("hat", vec![ArgSlot::required("token")])));
/// assert!(!registry.define(CommandSpec::symbol("frac")));
/// assert_eq!(registry.get("frac").unwrap().slots.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    specs: HashMap<String, Arc<CommandSpec>>,
}

static GLOBAL: Lazy<CommandRegistry> = Lazy::new(CommandRegistry::builtin);

impl CommandRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The process-wide registry, seeded with [`CommandRegistry::builtin`].
    pub fn global() -> &'static CommandRegistry {
        &GLOBAL
    }

    /// A registry holding the built-in math commands.
    pub fn builtin() -> Self {
        use ArgSlot as S;

        let mut registry = Self::empty();
        let token = || vec![S::required("token")];
        let entries = [
            ("begin", vec![S::required("name")]),
            ("end", vec![S::required("name")]),
            ("left", token()),
            ("right", token()),
            ("limits", vec![]),
            ("sqrt", vec![S::optional("n", "2"), S::required("token")]),
            ("frac", vec![S::required("upper"), S::required("lower")]),
            ("binom", vec![S::required("n"), S::required("k")]),
            ("mathrm", token()),
            ("sin", token()),
            ("cos", token()),
            ("tan", token()),
            ("ln", token()),
            ("log", token()),
            ("exp", token()),
            ("\\", vec![S::optional("spacing", "0")]),
            ("cr", vec![]),
            ("cap", vec![]),
            ("cup", vec![]),
            ("lceil", vec![]),
            ("rceil", vec![]),
            ("lfloor", vec![]),
            ("rfloor", vec![]),
            ("ds", vec![S::required("sym")]),
            ("over", vec![]),
            ("choose", vec![]),
            ("times", vec![]),
            ("cdot", vec![]),
            ("pi", vec![]),
            ("int", vec![]),
            ("sum", vec![]),
            ("matrix", vec![S::tabular("rows")]),
            ("pmatrix", vec![S::tabular("rows")]),
            ("bmatrix", vec![S::tabular("rows")]),
        ];
        for (name, slots) in entries {
            registry.define(CommandSpec::new(name, slots));
        }
        for name in SPACING_COMMANDS {
            registry.define(CommandSpec::symbol(name));
        }
        registry
    }

    /// Registers `spec`. Returns false if the name was already taken.
    pub fn define(&mut self, spec: CommandSpec) -> bool {
        if self.specs.contains_key(&spec.name) {
            return false;
        }
        self.specs.insert(spec.name.clone(), Arc::new(spec));
        true
    }

    /// Registers every descriptor in a JSON array of [`CommandSpec`]s and
    /// returns how many were new.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let specs: Vec<CommandSpec> = serde_json::from_str(json)?;
        Ok(specs.into_iter().filter_map(|spec| self.define(spec).then_some(())).count())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CommandSpec>> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Resolves `name`, synthesizing a zero-argument descriptor for unknown
    /// commands.
    pub fn resolve(&self, name: &str) -> Arc<CommandSpec> {
        match self.specs.get(name) {
            Some(spec) => Arc::clone(spec),
            None => {
                log::debug!("treating unknown command \\{name} as a symbol");
                Arc::new(CommandSpec::symbol(name))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts() {
        let registry = CommandRegistry::global();
        let sqrt = registry.get("sqrt").unwrap();
        assert_eq!(sqrt.slots.len(), 2);
        assert!(sqrt.slots[0].is_optional());
        assert_eq!(sqrt.slots[0].default.as_deref(), Some("2"));
        assert!(!sqrt.slots[1].is_optional());
        assert_eq!(registry.get("frac").unwrap().slot_index("lower"), Some(1));
        assert!(registry.get("limits").unwrap().slots.is_empty());
        assert!(registry.contains("qquad"));
    }

    #[test]
    fn test_define_is_append_only() {
        let mut registry = CommandRegistry::builtin();
        let before = registry.len();
        assert!(!registry.define(CommandSpec::symbol("frac")));
        assert_eq!(registry.get("frac").unwrap().slots.len(), 2);
        assert!(registry.define(CommandSpec::symbol("alpha")));
        assert_eq!(registry.len(), before + 1);
    }

    #[test]
    fn test_unknown_names_resolve_without_registering() {
        let registry = CommandRegistry::empty();
        let spec = registry.resolve("alpha");
        assert_eq!(spec.name, "alpha");
        assert!(spec.slots.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_extend_from_json() {
        let mut registry = CommandRegistry::builtin();
        let added = registry
            .extend_from_json(
                r#"[
                    {"name": "dfrac", "slots": [{"name": "upper"}, {"name": "lower"}]},
                    {"name": "frac"},
                    {"name": "hat", "slots": [{"name": "token"}]}
                ]"#,
            )
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(registry.get("dfrac").unwrap().slots.len(), 2);
        assert!(registry.extend_from_json("{").is_err());
    }
}

//! Name → operator kind lookup used by the parser.
//!
//! A `Registry` is filled once and then only read. The parser receives it by reference,
//! so tests can run against a custom or minimal registry; `Registry::global()` gives the
//! default one shared by the whole process.
use crate::symbolic::symbolic_engine::{Expr, OperatorKind};
use log::debug;
use std::collections::HashMap;
use std::sync::OnceLock;
use strum::IntoEnumIterator;

/// aliases on top of the canonical names (`OperatorKind` display names)
const ALIASES: [(&str, OperatorKind); 6] = [
    ("+", OperatorKind::Add),
    ("-", OperatorKind::Subtract),
    ("*", OperatorKind::Multiply),
    ("times", OperatorKind::Multiply),
    ("/", OperatorKind::Divide),
    ("frac", OperatorKind::Divide),
];

static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, OperatorKind>,
}

impl Registry {
    /// registry without any entry
    pub fn new() -> Registry {
        Registry {
            entries: HashMap::new(),
        }
    }

    /// every operator kind under its canonical name plus the symbol aliases
    /// (`+ - * / times frac`)
    pub fn with_builtins() -> Registry {
        let mut registry = Registry::new();
        for kind in OperatorKind::iter() {
            registry.register(&kind.to_string(), kind);
        }
        for (name, kind) in ALIASES {
            registry.register(name, kind);
        }
        registry
    }

    /// default registry, built on first use
    pub fn global() -> &'static Registry {
        GLOBAL_REGISTRY.get_or_init(Registry::with_builtins)
    }

    /// Associates `name` (case-sensitive) with `kind`; an existing entry is overwritten.
    pub fn register(&mut self, name: &str, kind: OperatorKind) {
        debug!("registered function {} -> {}", name, kind);
        self.entries.insert(name.to_string(), kind);
    }

    /// fresh operator node without arguments
    pub fn construct(&self, name: &str) -> Option<Expr> {
        self.entries.get(name).map(|kind| Expr::op(*kind))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<OperatorKind> {
        self.entries.get(name).copied()
    }

    /// sorted list of registered names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = Registry::with_builtins();
        for name in [
            "+", "add", "-", "sub", "*", "times", "mul", "/", "div", "frac", "pow", "sqrt",
            "sign", "abs", "sin", "cos", "tan", "cot", "ln", "log",
        ] {
            assert!(registry.is_registered(name), "{} is not registered", name);
        }
        assert_eq!(registry.len(), 20);
        assert!(!registry.is_registered("exp"));
        assert!(!registry.is_registered("Sin"));
    }

    #[test]
    fn test_construct_gives_childless_operator() {
        let registry = Registry::with_builtins();
        assert_eq!(
            registry.construct("frac"),
            Some(Expr::op(OperatorKind::Divide))
        );
        assert_eq!(registry.construct("times").and_then(|e| e.kind()), Some(OperatorKind::Multiply));
        assert_eq!(registry.construct("exp"), None);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register("f", OperatorKind::Sin);
        registry.register("f", OperatorKind::Cos);
        assert_eq!(registry.kind_of("f"), Some(OperatorKind::Cos));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = Registry::new();
        registry.register("sin", OperatorKind::Sin);
        registry.register("abs", OperatorKind::Abs);
        registry.register("+", OperatorKind::Add);
        assert_eq!(registry.names(), vec!["+", "abs", "sin"]);
    }

    #[test]
    fn test_global_is_shared() {
        let first = Registry::global() as *const Registry;
        let second = Registry::global() as *const Registry;
        assert_eq!(first, second);
        assert!(Registry::global().is_registered("log"));
    }
}

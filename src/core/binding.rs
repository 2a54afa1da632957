//! Platform bindings.
//!
//! A binding is a named compile-time definition that hides one platform
//! difference: a type name, a predicate expression, an error code, or a
//! declaration. Bindings are emitted alongside the `USE_` symbols and are
//! rendered as `#define`s in the C header output.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// The value of a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BindingValue {
    /// Defined with no value; presence is the information.
    Symbol,
    /// An integer constant.
    Integer(i64),
    /// An expression, usually a predicate over `s` or `e`.
    Expr(String),
    /// A type name.
    Type(String),
    /// An `extern` declaration that must precede uses of the name.
    Declaration(String),
}

impl BindingValue {
    /// The text a `#define` would carry, if any.
    pub fn define_text(&self) -> Option<String> {
        match self {
            BindingValue::Symbol | BindingValue::Declaration(_) => None,
            BindingValue::Integer(n) => Some(n.to_string()),
            BindingValue::Expr(e) | BindingValue::Type(e) => Some(e.clone()),
        }
    }
}

impl fmt::Display for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Symbol => write!(f, "(defined)"),
            BindingValue::Integer(n) => write!(f, "{}", n),
            BindingValue::Expr(e) | BindingValue::Type(e) | BindingValue::Declaration(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

/// A named binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub name: String,
    #[serde(flatten)]
    pub value: BindingValue,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: BindingValue) -> Self {
        Binding {
            name: name.into(),
            value,
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Binding::new(name, BindingValue::Symbol)
    }

    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Binding::new(name, BindingValue::Integer(value))
    }

    pub fn expr(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Binding::new(name, BindingValue::Expr(expr.into()))
    }

    pub fn type_name(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Binding::new(name, BindingValue::Type(ty.into()))
    }

    pub fn declaration(name: impl Into<String>, decl: impl Into<String>) -> Self {
        Binding::new(name, BindingValue::Declaration(decl.into()))
    }

    /// Render as C preprocessor text.
    pub fn to_c(&self) -> String {
        match &self.value {
            BindingValue::Declaration(decl) => decl.clone(),
            value => match value.define_text() {
                Some(text) => format!("#define {} {}", self.name, text),
                None => format!("#define {}", self.name),
            },
        }
    }
}

/// Bindings in emission order, unique by name.
///
/// Re-binding a name replaces the value but keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a binding.
    pub fn insert(&mut self, binding: Binding) {
        match self.index.get(&binding.name) {
            Some(&i) => self.bindings[i] = binding,
            None => {
                self.index.insert(binding.name.clone(), self.bindings.len());
                self.bindings.push(binding);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.index.get(name).map(|&i| &self.bindings[i].value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Extend<Binding> for BindingTable {
    fn extend<I: IntoIterator<Item = Binding>>(&mut self, iter: I) {
        for binding in iter {
            self.insert(binding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_as_c() {
        assert_eq!(Binding::symbol("USE_POSIX").to_c(), "#define USE_POSIX");
        assert_eq!(
            Binding::integer("NETDB_INTERNAL", -1).to_c(),
            "#define NETDB_INTERNAL -1"
        );
        assert_eq!(
            Binding::type_name("SOCKET_TYPE", "int").to_c(),
            "#define SOCKET_TYPE int"
        );
        assert_eq!(
            Binding::declaration("environ", "extern char **environ;").to_c(),
            "extern char **environ;"
        );
    }

    #[test]
    fn test_rebinding_keeps_position() {
        let mut table = BindingTable::new();
        table.insert(Binding::integer("A", 1));
        table.insert(Binding::integer("B", 2));
        table.insert(Binding::integer("A", 3));

        let names: Vec<&str> = table.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(table.get("A"), Some(&BindingValue::Integer(3)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_serialize() {
        let mut table = BindingTable::new();
        table.insert(Binding::expr("NOT_CONNECTED(e)", "((e) == ENOTCONN)"));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["name"], "NOT_CONNECTED(e)");
        assert_eq!(json[0]["kind"], "expr");
        assert_eq!(json[0]["value"], "((e) == ENOTCONN)");
    }
}

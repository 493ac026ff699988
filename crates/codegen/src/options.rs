//! Compiler configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use whisker_parser::ParseOptions;

/// How many positional parameters a known helper takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Arity {
    Any,
    Exactly(usize),
}

/// Helpers the compiler may assume exist at runtime.
///
/// A simple identifier naming a known helper always compiles to a direct
/// helper call, never to a context lookup. Deserializing replaces the whole
/// table, built-ins included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownHelpers(IndexMap<String, Arity>);

impl KnownHelpers {
    /// An empty table, without the built-ins.
    pub fn empty() -> Self {
        KnownHelpers(IndexMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, arity: Arity) -> &mut Self {
        self.0.insert(name.into(), arity);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Arity> {
        self.0.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arity> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for KnownHelpers {
    fn default() -> Self {
        let mut helpers = KnownHelpers::empty();
        helpers
            .insert("if", Arity::Exactly(1))
            .insert("unless", Arity::Exactly(1))
            .insert("with", Arity::Exactly(1))
            .insert("each", Arity::Exactly(1))
            .insert("lookup", Arity::Exactly(2))
            .insert("log", Arity::Any);
        helpers
    }
}

/// Options for [`compile`](crate::compile). Every field has a default, so a
/// partial JSON object deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Missing properties and helpers raise instead of rendering empty.
    pub strict: bool,
    /// Unqualified names search the whole context stack.
    pub compat: bool,
    /// Traversing through `null`/`undefined` is an error.
    pub assume_objects: bool,
    /// Emit a standalone partial's indentation once instead of on every line.
    pub prevent_indent: bool,
    pub known_helpers: KnownHelpers,
    /// Only names in `known_helpers` may be called as helpers.
    pub known_helpers_only: bool,
    /// Pass the source paths of params to helpers.
    pub track_ids: bool,
    /// Never HTML-escape output.
    pub no_escape: bool,
    /// A partial without a context param renders against an empty context.
    pub explicit_partial_context: bool,
    pub ignore_standalone: bool,
    pub track_locations: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            strict: false,
            compat: false,
            assume_objects: false,
            prevent_indent: false,
            known_helpers: KnownHelpers::default(),
            known_helpers_only: false,
            track_ids: false,
            no_escape: false,
            explicit_partial_context: false,
            ignore_standalone: false,
            track_locations: true,
        }
    }
}

impl CompileOptions {
    /// Parser options matching these compile options.
    pub fn parse_options(&self, source_name: Option<&str>) -> ParseOptions {
        ParseOptions {
            track_locations: self.track_locations,
            ignore_standalone: self.ignore_standalone,
            source_name: source_name.map(str::to_string),
        }
    }
}

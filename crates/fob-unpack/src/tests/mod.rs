//! Crate-level tests: full pipeline scenarios, smoke tests and property
//! tests. Unit tests live next to the code they cover.

mod pipeline_tests;

/// The stock browserify prelude, minus the table.
pub(crate) const PRELUDE: &str = r#"(function e(t,n,r){function s(o,u){if(!n[o]){if(!t[o]){var a=typeof require=="function"&&require;if(!u&&a)return a(o,!0);var f=new Error("Cannot find module '"+o+"'");throw f.code="MODULE_NOT_FOUND",f}var l=n[o]={exports:{}};t[o][0].call(l.exports,function(e){var n=t[o][1][e];return s(n?n:e)},l,l.exports,e,t,n,r)}return n[o].exports}var i=typeof require=="function"&&require;for(var o=0;o<r.length;o++)s(r[o]);return s})"#;

/// Builds browserify-shaped bundle text.
#[derive(Debug, Default)]
pub(crate) struct BundleBuilder {
    entries: Vec<String>,
    entry: u32,
}

impl BundleBuilder {
    pub(crate) fn new(entry: u32) -> Self {
        Self {
            entries: Vec::new(),
            entry,
        }
    }

    /// Add module `id` with `body` and dependencies on table ids.
    pub(crate) fn module(self, id: u32, body: &str, deps: &[(&str, u32)]) -> Self {
        let deps: Vec<(&str, String)> = deps
            .iter()
            .map(|(spec, target)| (*spec, target.to_string()))
            .collect();
        self.module_raw(id, body, &deps)
    }

    /// Add module `id` whose dependency values are written verbatim.
    pub(crate) fn module_raw(mut self, id: u32, body: &str, deps: &[(&str, String)]) -> Self {
        let map = deps
            .iter()
            .map(|(spec, value)| format!("{spec:?}:{value}"))
            .collect::<Vec<_>>()
            .join(",");
        self.entries.push(format!(
            "{id}:[function(require,module,exports){{\n{body}\n}},{{{map}}}]"
        ));
        self
    }

    pub(crate) fn build(&self) -> String {
        format!(
            "{PRELUDE}({{{}}},{{}},[{}]);\n",
            self.entries.join(",\n"),
            self.entry
        )
    }
}

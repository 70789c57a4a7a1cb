//! Isolated JavaScript evaluation for JSON modules.
//!
//! Browserify turns `require("./data.json")` into a factory whose body is
//! `module.exports = {...}`. To write the data back as JSON the factory is run
//! in a fresh boa context with dynamic code evaluation and timers removed,
//! `require` stubbed out, and loop/recursion limits applied. The exported
//! value is serialized with the engine's own `JSON.stringify` and re-read
//! with `serde_json` so key order is kept.

use boa_engine::{Context, Source};
use serde::{Deserialize, Serialize};

/// Globals removed before any module code runs.
const LOCKDOWN: &str = r#"
    eval = undefined;
    Function = undefined;
    setTimeout = undefined;
    setInterval = undefined;
    setImmediate = undefined;
"#;

/// Execution bounds for the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxLimits {
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 1_000_000,
            recursion_limit: 512,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to prepare sandbox: {0}")]
    Setup(String),

    #[error("module threw: {0}")]
    Evaluation(String),

    #[error("module.exports is not JSON-serializable")]
    NotSerializable,

    #[error("invalid JSON from module: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Run a module factory and return its `module.exports` as JSON.
pub fn evaluate_exports(
    factory_source: &str,
    limits: &SandboxLimits,
) -> Result<serde_json::Value, SandboxError> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(limits.loop_iteration_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(limits.recursion_limit);

    context
        .eval(Source::from_bytes(LOCKDOWN.as_bytes()))
        .map_err(|e| SandboxError::Setup(e.to_string()))?;

    let script = format!(
        r#"(function () {{
            var module = {{ exports: {{}} }};
            var require = function (name) {{ throw new Error("require('" + name + "') is not available"); }};
            ({factory_source})(require, module, module.exports);
            return JSON.stringify(module.exports);
        }})()"#
    );

    let result = context
        .eval(Source::from_bytes(script.as_bytes()))
        .map_err(|e| SandboxError::Evaluation(e.to_string()))?;

    let json = result
        .as_string()
        .and_then(|s| s.to_std_string().ok())
        .ok_or(SandboxError::NotSerializable)?;

    Ok(serde_json::from_str(&json)?)
}

/// Render `value` as 2-space indented JSON with a trailing newline.
pub fn to_pretty_json(value: &serde_json::Value) -> Result<String, SandboxError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluates_object_exports() {
        let factory = r#"function (require, module, exports) {
            module.exports = { "name": "demo", "version": "1.0.0", "keywords": ["a", "b"] };
        }"#;
        let value = evaluate_exports(factory, &SandboxLimits::default()).unwrap();
        assert_eq!(
            value,
            json!({ "name": "demo", "version": "1.0.0", "keywords": ["a", "b"] })
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let factory = r#"function (require, module) { module.exports = { "z": 1, "a": 2 }; }"#;
        let value = evaluate_exports(factory, &SandboxLimits::default()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_exports_assignment_through_exports_alias() {
        let factory = "function (require, module, exports) { exports.answer = 42; }";
        let value = evaluate_exports(factory, &SandboxLimits::default()).unwrap();
        assert_eq!(value, json!({ "answer": 42 }));
    }

    #[test]
    fn test_require_is_unavailable() {
        let factory = r#"function (require, module) { module.exports = require("fs"); }"#;
        let err = evaluate_exports(factory, &SandboxLimits::default()).unwrap_err();
        assert!(matches!(err, SandboxError::Evaluation(_)));
    }

    #[test]
    fn test_eval_is_removed() {
        let factory = r#"function (require, module) { module.exports = eval("1"); }"#;
        assert!(evaluate_exports(factory, &SandboxLimits::default()).is_err());
    }

    #[test]
    fn test_infinite_loop_is_bounded() {
        let factory = "function (require, module) { while (true) {} }";
        let limits = SandboxLimits {
            loop_iteration_limit: 1_000,
            ..SandboxLimits::default()
        };
        let err = evaluate_exports(factory, &limits).unwrap_err();
        assert!(matches!(err, SandboxError::Evaluation(_)));
    }

    #[test]
    fn test_undefined_exports_not_serializable() {
        let factory = "function (require, module) { module.exports = undefined; }";
        let err = evaluate_exports(factory, &SandboxLimits::default()).unwrap_err();
        assert!(matches!(err, SandboxError::NotSerializable));
    }

    #[test]
    fn test_pretty_json_has_trailing_newline() {
        let text = to_pretty_json(&json!({ "a": [1, 2] })).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}\n");
    }
}

//! Single-pass SQL writer
//!
//! `SqlWriter` is the transient rendering state for one `build()` call: an
//! output buffer plus the ordered list of bound argument values. It is created
//! per call, owned exclusively by that call, and never shared or reused across
//! statements, so placeholder numbering always starts at `$1`.

use serde_json::Value;

/// Rendering state for a single serialization pass.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    /// Allocate placeholder slots for `value`.
    ///
    /// Scalars (including `Null`) consume one slot. An array of scalars
    /// expands to a parenthesized, comma-separated group consuming one slot
    /// per element. Any other shape is a caller bug, not a runtime condition.
    pub(crate) fn bind(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                self.push("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.bind_scalar(item);
                }
                self.push(")");
            }
            _ => self.bind_scalar(value),
        }
    }

    fn bind_scalar(&mut self, value: &Value) {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                self.params.push(value.clone());
                let placeholder = format!("${}", self.params.len());
                self.push(&placeholder);
            }
            _ => panic!("don't know how to bind value: {:?}", value),
        }
    }

    /// Write a dot-qualified identifier, quoting each segment independently
    /// so reserved words and mixed-case names survive.
    pub(crate) fn push_ident(&mut self, segments: &[String]) {
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                self.push(".");
            }
            self.push("\"");
            let escaped = segment.replace('"', "\"\"");
            self.push(&escaped);
            self.push("\"");
        }
    }

    pub(crate) fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

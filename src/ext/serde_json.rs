// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path access into serde_json::Value for Jira's loosely shaped issue fields and rich-text comments
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (borrowed-str and borrowed-array views)
// invariants: No panics; missing paths or wrong shapes yield None / empty
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;

/// A location inside a JSON document that may or may not exist.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  /// Borrow the value as a non-empty string.
  pub fn str(&self) -> Option<&'a str> {
    self.inner.and_then(Value::as_str).filter(|s| !s.is_empty())
  }

  /// Borrow the value as an array; empty when absent or not an array.
  pub fn array(&self) -> &'a [Value] {
    self.inner.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
  }
}

/// Fetch nested values via dotted paths like `"fields.parent.key"`.
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let inner = path
      .split('.')
      .try_fold(self, |cur, key| cur.get(key).filter(|v| !v.is_null()));

    JsonFetched { inner }
  }
}

// Copyright (c) 2026 the taskpool authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde_json::Value;

/// Which calling convention a registered worker function expects.
///
/// The original implementation picked this by inspecting the target function's
/// signature at call time (kwargs-only vs. positional parameters). That kind of
/// introspection has no equivalent for a plain `fn` item in Rust, so the redesign
/// makes the choice an explicit, static part of the `Controller`'s configuration
/// instead of sniffing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// The function receives `(record, shared_data)` as two separate values.
    Positional,
    /// The function receives a single JSON object formed by merging `record`'s keys
    /// with `shared_data`'s keys; `shared_data` wins on key collision.
    KwargsMerged,
}

impl Default for CallStyle {
    fn default() -> Self {
        CallStyle::Positional
    }
}

/// The arguments handed to a registered worker function, shaped according to the
/// `Controller`'s configured [`CallStyle`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "style", content = "data")]
pub enum CallArgs {
    Positional { record: Value, shared: Value },
    Merged(Value),
}

impl CallArgs {
    /// Build the `CallArgs` for one worker from its input record and the broadcast
    /// payload, following `style`.
    pub fn build(style: CallStyle, record: Value, shared: Value) -> CallArgs {
        match style {
            CallStyle::Positional => CallArgs::Positional { record, shared },
            CallStyle::KwargsMerged => CallArgs::Merged(merge(record, shared)),
        }
    }
}

/// Merge two JSON objects, with `shared`'s keys winning on collision.
///
/// Non-object inputs are treated as empty objects, mirroring the original's
/// `process_data` / `shared_data` defaults of `{}`.
fn merge(record: Value, shared: Value) -> Value {
    let mut merged = match record {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Value::Object(shared_map) = shared {
        for (key, value) in shared_map {
            merged.insert(key, value);
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positional_keeps_record_and_shared_separate() {
        let args = CallArgs::build(CallStyle::Positional, json!({"x": 1}), json!({"y": 2}));
        assert_matches::assert_matches!(args, CallArgs::Positional { record, shared }
            if record == json!({"x": 1}) && shared == json!({"y": 2}));
    }

    #[test]
    fn merged_shared_wins_on_collision() {
        let args = CallArgs::build(
            CallStyle::KwargsMerged,
            json!({"x": 1, "shared_key": "from_record"}),
            json!({"y": 2, "shared_key": "from_shared"}),
        );
        let CallArgs::Merged(merged) = args else { panic!("expected Merged") };
        assert_eq!(merged["x"], json!(1));
        assert_eq!(merged["y"], json!(2));
        assert_eq!(merged["shared_key"], json!("from_shared"));
    }
}

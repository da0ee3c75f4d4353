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
use taskpool_common::CallArgs;

/// Signature every registered worker function must have.
///
/// A plain `fn` item (not a closure) is required: `taskpool`'s host process cannot
/// ship a closure's captured state across a fresh `exec`, so the only thing that can
/// cross the process boundary intact is the function's *name*, looked up again in the
/// re-executed child's own, independently-built registry.
pub type WorkerFn = fn(CallArgs) -> Result<Value, Value>;

/// One entry in the link-time worker registry, submitted via [`crate::worker`].
pub struct WorkerEntry {
    pub id: &'static str,
    pub function: WorkerFn,
}

inventory::collect!(WorkerEntry);

/// Look up a registered worker function by id.
///
/// Returns `None` if nothing was registered under that id in *this* binary — which
/// means either a typo, or the binary being re-exec'd is not the one that originally
/// constructed the `Controller`.
pub fn lookup(id: &str) -> Option<WorkerFn> {
    inventory::iter::<WorkerEntry>
        .into_iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.function)
}

/// Register a top-level `fn` under a stable string id so it can be resolved by name in
/// a re-executed worker process.
///
/// ```ignore
/// fn double(args: taskpool_common::CallArgs) -> Result<serde_json::Value, serde_json::Value> {
///     // ...
/// }
/// taskpool_worker::worker!("double", double);
/// ```
#[macro_export]
macro_rules! worker {
    ($id:expr, $function:expr) => {
        $crate::inventory::submit! {
            $crate::WorkerEntry { id: $id, function: $function }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo(args: CallArgs) -> Result<Value, Value> {
        match args {
            CallArgs::Positional { record, .. } => Ok(record),
            CallArgs::Merged(value) => Ok(value),
        }
    }

    crate::worker!("registry-test-echo", echo);

    #[test]
    fn registered_function_is_resolvable_by_id() {
        let function = lookup("registry-test-echo").expect("echo should be registered");
        let result = function(CallArgs::Positional { record: json!({"x": 1}), shared: json!({}) });
        assert_eq!(result, Ok(json!({"x": 1})));
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        assert!(lookup("does-not-exist").is_none());
    }
}

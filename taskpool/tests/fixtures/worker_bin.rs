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

//! Fixture binary re-executed by the integration tests as a real worker process.
//!
//! Registers a handful of small functions under fixed ids so tests can build a
//! `Controller` pointed at this binary (via `ControllerConfig::worker_binary`) instead
//! of `current_exe()`, the way the application under test would re-exec itself.

use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use taskpool_common::CallArgs;

fn echo(args: CallArgs) -> Result<Value, Value> {
    let CallArgs::Positional { record, shared } = args else {
        return Err(json!("echo expects Positional call style"));
    };
    Ok(json!({ "record": record, "shared": shared }))
}
taskpool_worker::worker!("echo", echo);

fn merged_echo(args: CallArgs) -> Result<Value, Value> {
    let CallArgs::Merged(value) = args else {
        return Err(json!("merged_echo expects KwargsMerged call style"));
    };
    Ok(value)
}
taskpool_worker::worker!("merged-echo", merged_echo);

fn always_fails(args: CallArgs) -> Result<Value, Value> {
    let CallArgs::Positional { record, .. } = args else {
        return Err(json!("always_fails expects Positional call style"));
    };
    Err(json!({ "reason": "intentional failure", "record": record }))
}
taskpool_worker::worker!("always-fails", always_fails);

fn always_panics(_args: CallArgs) -> Result<Value, Value> {
    panic!("intentional panic from fixture worker");
}
taskpool_worker::worker!("always-panics", always_panics);

/// Sleeps for `record["millis"]` milliseconds, logging before and after, then echoes
/// `record`. Used to exercise the concurrency bound and message ordering.
fn sleepy_echo(args: CallArgs) -> Result<Value, Value> {
    let CallArgs::Positional { record, .. } = args else {
        return Err(json!("sleepy_echo expects Positional call style"));
    };
    let millis = record["millis"].as_u64().unwrap_or(0);
    tracing::info!("starting sleep of {millis}ms");
    thread::sleep(Duration::from_millis(millis));
    tracing::info!("woke up");
    Ok(record)
}
taskpool_worker::worker!("sleepy-echo", sleepy_echo);

fn main() {
    taskpool_worker::dispatch_if_worker();
    eprintln!("taskpool-test-worker: not invoked as a worker, nothing to do");
}

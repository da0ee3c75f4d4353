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

use std::fs;
use std::io::{self, Write};
use std::panic;
use std::process;

use serde_json::Value;
use taskpool_common::{
    CallArgs, Offset, ResultRecord, WorkerOutcome, ENV_WORKER_ID, ENV_WORKER_INPUT_PATH, ENV_WORKER_OFFSET,
};

use crate::bridge::BridgeLayer;
use crate::registry::lookup;

/// Call this at the very top of `fn main()`, before any application logic.
///
/// If the process was re-executed by a `taskpool` host to run one worker, this
/// function never returns: it dispatches to the registered function, streams its log
/// output and result, and exits the process. If the process was started normally (the
/// environment variables this looks for aren't set), it returns immediately and the
/// caller's `main()` proceeds as usual.
pub fn dispatch_if_worker() {
    let Ok(worker_id) = std::env::var(ENV_WORKER_ID) else {
        return;
    };
    let offset = std::env::var(ENV_WORKER_OFFSET)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(Offset)
        .unwrap_or_else(|| fail_to_start(&worker_id, "missing or malformed worker offset"));
    let input_path = std::env::var(ENV_WORKER_INPUT_PATH)
        .unwrap_or_else(|_| fail_to_start(&worker_id, "missing worker input path"));

    let call_args = read_call_args(&worker_id, offset, &input_path);
    let function = lookup(&worker_id)
        .unwrap_or_else(|| fail_to_start(&worker_id, "no worker function registered under this id"));

    let outcome = run_with_bridge(offset, function, call_args);

    write_result_record(offset, &outcome);
    emit_control_frame(offset, &outcome);

    match outcome {
        WorkerOutcome::Ok(_) => process::exit(0),
        WorkerOutcome::Err(_) => process::exit(1),
    }
}

fn run_with_bridge(offset: Offset, function: crate::registry::WorkerFn, call_args: CallArgs) -> WorkerOutcome {
    let layer = BridgeLayer::new(offset, Box::new(io::stdout()));
    let subscriber = {
        use tracing_subscriber::prelude::*;
        tracing_subscriber::registry().with(layer)
    };

    let result = tracing::subscriber::with_default(subscriber, || {
        panic::catch_unwind(panic::AssertUnwindSafe(|| function(call_args)))
    });

    match result {
        Ok(Ok(value)) => WorkerOutcome::Ok(value),
        Ok(Err(error_value)) => WorkerOutcome::Err(error_value),
        Err(panic_payload) => WorkerOutcome::Err(Value::String(stringify_panic(panic_payload))),
    }
}

fn stringify_panic(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker function panicked with a non-string payload".to_string()
    }
}

fn read_call_args(worker_id: &str, offset: Offset, path: &str) -> CallArgs {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| fail_to_start(worker_id, &format!("failed to read input file {path}: {err}")));
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        emit_direct(offset, &format!("ERROR: failed to decode worker input: {err}"));
        emit_direct(offset, "ERROR");
        process::exit(1)
    })
}

fn write_result_record(offset: Offset, outcome: &WorkerOutcome) {
    let record = ResultRecord { offset, outcome: outcome.clone() };
    if let Ok(line) = serde_json::to_string(&record) {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "{line}");
        let _ = stderr.flush();
    }
}

fn emit_control_frame(offset: Offset, outcome: &WorkerOutcome) {
    if let WorkerOutcome::Err(value) = outcome {
        let message = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        emit_direct(offset, &format!("ERROR: {message}"));
        emit_direct(offset, "ERROR");
    }
    emit_direct(offset, "DONE");
}

/// Write a line straight to the message stream, bypassing the bridge. Control frames
/// (`DONE`, `ERROR`) are protocol signals, not log output, so they never carry a
/// severity prefix.
fn emit_direct(offset: Offset, body: &str) {
    let mut stdout = io::stdout();
    let _ = writeln!(stdout, "#{offset}-{body}");
    let _ = stdout.flush();
}

/// Last-resort path for a worker that can't even get far enough to run the registered
/// function (bad env, unreadable input file, unknown id). Reported the same way a
/// user-function error would be, then the process exits non-zero.
fn fail_to_start(worker_id: &str, reason: &str) -> ! {
    eprintln!("taskpool worker '{worker_id}' failed to start: {reason}");
    process::exit(1)
}

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

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Stdio;

use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use taskpool_common::{CallArgs, CallStyle, Frame, Offset, ProtocolError, ResultRecord};

use crate::error::LaunchError;

/// One message read off a worker's stdout, already parsed.
pub type MessageItem = Result<Frame, ProtocolError>;

/// Spawn one worker process bound to `offset`/`record`, wiring its stdout into
/// `message_tx` (parsed into frames) and its stderr into `result_tx` (parsed into
/// result records).
///
/// Returns the `Child` handle; the caller owns its lifetime (joining it after `DONE`,
/// or terminating it on cancellation).
pub async fn spawn_worker(
    offset: Offset,
    record: Value,
    shared_data: Value,
    call_style: CallStyle,
    worker_id: &str,
    worker_binary: Option<&PathBuf>,
    message_tx: mpsc::Sender<MessageItem>,
    result_tx: mpsc::Sender<ResultRecord>,
) -> Result<(Child, NamedTempFile), LaunchError> {
    let binary = match worker_binary {
        Some(path) => path.clone(),
        None => std::env::current_exe().map_err(LaunchError::CurrentExe)?,
    };

    let call_args = CallArgs::build(call_style, record, shared_data);
    let input_file = write_input_file(&call_args)?;

    let mut command = Command::new(&binary);
    command
        .env(taskpool_common::ENV_WORKER_ID, worker_id)
        .env(taskpool_common::ENV_WORKER_OFFSET, offset.0.to_string())
        .env(taskpool_common::ENV_WORKER_INPUT_PATH, input_file.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(LaunchError::Spawn)?;

    let stdout = child.stdout.take().ok_or(LaunchError::MissingStdio)?;
    let stderr = child.stderr.take().ok_or(LaunchError::MissingStdio)?;

    tokio::spawn(forward_messages(offset, stdout, message_tx));
    tokio::spawn(forward_results(stderr, result_tx));

    // The caller is responsible for keeping `input_file` alive until the worker has
    // exited: it only names the file, and the child reads it by path asynchronously
    // relative to this function returning.
    Ok((child, input_file))
}

fn write_input_file(call_args: &CallArgs) -> Result<NamedTempFile, LaunchError> {
    let mut file = NamedTempFile::new().map_err(LaunchError::WriteInput)?;
    let json = serde_json::to_vec(call_args).map_err(|err| LaunchError::WriteInput(err.into()))?;
    file.write_all(&json).map_err(LaunchError::WriteInput)?;
    file.flush().map_err(LaunchError::WriteInput)?;
    Ok(file)
}

async fn forward_messages(
    offset: Offset,
    stdout: tokio::process::ChildStdout,
    message_tx: mpsc::Sender<MessageItem>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let parsed = Frame::parse(&line);
                tracing::trace!(target: "taskpool::launcher", %offset, ?parsed, "message stream line");
                if message_tx.send(parsed).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(target: "taskpool::launcher", %offset, %err, "error reading worker stdout");
                return;
            }
        }
    }
}

async fn forward_results(stderr: tokio::process::ChildStderr, result_tx: mpsc::Sender<ResultRecord>) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match serde_json::from_str::<ResultRecord>(&line) {
            Ok(record) => {
                if result_tx.send(record).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                tracing::warn!(target: "taskpool::launcher", %err, %line, "malformed result record");
            }
        }
    }
}

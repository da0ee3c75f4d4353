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

//! Fan a single worker function out across a list of input records, each running in
//! its own OS process, and collect the ordered results.
//!
//! ```ignore
//! use serde_json::json;
//! use taskpool_common::CallArgs;
//! use taskpool::Controller;
//!
//! fn double(args: CallArgs) -> Result<serde_json::Value, serde_json::Value> {
//!     let CallArgs::Positional { record, .. } = args else { unreachable!() };
//!     let n = record["n"].as_i64().unwrap_or(0);
//!     Ok(json!(n * 2))
//! }
//! taskpool_worker::worker!("double", double);
//!
//! # async fn run() -> Result<(), taskpool::ControllerError> {
//! let data = vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
//! let results = Controller::new("double", data).execute(true).await?;
//! # Ok(())
//! # }
//! ```

mod collector;
mod config;
mod controller;
mod error;
mod launcher;
mod observer;
mod scheduler;
mod terminate;
mod worker_record;

pub use config::{ControllerConfig, DEFAULT_TIMEOUT};
pub use controller::Controller;
pub use error::{ControllerError, LaunchError};
pub use observer::{NoopObserver, Observer};

pub use taskpool_common::{format_duration, CallStyle, Offset, ProtocolError, WorkerId, WorkerOutcome};
pub use taskpool_worker::dispatch_if_worker;

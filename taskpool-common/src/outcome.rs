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

use crate::Offset;

/// The value a single worker contributed to the final result list.
///
/// Kept as a strict, explicit discriminant (rather than, say, inspecting the shape of
/// a JSON value) so a user function that legitimately returns something that merely
/// *looks* like an error representation is never mistaken for one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum WorkerOutcome {
    Ok(Value),
    Err(Value),
}

impl WorkerOutcome {
    pub fn is_err(&self) -> bool {
        matches!(self, WorkerOutcome::Err(_))
    }
}

/// One line written to the result stream by a worker: its offset and its outcome.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResultRecord {
    pub offset: Offset,
    pub outcome: WorkerOutcome,
}

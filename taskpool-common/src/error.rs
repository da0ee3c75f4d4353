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

/// Errors raised while parsing a line off the message stream.
///
/// A `BadFrame` is always fatal to the scheduler: it means a worker (or something
/// impersonating one) wrote something onto the message stream that doesn't match the
/// `#<offset>-<body>` grammar, which is a contract violation of the log bridge, not a
/// recoverable condition.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed frame {raw:?}: {reason}")]
    BadFrame { raw: String, reason: &'static str },
}

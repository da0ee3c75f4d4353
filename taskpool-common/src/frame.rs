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

use crate::{Offset, ProtocolError};

/// The severity tag a log line on the message stream was emitted with.
///
/// Mirrors the prefix the log bridge prepends: `ERROR: ` for anything at error level
/// or above, `WARN: ` for warning, `INFO: ` for info, and no prefix at all for debug
/// and trace (matching the original handler's `record.levelno` thresholds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Unmarked,
}

impl Severity {
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Error => "ERROR: ",
            Severity::Warn => "WARN: ",
            Severity::Info => "INFO: ",
            Severity::Unmarked => "",
        }
    }
}

/// The body of a control frame: either a worker finishing, or a worker reporting that
/// its user function failed (a `Done` frame always follows an `Error` frame for the
/// same offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Done,
    Error,
}

/// A single parsed line from the message stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `#<offset>-DONE` or `#<offset>-ERROR`.
    Control { offset: Offset, kind: ControlKind },
    /// Any other `#<offset>-<body>` line; `body` is handed to `process_message`
    /// verbatim, severity prefix included.
    Payload { offset: Offset, body: String },
}

impl Frame {
    pub fn offset(&self) -> Offset {
        match self {
            Frame::Control { offset, .. } => *offset,
            Frame::Payload { offset, .. } => *offset,
        }
    }

    /// Render this frame back to its wire form. Primarily used by the worker side to
    /// emit lines, and by tests to round-trip.
    pub fn to_wire(&self) -> String {
        match self {
            Frame::Control { offset, kind: ControlKind::Done } => format!("#{offset}-DONE"),
            Frame::Control { offset, kind: ControlKind::Error } => format!("#{offset}-ERROR"),
            Frame::Payload { offset, body } => format!("#{offset}-{body}"),
        }
    }

    /// Parse a single line off the message stream.
    ///
    /// `line` must not contain a trailing newline (callers read with a line-oriented
    /// reader that already strips it).
    pub fn parse(line: &str) -> Result<Frame, ProtocolError> {
        let bad_frame = |reason: &'static str| ProtocolError::BadFrame { raw: line.to_string(), reason };

        let rest = line.strip_prefix('#').ok_or_else(|| bad_frame("missing leading '#'"))?;
        let dash = rest.find('-').ok_or_else(|| bad_frame("missing '-' separator"))?;
        let (offset_str, body_with_dash) = rest.split_at(dash);
        let body = &body_with_dash[1..];

        if offset_str.is_empty() || !offset_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_frame("offset is not a non-negative integer"));
        }
        let offset: u32 = offset_str.parse().map_err(|_| bad_frame("offset does not fit in u32"))?;
        let offset = Offset(offset);

        match body {
            "DONE" => Ok(Frame::Control { offset, kind: ControlKind::Done }),
            "ERROR" => Ok(Frame::Control { offset, kind: ControlKind::Error }),
            _ => Ok(Frame::Payload { offset, body: body.to_string() }),
        }
    }
}

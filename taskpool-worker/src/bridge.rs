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

use std::io::Write;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use taskpool_common::{Offset, Severity};

/// A `tracing` layer that redirects every log event emitted while it's installed into
/// framed lines on the message stream, tagged with the worker's offset and a severity
/// prefix.
///
/// Scoped with [`tracing::subscriber::with_default`] rather than registered globally,
/// so installing and uninstalling it is purely a matter of entering and leaving that
/// scope — safe to do once per dispatch, with no process-wide leakage across workers
/// (relevant for the test harness, which dispatches multiple worker calls within one
/// process).
pub struct BridgeLayer {
    offset: Offset,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl BridgeLayer {
    pub fn new(offset: Offset, sink: Box<dyn Write + Send>) -> Self {
        BridgeLayer { offset, sink: Mutex::new(sink) }
    }

    fn write_line(&self, line: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(sink, "{line}");
        let _ = sink.flush();
    }
}

impl<S: Subscriber> Layer<S> for BridgeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageVisitor::default();
        event.record(&mut message);

        let severity = severity_for(*event.metadata().level());
        let line = format!("#{}-{}{}", self.offset, severity.prefix(), message.0);
        self.write_line(&line);
    }
}

fn severity_for(level: Level) -> Severity {
    match level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warn,
        Level::INFO => Severity::Info,
        Level::DEBUG | Level::TRACE => Severity::Unmarked,
    }
}

/// Captures the `message` field of a tracing event (i.e. what `tracing::info!("...")`
/// records), falling back to the first field seen if no `message` field is present.
#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" || self.0.is_empty() {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" || self.0.is_empty() {
            self.0 = value.to_string();
        }
    }
}

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

use std::time::Duration;

use taskpool_common::Offset;

/// Extension surface for external collaborators (progress bars, multi-line
/// dashboards, metrics) that want to react to scheduler events as they happen.
///
/// This replaces the original design's subclass-overridden hook methods with a single
/// polymorphic collaborator passed into the `Controller`, per the redesign guidance:
/// composition over inheritance. All methods have no-op default implementations, so an
/// observer only needs to implement the events it cares about.
///
/// A panicking override is a programming error in the observer and is allowed to
/// propagate — the scheduler does not catch panics out of hook calls.
pub trait Observer: Send + Sync {
    /// Called immediately after a worker process is spawned.
    fn on_start_process(&self, _offset: Offset) {}

    /// Called after a worker's `DONE` frame has been processed and its record
    /// finalized.
    fn on_complete_process(&self, _offset: Offset, _duration: Duration) {}

    /// Called for every non-control message on the message stream.
    fn process_message(&self, _offset: Offset, _payload: &str) {}

    /// Called unconditionally at the end of `Controller::execute`, success or
    /// failure — the moment for an observer to flush or restore terminal state.
    fn on_final(&self) {}
}

/// The default observer: observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use taskpool::{CallStyle, Controller, ControllerConfig, ControllerError, Observer, Offset, WorkerOutcome};

fn worker_binary() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_taskpool-test-worker"))
}

fn config_with(call_style: CallStyle, processes_to_start: Option<usize>) -> ControllerConfig {
    ControllerConfig {
        processes_to_start,
        timeout: Duration::from_secs(5),
        call_style,
        worker_binary: Some(worker_binary()),
    }
}

#[tokio::test]
async fn order_is_preserved_regardless_of_completion_order() {
    let data = vec![json!({"millis": 60}), json!({"millis": 10}), json!({"millis": 30})];
    let config = config_with(CallStyle::Positional, Some(3));

    let results = Controller::new("sleepy-echo", data.clone())
        .with_config(config)
        .execute(true)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    for (index, outcome) in results.iter().enumerate() {
        assert_eq!(*outcome, WorkerOutcome::Ok(data[index].clone()));
    }
}

#[tokio::test]
async fn concurrency_bound_is_respected() {
    #[derive(Default)]
    struct MaxAliveObserver {
        alive: AtomicUsize,
        max_alive: AtomicUsize,
    }

    impl Observer for MaxAliveObserver {
        fn on_start_process(&self, _offset: Offset) {
            let now = self.alive.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_alive.fetch_max(now, Ordering::SeqCst);
        }

        fn on_complete_process(&self, _offset: Offset, _duration: Duration) {
            self.alive.fetch_sub(1, Ordering::SeqCst);
        }
    }

    let observer = Arc::new(MaxAliveObserver::default());
    let data: Vec<_> = (0..6).map(|_| json!({"millis": 40})).collect();
    let config = config_with(CallStyle::Positional, Some(2));

    Controller::new("sleepy-echo", data)
        .with_config(config)
        .with_observer(observer.clone() as Arc<dyn Observer>)
        .execute(true)
        .await
        .unwrap();

    assert!(observer.max_alive.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn error_result_does_not_fail_run_without_raise_if_error() {
    let data = vec![json!({"x": 0}), json!({"x": 1}), json!({"x": 2})];
    let config = config_with(CallStyle::Positional, Some(3));

    let results = Controller::new("echo", data.clone())
        .with_config(config.clone())
        .execute(false)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);

    let failing_config = config_with(CallStyle::Positional, Some(3));
    let results = Controller::new("always-fails", data)
        .with_config(failing_config)
        .execute(false)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    for outcome in &results {
        assert!(outcome.is_err());
    }
}

#[tokio::test]
async fn raise_if_error_aggregates_offending_offsets() {
    let data = vec![json!({"x": 0}), json!({"x": 1})];
    let config = config_with(CallStyle::Positional, Some(2));

    let err = Controller::new("always-fails", data)
        .with_config(config)
        .execute(true)
        .await
        .unwrap_err();

    match err {
        ControllerError::Aggregate { offsets } => {
            assert_eq!(offsets, vec![Offset::new(0), Offset::new(1)]);
        }
        other => panic!("expected Aggregate, got {other:?}"),
    }
}

#[tokio::test]
async fn worker_panic_is_reported_as_error_outcome() {
    let data = vec![json!({})];
    let config = config_with(CallStyle::Positional, Some(1));

    let results = Controller::new("always-panics", data)
        .with_config(config)
        .execute(false)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[tokio::test]
async fn empty_input_returns_empty_results() {
    let config = config_with(CallStyle::Positional, Some(4));

    let final_called = Arc::new(Mutex::new(false));

    #[derive(Clone)]
    struct FinalFlag(Arc<Mutex<bool>>);
    impl Observer for FinalFlag {
        fn on_final(&self) {
            *self.0.lock().unwrap() = true;
        }
    }

    let results = Controller::new("echo", Vec::new())
        .with_config(config)
        .with_observer(Arc::new(FinalFlag(final_called.clone())))
        .execute(true)
        .await
        .unwrap();

    assert!(results.is_empty());
    assert!(*final_called.lock().unwrap());
}

#[tokio::test]
async fn processes_to_start_is_clamped_to_input_length() {
    let data = vec![json!({"millis": 5}), json!({"millis": 5})];
    let config = config_with(CallStyle::Positional, Some(50));

    let results = Controller::new("sleepy-echo", data.clone())
        .with_config(config)
        .execute(true)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn merged_call_style_combines_record_and_shared_with_shared_winning() {
    let data = vec![json!({"x": 1, "shared_key": "from_record"})];
    let config = config_with(CallStyle::KwargsMerged, Some(1));

    let results = Controller::new("merged-echo", data)
        .with_shared_data(json!({"y": 2, "shared_key": "from_shared"}))
        .with_config(config)
        .execute(true)
        .await
        .unwrap();

    let WorkerOutcome::Ok(value) = &results[0] else { panic!("expected Ok") };
    assert_eq!(value["x"], json!(1));
    assert_eq!(value["y"], json!(2));
    assert_eq!(value["shared_key"], json!("from_shared"));
}

#[tokio::test]
async fn terminate_processes_interrupts_a_running_execute_call() {
    let data: Vec<_> = (0..4).map(|_| json!({"millis": 5_000})).collect();
    let config = config_with(CallStyle::Positional, Some(4));

    let controller = Arc::new(Controller::new("sleepy-echo", data).with_config(config));

    let runner = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.execute(false).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.terminate_processes();

    let result = tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("execute should return promptly once terminated")
        .unwrap();

    assert!(matches!(result, Err(ControllerError::Interrupted)));
}

#[tokio::test]
async fn process_message_hook_sees_every_log_line_at_its_offset() {
    #[derive(Default)]
    struct CollectingObserver {
        lines: Mutex<Vec<(Offset, String)>>,
    }

    impl Observer for CollectingObserver {
        fn process_message(&self, offset: Offset, payload: &str) {
            self.lines.lock().unwrap().push((offset, payload.to_string()));
        }
    }

    let observer = Arc::new(CollectingObserver::default());
    let data = vec![json!({"millis": 5})];
    let config = config_with(CallStyle::Positional, Some(1));

    Controller::new("sleepy-echo", data)
        .with_config(config)
        .with_observer(observer.clone() as Arc<dyn Observer>)
        .execute(true)
        .await
        .unwrap();

    let lines = observer.lines.lock().unwrap();
    assert!(lines.iter().any(|(_, text)| text.contains("starting sleep")));
    assert!(lines.iter().any(|(_, text)| text.contains("woke up")));
}

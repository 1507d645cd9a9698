use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use sensetype_core::{Effect, Msg};
use sensetype_engine::{EngineConfig, EngineEvent, EngineHandle};

/// Executes core effects against the engine and pumps engine events back
/// into the message loop.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Self {
        let engine = EngineHandle::new(config);
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleTransform { text, template } => {
                    engine_debug!("ScheduleTransform input_len={}", text.len());
                    self.engine.input(text, template);
                }
                Effect::Transform { text, template } => {
                    engine_debug!("Transform input_len={}", text.len());
                    self.engine.transform(text, template);
                }
                Effect::CancelPending => {
                    self.engine.cancel();
                }
                Effect::Notify { message } => {
                    // The rendered notice is the user-facing channel; the log
                    // keeps a record for debugging.
                    engine_warn!("Transform failed: {}", message);
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::TransformStarted { request_id } => Msg::TransformStarted { request_id },
        EngineEvent::OutputCleared => Msg::OutputCleared,
        EngineEvent::TransformCompleted { request_id, result } => match result {
            Ok(result) => Msg::TransformSucceeded {
                request_id,
                text: result.text,
            },
            Err(err) if err.is_cancelled() => Msg::TransformCancelled { request_id },
            Err(err) => {
                engine_warn!("Request {} failed ({}): {}", request_id, err.kind, err);
                Msg::TransformFailed {
                    request_id,
                    message: err.message,
                }
            }
        },
    }
}

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::client::{ClientSettings, OpenRouterClient, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_REFERER};
use crate::debounce::Debouncer;
use crate::orchestrator::{Orchestrator, PromptBook};
use crate::types::{EngineEvent, PromptTemplate};

/// Debounce window applied to `input` commands.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub referer: String,
    pub debounce: Duration,
    pub prompts: Vec<PromptTemplate>,
    pub default_prompt: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            referer: DEFAULT_REFERER.to_owned(),
            debounce: DEFAULT_DEBOUNCE,
            prompts: Vec::new(),
            default_prompt: None,
        }
    }
}

enum EngineCommand {
    Input {
        text: String,
        selector: Option<String>,
    },
    Transform {
        text: String,
        selector: Option<String>,
    },
    Cancel,
    Shutdown,
}

/// Handle to the engine thread: a tokio runtime hosting the debouncer and
/// the orchestrator. Commands go in over one channel, `EngineEvent`s come
/// out over another, polled with `try_recv`.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let debounce_tx = cmd_tx.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let client = Arc::new(OpenRouterClient::new(ClientSettings {
                api_key: config.api_key,
                base_url: config.base_url,
                model: config.model,
                referer: config.referer,
            }));
            let prompts = PromptBook::new(config.prompts, config.default_prompt);
            let mut orchestrator =
                Orchestrator::new(client, prompts, event_tx, runtime.handle().clone());
            // Debounced input loops back in as an immediate Transform command,
            // so orchestrator state stays confined to this thread.
            let debouncer = Debouncer::new(
                runtime.handle(),
                config.debounce,
                move |(text, selector)| {
                    let _ = debounce_tx.send(EngineCommand::Transform { text, selector });
                },
            );

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Input { text, selector } => debouncer.call((text, selector)),
                    EngineCommand::Transform { text, selector } => {
                        orchestrator.process(text, selector)
                    }
                    EngineCommand::Cancel => {
                        debouncer.cancel();
                        orchestrator.cancel_in_flight();
                    }
                    EngineCommand::Shutdown => break,
                }
            }
            debouncer.cancel();
            orchestrator.cancel_in_flight();
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Debounced entry point for keystroke-level input.
    pub fn input(&self, text: impl Into<String>, selector: Option<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Input {
            text: text.into(),
            selector,
        });
    }

    /// Immediate transform, bypassing the debounce window.
    pub fn transform(&self, text: impl Into<String>, selector: Option<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Transform {
            text: text.into(),
            selector,
        });
    }

    /// Cancels the pending debounce and any in-flight request.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel);
    }

    /// Stops the engine thread, cancelling all pending work.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

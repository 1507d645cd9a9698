use std::io::{self, BufRead};
use std::mem;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn, LogDestination};
use sensetype_core::{
    default_templates, merge_templates, parse_templates, update, AppState, AppViewModel, Msg,
    DEFAULT_PROMPT,
};
use sensetype_engine::{EngineConfig, PromptTemplate};

use super::effects::EffectRunner;
use super::preferences::Preferences;

pub fn run_app() -> io::Result<()> {
    engine_logging::initialize(LogDestination::File);

    let preferences = Preferences::load(Path::new("."));
    let parsed = parse_templates(preferences.prompts.as_deref().unwrap_or(""));
    let template_error = parsed.error.clone();
    let templates = merge_templates(parsed.templates, default_templates());

    let mut state = AppState::with_templates(templates.clone());

    let mut config = EngineConfig {
        api_key: preferences.api_key.clone().unwrap_or_default(),
        prompts: templates
            .into_iter()
            .map(|template| PromptTemplate {
                name: template.name,
                prompt: template.prompt,
            })
            .collect(),
        default_prompt: Some(DEFAULT_PROMPT.to_owned()),
        ..EngineConfig::default()
    };
    if let Some(base_url) = &preferences.api_base_url {
        config.base_url = base_url.clone();
    }
    if let Some(model) = &preferences.model {
        config.model = model.clone();
    }

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config, msg_tx.clone());

    // Template parse errors surface once at startup.
    if let Some(error) = template_error {
        println!("[error] Template parse error: {error}");
        engine_warn!("Template parse error: {}", error);
    }

    print_banner(&state.view());
    spawn_stdin_reader(msg_tx);
    engine_info!("SenseType started");

    let mut closing = false;
    while !closing {
        let mut inbox = Vec::new();
        match msg_rx.recv_timeout(Duration::from_millis(75)) {
            Ok(msg) => inbox.push(msg),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        while let Ok(msg) = msg_rx.try_recv() {
            inbox.push(msg);
        }

        for msg in inbox {
            if matches!(msg, Msg::CloseRequested) {
                closing = true;
            }
            if let Msg::TemplateSelected(name) = &msg {
                if !state.has_template(name) {
                    println!("[note] unknown template {name:?}; the default prompt will be used");
                }
            }
            dispatch(&mut state, msg, &runner);
        }

        if state.consume_dirty() {
            render(&state.view());
        }
    }

    runner.shutdown();
    engine_info!("SenseType stopped");
    Ok(())
}

fn dispatch(state: &mut AppState, msg: Msg, runner: &EffectRunner) {
    let (next, effects) = update(mem::take(state), msg);
    *state = next;
    runner.enqueue(effects);
}

fn spawn_stdin_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let msg = parse_line(&line);
            let close = matches!(msg, Msg::CloseRequested);
            if msg_tx.send(msg).is_err() || close {
                return;
            }
        }
        // EOF on stdin closes the session like an explicit :quit.
        let _ = msg_tx.send(Msg::CloseRequested);
    });
}

fn parse_line(line: &str) -> Msg {
    let trimmed = line.trim();
    if let Some(name) = trimmed.strip_prefix(":template ") {
        return Msg::TemplateSelected(name.trim().to_owned());
    }
    match trimmed {
        ":quit" | ":q" => Msg::CloseRequested,
        ":regenerate" | ":r" => Msg::RegenerateRequested,
        _ => Msg::InputChanged(line.to_owned()),
    }
}

fn print_banner(view: &AppViewModel) {
    println!("SenseType — type text to transform it.");
    println!("Commands: :template NAME, :regenerate, :quit");
    println!("Templates: {}", view.template_names.join(", "));
}

fn render(view: &AppViewModel) {
    if let Some(notice) = &view.notice {
        println!("[error] {notice}");
    }
    let template = view.selected_template.as_deref().unwrap_or("-");
    if view.loading {
        println!("[{template}] processing...");
    } else if !view.output.is_empty() {
        println!("[{template}] {}", view.output);
    }
}

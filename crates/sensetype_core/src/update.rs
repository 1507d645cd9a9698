use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text.clone());
            // Blank input is scheduled too: its eventual processing clears
            // the output after the same quiet period as any other edit.
            let template = state.selected_template().map(ToOwned::to_owned);
            vec![Effect::ScheduleTransform { text, template }]
        }
        Msg::TemplateSelected(name) => {
            state.select_template(name.clone());
            let text = state.input().to_owned();
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![Effect::ScheduleTransform {
                    text,
                    template: Some(name),
                }]
            }
        }
        Msg::RegenerateRequested => {
            let text = state.input().to_owned();
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![Effect::Transform {
                    text,
                    template: state.selected_template().map(ToOwned::to_owned),
                }]
            }
        }
        Msg::TransformStarted { request_id } => {
            state.begin_request(request_id);
            Vec::new()
        }
        Msg::TransformSucceeded { request_id, text } => {
            if state.is_current(request_id) {
                state.apply_success(text);
            }
            Vec::new()
        }
        Msg::TransformFailed {
            request_id,
            message,
        } => {
            if state.is_current(request_id) {
                state.apply_failure(message.clone());
                vec![Effect::Notify { message }]
            } else {
                // Superseded failures are fully silenced: no display change,
                // no notification.
                Vec::new()
            }
        }
        Msg::TransformCancelled { request_id } => {
            if state.is_current(request_id) {
                state.finish_cancelled();
            }
            Vec::new()
        }
        Msg::OutputCleared => {
            state.clear_output();
            Vec::new()
        }
        Msg::CloseRequested => vec![Effect::CancelPending],
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

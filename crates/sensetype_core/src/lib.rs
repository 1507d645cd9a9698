//! SenseType core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod template;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, RequestId};
pub use template::{
    default_templates, merge_templates, parse_templates, ParsedTemplates, Template, DEFAULT_PROMPT,
};
pub use update::update;
pub use view_model::AppViewModel;

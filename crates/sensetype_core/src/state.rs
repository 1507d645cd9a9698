use crate::template::Template;
use crate::view_model::AppViewModel;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: String,
    selected_template: Option<String>,
    templates: Vec<Template>,
    output: String,
    last_good_output: String,
    loading: bool,
    current_request: Option<RequestId>,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state seeded with the merged template set; the first template
    /// is pre-selected, matching the surface's default dropdown entry.
    pub fn with_templates(templates: Vec<Template>) -> Self {
        let selected_template = templates.first().map(|template| template.name.clone());
        Self {
            templates,
            selected_template,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            input: self.input.clone(),
            output: self.output.clone(),
            loading: self.loading,
            selected_template: self.selected_template.clone(),
            template_names: self
                .templates
                .iter()
                .map(|template| template.name.clone())
                .collect(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns the dirty flag and resets it; the renderer redraws only when
    /// this returns true.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected_template(&self) -> Option<&str> {
        self.selected_template.as_deref()
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.iter().any(|template| template.name == name)
    }

    pub(crate) fn set_input(&mut self, text: String) {
        self.input = text;
        // Fresh typing dismisses any lingering error notice.
        self.notice = None;
        self.dirty = true;
    }

    pub(crate) fn select_template(&mut self, name: String) {
        self.selected_template = Some(name);
        self.dirty = true;
    }

    pub(crate) fn begin_request(&mut self, request_id: RequestId) {
        self.loading = true;
        self.current_request = Some(request_id);
        self.dirty = true;
    }

    /// True when `request_id` is the request the display is waiting on.
    /// Completions for any other id are stale and must be ignored.
    pub(crate) fn is_current(&self, request_id: RequestId) -> bool {
        self.current_request == Some(request_id)
    }

    pub(crate) fn apply_success(&mut self, text: String) {
        self.output = text.clone();
        self.last_good_output = text;
        self.loading = false;
        self.current_request = None;
        self.notice = None;
        self.dirty = true;
    }

    pub(crate) fn apply_failure(&mut self, message: String) {
        if !self.last_good_output.is_empty() {
            self.output = self.last_good_output.clone();
        }
        self.notice = Some(message);
        self.loading = false;
        self.current_request = None;
        self.dirty = true;
    }

    pub(crate) fn finish_cancelled(&mut self) {
        self.loading = false;
        self.current_request = None;
        self.dirty = true;
    }

    pub(crate) fn clear_output(&mut self) {
        self.output.clear();
        self.loading = false;
        self.current_request = None;
        self.dirty = true;
    }
}

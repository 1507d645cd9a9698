#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub output: String,
    pub loading: bool,
    pub selected_template: Option<String>,
    pub template_names: Vec<String>,
    pub notice: Option<String>,
    pub dirty: bool,
}

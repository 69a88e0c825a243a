use reqwest::Client;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: Client,
    pub(crate) backend_base_url: String,
}

impl AppState {
    pub(crate) fn new(backend_base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            backend_base_url: backend_base_url.into(),
        }
    }
}

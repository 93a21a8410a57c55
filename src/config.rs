use std::env;

const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_KEEP_ALIVE: &str = "300m";

/// Process-wide relay configuration, read from the environment once at
/// startup and passed into the router — never consulted as global state.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub ollama_base_url: String,
    pub model: String,
    /// How long Ollama should keep the model loaded after the request,
    /// forwarded verbatim as the `keep_alive` request field (e.g. "300m").
    pub keep_alive: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            keep_alive: env::var("OLLAMA_REQUEST_KEEP_ALIVE")
                .unwrap_or_else(|_| DEFAULT_KEEP_ALIVE.to_string()),
        }
    }

    /// Full URL of Ollama's streaming chat endpoint.
    pub fn chat_endpoint(&self) -> String {
        format!("{}/api/chat", self.ollama_base_url.trim_end_matches('/'))
    }
}

//! Server configuration.

/// Default model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Fixed assistant persona and citation instruction attached to every request.
pub const SYSTEM_INSTRUCTION: &str = "You are Friday, an AI friend designed to chat, assist, \
    and provide creative content like poems, stories, and more. Think step-by-step if needed \
    to explain your reasoning. If using search, cite relevant sources with URLs in your response.";

/// Configuration for the Friday server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Model used when the request omits one.
    pub default_model: String,
    /// System instruction attached to every generation request.
    pub system_instruction: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3040,
            default_model: DEFAULT_MODEL.to_string(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port number.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the default model.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Sets the system instruction.
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// The socket address string this configuration binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

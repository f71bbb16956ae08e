use clap::Parser;

/// Command line arguments for the greenprintd binary.
#[derive(Parser, Clone, Debug)]
pub struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
    /// Base URL of the generative API.
    #[arg(
        long = "base-url",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub base_url: String,
    #[arg(long = "chat-model", default_value = "gemini-1.5-flash")]
    pub chat_model: String,
    #[arg(long = "suggest-model", default_value = "gemini-2.0-flash-lite")]
    pub suggest_model: String,
    /// Credential for the generative API. Without it the advice endpoints
    /// answer 503 with fallback content.
    #[arg(long = "api-key", env = "GEMINI_API_KEY")]
    pub api_key: Option<String>,
}

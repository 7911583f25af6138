//! Provider Settings
//!
//! Credentials and endpoints for the model backends, loaded once at startup
//! and handed to the backend factory explicitly.

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key (`OPENAI_API_KEY`)
    pub api_key: Option<String>,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Optional organization header
    pub organization: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
            organization: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key (`GOOGLE_API_KEY`, falling back to `GEMINI_API_KEY`)
    pub api_key: Option<String>,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Settings for every supported backend
#[derive(Clone, Debug, Default)]
pub struct ProviderSettings {
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
}

impl ProviderSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = non_empty("PROVIDER_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let openai = OpenAiConfig {
            api_key: non_empty("OPENAI_API_KEY"),
            base_url: non_empty("OPENAI_BASE_URL")
                .map_or_else(|| DEFAULT_OPENAI_BASE_URL.into(), |url| trim_slash(&url)),
            organization: non_empty("OPENAI_ORGANIZATION"),
            timeout_secs,
        };

        let gemini = GeminiConfig {
            api_key: non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            base_url: non_empty("GEMINI_BASE_URL")
                .map_or_else(|| DEFAULT_GEMINI_BASE_URL.into(), |url| trim_slash(&url)),
            timeout_secs,
        };

        Self { openai, gemini }
    }
}

fn trim_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

use std::env;

lazy_static! {
    /// Process-wide configuration, read from the environment on first use.
    pub static ref CONFIG: Config = Config::from_env();
}

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Which capability turns story markdown into html.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkdownMode {
    /// The GitHub Markdown API.
    GitHub,
    /// Offline rendering with comrak.
    Local,
}

impl MarkdownMode {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "github" | "" => Some(MarkdownMode::GitHub),
            "local" | "comrak" => Some(MarkdownMode::Local),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub markdown: MarkdownMode,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Self {
        let markdown = match env::var("PLAYGIST_MARKDOWN") {
            Ok(value) => MarkdownMode::from_env_value(&value).unwrap_or_else(|| {
                warn!(value = %value, "unknown PLAYGIST_MARKDOWN, using the GitHub renderer");
                MarkdownMode::GitHub
            }),
            Err(_) => MarkdownMode::GitHub,
        };

        Config {
            api_url: env::var("GITHUB_API_URL")
                .ok()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: env::var("GITHUB_TOKEN").ok().filter(|token| !token.trim().is_empty()),
            markdown,
            ..Config::default()
        }
    }

    /// Configuration pointing at an arbitrary API root, used by tests.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Config {
            api_url: api_url.into(),
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            markdown: MarkdownMode::GitHub,
            user_agent: concat!("playgist/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

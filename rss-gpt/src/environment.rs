use std::env;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Process environment, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `OPENAI_API_KEY`; summarization is disabled without it.
    pub api_key: Option<String>,
    /// `OPENAI_PROXY`
    pub proxy: Option<String>,
    /// `OPENAI_BASE_URL`
    pub base_url: String,
    /// `U_NAME`, the GitHub user the pages are published under.
    pub user_name: Option<String>,
}

impl Environment {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_key: get("OPENAI_API_KEY"),
            proxy: get("OPENAI_PROXY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            user_name: get("U_NAME"),
        }
    }

    /// Public root of the generated files, with a trailing slash. `None`
    /// means links are written relative to the output directory.
    pub fn deployment_url(&self) -> Option<String> {
        self.user_name
            .as_ref()
            .map(|user| format!("https://{}.github.io/RSS-GPT/", user))
    }
}

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pimang", about = "Pimang community board")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the hosted backend project
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Public (anon) API key of the hosted backend project
    #[arg(long, env = "PIMANG_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Serve from an in-memory backend instead of the hosted one
    #[arg(long)]
    pub memory: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub board: BoardConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub in_memory: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
    pub secure_cookie: bool,
    /// Members with these emails get the admin page regardless of what
    /// the auth service says.
    pub admin_emails: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BoardConfig {
    pub popular_tag_window: usize,
    pub popular_tag_limit: usize,
    pub recent_comment_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: 10,
            in_memory: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "pimang_session".to_string(),
            session_hours: 168,
            secure_cookie: false,
            admin_emails: Vec::new(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            popular_tag_window: 200,
            popular_tag_limit: 20,
            recent_comment_limit: 10,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(Self::default_path);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref url) = cli.backend_url {
            config.backend.url = url.clone();
        }
        if let Some(ref key) = cli.anon_key {
            config.backend.anon_key = key.clone();
        }
        config.backend.in_memory = cli.memory;

        if !config.backend.in_memory && config.backend.url.trim().is_empty() {
            anyhow::bail!(
                "backend.url is not configured (set it in {} or pass --backend-url, or run with --memory)",
                config_path.display()
            );
        }

        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pimang")
            .join("config.toml")
    }

    pub fn is_admin_email(&self, email: Option<&str>) -> bool {
        match email {
            Some(email) => self
                .auth
                .admin_emails
                .iter()
                .any(|admin| admin.eq_ignore_ascii_case(email.trim())),
            None => false,
        }
    }
}

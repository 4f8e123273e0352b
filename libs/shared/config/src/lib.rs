use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_LISTENER_LIMIT: usize = 20;
pub const DEFAULT_SNIPPET_LENGTH: usize = 50;
pub const DEFAULT_DEDUP_WINDOW_SECS: u64 = 600;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub server_port: u16,
    /// Maximum number of records delivered per listener snapshot.
    pub listener_limit: usize,
    /// Characters of a chat message kept in a notification.
    pub snippet_length: usize,
    /// Window in which a redelivered trigger is treated as a duplicate. Zero disables.
    pub dedup_window_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            server_port: DEFAULT_SERVER_PORT,
            listener_limit: DEFAULT_LISTENER_LIMIT,
            snippet_length: DEFAULT_SNIPPET_LENGTH,
            dedup_window_secs: DEFAULT_DEDUP_WINDOW_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using in-memory notification store");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, requests will use the anon key");
                    String::new()
                }),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
            listener_limit: parse_var("NOTIFICATION_LISTENER_LIMIT", DEFAULT_LISTENER_LIMIT),
            snippet_length: parse_var("NOTIFICATION_SNIPPET_LENGTH", DEFAULT_SNIPPET_LENGTH),
            dedup_window_secs: parse_var("TRIGGER_DEDUP_WINDOW_SECS", DEFAULT_DEDUP_WINDOW_SECS),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - notifications will not survive a restart");
        }

        config
    }

    /// True when the Supabase backend can be used.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    /// Bearer token for server-side requests, falling back to the anon key.
    pub fn service_token(&self) -> &str {
        if self.supabase_service_role_key.is_empty() {
            &self.supabase_anon_key
        } else {
            &self.supabase_service_role_key
        }
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

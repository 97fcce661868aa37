use std::env;
use std::time::Duration;

/// Fixed texts the chat client shows for events that don't come from
/// the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Notices {
    pub initializing: String,
    pub stopped: String,
    pub connection_error: String,
}

impl Default for Notices {
    fn default() -> Self {
        Self {
            initializing: String::from("Initializing..."),
            stopped: String::from("Generation stopped"),
            connection_error: String::from("Something went wrong, could not connect to backend."),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub notices: Notices,
    pub agent_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let defaults = Notices::default();
        let api_url = env::var("STREAMCHAT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/chat".to_string());
        let request_timeout = env::var("STREAMCHAT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60 * 5);
        let agent_delay = env::var("STREAMCHAT_AGENT_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(100);
        let notices = Notices {
            initializing: env::var("STREAMCHAT_INITIAL_STATUS").unwrap_or(defaults.initializing),
            stopped: env::var("STREAMCHAT_STOPPED_NOTICE").unwrap_or(defaults.stopped),
            connection_error: env::var("STREAMCHAT_CONNECT_ERROR")
                .unwrap_or(defaults.connection_error),
        };

        Self {
            api_url,
            request_timeout: Duration::from_secs(request_timeout),
            notices,
            agent_delay: Duration::from_millis(agent_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            env::remove_var("STREAMCHAT_API_URL");
            env::remove_var("STREAMCHAT_REQUEST_TIMEOUT_SECS");
            env::remove_var("STREAMCHAT_STOPPED_NOTICE");
        }
        let config = AppConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/chat");
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert_eq!(config.notices.stopped, "Generation stopped");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            env::set_var("STREAMCHAT_API_URL", "http://example.com/chat");
            env::set_var("STREAMCHAT_REQUEST_TIMEOUT_SECS", "not a number");
            env::set_var("STREAMCHAT_STOPPED_NOTICE", "Halted");
        }
        let config = AppConfig::default();
        assert_eq!(config.api_url, "http://example.com/chat");
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert_eq!(config.notices.stopped, "Halted");

        unsafe {
            env::remove_var("STREAMCHAT_API_URL");
            env::remove_var("STREAMCHAT_REQUEST_TIMEOUT_SECS");
            env::remove_var("STREAMCHAT_STOPPED_NOTICE");
        }
    }
}

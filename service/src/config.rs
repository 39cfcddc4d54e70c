use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 21710;
pub const DEFAULT_LOG_PATH: &str = "/data/local/tmp/gesture-bridge/gesture-bridge.log";

pub const PORT_ENV: &str = "GESTURE_BRIDGE_PORT";
pub const LOG_ENV: &str = "GESTURE_BRIDGE_LOG";
// Set on the re-executed child to mark the daemon invocation.
pub const DAEMON_ENV: &str = "GESTURE_BRIDGE_DAEMON";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();
        if let Some(raw) = lookup(PORT_ENV) {
            if let Ok(port) = raw.parse() {
                settings.port = port;
            }
        }
        if let Some(path) = lookup(LOG_ENV) {
            settings.log_path = PathBuf::from(path);
        }
        settings
    }
}

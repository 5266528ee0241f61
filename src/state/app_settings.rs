use log::LevelFilter;

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl AppSettings {
    pub fn load() -> Self {
        Self { full_screen: false, log_level: env_log_level() }
    }
}

/// FARMTUI_LOG=debug raises the in-app log pane's verbosity.
fn env_log_level() -> Option<LevelFilter> {
    let raw = std::env::var("FARMTUI_LOG").ok()?;
    match raw.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

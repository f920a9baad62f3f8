//! Built-in stages.

mod banner;
mod command;
mod minify;

pub use banner::Banner;
pub use command::CommandStage;
pub use minify::{MinifyCss, MinifyJs, minify_css, minify_js};

/// Boolean setting, falling back to `default` when absent or mistyped.
fn bool_option(config: &toml::Table, key: &str, default: bool) -> bool {
    config.get(key).and_then(toml::Value::as_bool).unwrap_or(default)
}

/// Error message when `key` is present but not a boolean.
fn expect_bool(config: &toml::Table, key: &str) -> Option<String> {
    config
        .get(key)
        .filter(|value| !value.is_bool())
        .map(|_| format!("`{key}` must be a boolean"))
}

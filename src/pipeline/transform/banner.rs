//! `banner` stage: prepend text to each file.
//!
//! ```toml
//! js = [{ name = "minify-js" }, { name = "banner", text = "/*! app v1 */\n" }]
//! ```

use anyhow::{Result, bail};

use crate::pipeline::stage::{StageContext, Transform};

pub struct Banner;

impl Transform for Banner {
    fn name(&self) -> &'static str {
        "banner"
    }

    fn apply(&self, input: Vec<u8>, config: &toml::Table, _ctx: &StageContext) -> Result<Vec<u8>> {
        let Some(text) = config.get("text").and_then(toml::Value::as_str) else {
            bail!("`text` must be a string");
        };
        let mut out = Vec::with_capacity(text.len() + input.len());
        out.extend_from_slice(text.as_bytes());
        out.extend(input);
        Ok(out)
    }

    fn validate(&self, config: &toml::Table) -> Vec<String> {
        match config.get("text") {
            Some(toml::Value::String(_)) => Vec::new(),
            Some(_) => vec!["`text` must be a string".into()],
            None => vec!["`text` is required".into()],
        }
    }
}

//! `[stages]` section configuration.
//!
//! Ordered stage lists keyed by asset type:
//!
//! ```toml
//! [stages]
//! js = [{ name = "minify-js" }]
//! less = [{ name = "command", command = ["lessc", "-"] }, { name = "minify-css" }]
//! ```

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::block::AssetType;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::pipeline::{StageRegistry, StageSpec};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagesSection(pub BTreeMap<String, Vec<StageSpec>>);

impl StagesSection {
    pub fn validate(&self, registry: &StageRegistry, diag: &mut ConfigDiagnostics) {
        for (kind, specs) in &self.0 {
            if !AssetType::parse(kind).is_bundled() {
                diag.warn(
                    FieldPath::owned(format!("stages.{kind}")),
                    "not a bundled asset type, its stages never run",
                );
                continue;
            }
            for (i, spec) in specs.iter().enumerate() {
                let field = format!("stages.{kind}[{i}]");
                let Some(stage) = registry.get(&spec.name) else {
                    diag.error_with_hint(
                        FieldPath::owned(format!("{field}.name")),
                        format!("unknown stage `{}`", spec.name),
                        format!("known stages: {}", registry.names().join(", ")),
                    );
                    continue;
                };
                for message in stage.validate(&spec.config) {
                    diag.error(FieldPath::owned(field.clone()), message);
                }
            }
        }
    }

    pub fn to_map(&self) -> FxHashMap<String, Vec<StageSpec>> {
        self.0
            .iter()
            .map(|(kind, specs)| (kind.clone(), specs.clone()))
            .collect()
    }
}

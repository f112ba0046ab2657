//! Export scope
//!
//! Which layers feed which output channel, the ORM packing convention and
//! the execution summary, plus the rules an export must satisfy.

use serde::{Deserialize, Serialize};

use crate::execution::{classify_stack_with_overrides, ExecutionSummary, PathOverrides};
use crate::layers::{ExportTargets, FabricationState, MapTarget};

/// Channel assignment of the packed ORM texture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrmPacking {
    pub r: String,
    pub g: String,
    pub b: String,
}

impl Default for OrmPacking {
    fn default() -> Self {
        Self {
            r: "ao".to_string(),
            g: "roughness".to_string(),
            b: "metalness".to_string(),
        }
    }
}

/// Ids of contributing layers per map target, in stack order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBuckets {
    pub normal: Vec<String>,
    pub albedo: Vec<String>,
    pub orm_ao: Vec<String>,
    pub orm_roughness: Vec<String>,
    pub orm_metalness: Vec<String>,
}

impl ExportBuckets {
    pub fn bucket(&self, target: MapTarget) -> &[String] {
        match target {
            MapTarget::Normal => &self.normal,
            MapTarget::Albedo => &self.albedo,
            MapTarget::OrmAo => &self.orm_ao,
            MapTarget::OrmRoughness => &self.orm_roughness,
            MapTarget::OrmMetalness => &self.orm_metalness,
        }
    }

    fn bucket_mut(&mut self, target: MapTarget) -> &mut Vec<String> {
        match target {
            MapTarget::Normal => &mut self.normal,
            MapTarget::Albedo => &mut self.albedo,
            MapTarget::OrmAo => &mut self.orm_ao,
            MapTarget::OrmRoughness => &mut self.orm_roughness,
            MapTarget::OrmMetalness => &mut self.orm_metalness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportScope {
    pub buckets: ExportBuckets,
    pub orm_packing: OrmPacking,
    pub targets: ExportTargets,
    pub execution_plan: ExecutionSummary,
}

impl ExportScope {
    /// Scope without path overrides
    pub fn build(state: &FabricationState) -> Self {
        Self::build_with_overrides(state, &PathOverrides::new())
    }

    /// Only layers with strength above zero contribute. Solo flags are a
    /// preview concern and do not affect export.
    pub fn build_with_overrides(state: &FabricationState, overrides: &PathOverrides) -> Self {
        let mut buckets = ExportBuckets::default();
        for layer in state.layers.iter().filter(|l| l.is_active()) {
            buckets.bucket_mut(layer.map_target).push(layer.id.clone());
        }

        Self {
            buckets,
            orm_packing: OrmPacking::default(),
            targets: state.export_targets,
            execution_plan: classify_stack_with_overrides(state, overrides).summary(),
        }
    }

    /// Problems that block export; empty when the scope is exportable
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut require = |enabled: bool, export: &str, target: MapTarget| {
            if enabled && self.buckets.bucket(target).is_empty() {
                errors.push(format!(
                    "{} export is enabled but no active layer targets {}.",
                    export,
                    target.as_str()
                ));
            }
        };

        require(self.targets.normal, "Normal", MapTarget::Normal);
        require(self.targets.albedo, "Albedo", MapTarget::Albedo);
        for target in [MapTarget::OrmAo, MapTarget::OrmRoughness, MapTarget::OrmMetalness] {
            require(self.targets.orm, "ORM", target);
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

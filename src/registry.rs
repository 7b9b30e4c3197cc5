//! Feature registry
//!
//! Every secondary feature is described by a [`FeatureDescriptor`]: its name, the
//! raw features it reads, and the function computing it. Descriptors are collected
//! with [`FeatureRegistryBuilder`] at startup; the resulting [`FeatureRegistry`] is
//! immutable. One registry can be installed process-wide with
//! [`FeatureRegistry::install`], otherwise [`FeatureRegistry::global`] installs the
//! defaults on first use.

use crate::context::{FeatureContext, FeatureOptions};
use crate::error::ComputeError;
use crate::features::{data_quality, frechet, DATA_QUALITY, FRECHET};
use crate::types::{FeatureOutput, FeatureRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Signature shared by all registered features
pub type ComputeFn =
    fn(&FeatureContext<'_>, &FeatureRequest, &FeatureOptions) -> Result<FeatureOutput, ComputeError>;

/// Name, upstream dependencies and compute function of a feature
#[derive(Clone)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub dependencies: Vec<&'static str>,
    pub compute: ComputeFn,
}

/// Serializable view of a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl std::fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl FeatureDescriptor {
    pub fn new(name: &'static str, dependencies: &[&'static str], compute: ComputeFn) -> Self {
        Self {
            name,
            dependencies: dependencies.to_vec(),
            compute,
        }
    }

    pub fn info(&self) -> FeatureInfo {
        FeatureInfo {
            name: self.name.to_string(),
            dependencies: self.dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Immutable set of registered features
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: BTreeMap<&'static str, FeatureDescriptor>,
}

/// Collects descriptors before the registry is frozen
#[derive(Debug, Default)]
pub struct FeatureRegistryBuilder {
    features: BTreeMap<&'static str, FeatureDescriptor>,
}

impl FeatureRegistryBuilder {
    /// Add a descriptor. Names must be unique.
    pub fn register(mut self, descriptor: FeatureDescriptor) -> Result<Self, ComputeError> {
        if self.features.contains_key(descriptor.name) {
            return Err(ComputeError::DuplicateFeature(descriptor.name.to_string()));
        }
        self.features.insert(descriptor.name, descriptor);
        Ok(self)
    }

    pub fn build(self) -> FeatureRegistry {
        FeatureRegistry {
            features: self.features,
        }
    }
}

static GLOBAL_REGISTRY: OnceLock<FeatureRegistry> = OnceLock::new();

impl FeatureRegistry {
    pub fn builder() -> FeatureRegistryBuilder {
        FeatureRegistryBuilder::default()
    }

    /// Registry holding the bundled features
    pub fn with_defaults() -> Self {
        let mut features = BTreeMap::new();
        for descriptor in default_descriptors() {
            features.insert(descriptor.name, descriptor);
        }
        Self { features }
    }

    /// Install `registry` as the process-wide registry. Allowed once.
    pub fn install(registry: FeatureRegistry) -> Result<&'static FeatureRegistry, ComputeError> {
        GLOBAL_REGISTRY
            .set(registry)
            .map_err(|_| ComputeError::RegistryInitialized)?;
        Ok(FeatureRegistry::global())
    }

    /// The process-wide registry, defaulting to [`FeatureRegistry::with_defaults`]
    pub fn global() -> &'static FeatureRegistry {
        GLOBAL_REGISTRY.get_or_init(FeatureRegistry::with_defaults)
    }

    pub fn get(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.features.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Raw features `name` depends on
    pub fn dependencies(&self, name: &str) -> Result<&[&'static str], ComputeError> {
        self.get(name)
            .map(|d| d.dependencies.as_slice())
            .ok_or_else(|| ComputeError::UnknownFeature(name.to_string()))
    }

    /// Run a registered feature
    pub fn compute(
        &self,
        name: &str,
        ctx: &FeatureContext<'_>,
        request: &FeatureRequest,
        options: &FeatureOptions,
    ) -> Result<FeatureOutput, ComputeError> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| ComputeError::UnknownFeature(name.to_string()))?;
        log::debug!(
            "computing {} for {} over [{}, {})",
            name,
            request.id,
            request.start,
            request.end
        );
        (descriptor.compute)(ctx, request, options)
    }
}

fn compute_data_quality(
    ctx: &FeatureContext<'_>,
    request: &FeatureRequest,
    options: &FeatureOptions,
) -> Result<FeatureOutput, ComputeError> {
    let sensor = options.sensor.as_deref().unwrap_or_default();
    data_quality(ctx, request, sensor, options.bin_size).map(FeatureOutput::from)
}

fn compute_frechet(
    ctx: &FeatureContext<'_>,
    request: &FeatureRequest,
    options: &FeatureOptions,
) -> Result<FeatureOutput, ComputeError> {
    frechet(ctx, request, options.lookback_ms).map(FeatureOutput::from)
}

/// Descriptors of the bundled features
pub fn default_descriptors() -> Vec<FeatureDescriptor> {
    vec![
        FeatureDescriptor::new(
            DATA_QUALITY,
            &["lamp.accelerometer", "lamp.gps"],
            compute_data_quality,
        ),
        FeatureDescriptor::new(FRECHET, &["lamp.gps"], compute_frechet),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CortexConfig;
    use crate::diagnostics::MemorySink;
    use crate::source::MemorySource;
    use crate::types::{AccelerometerSample, FeatureValue};
    use pretty_assertions::assert_eq;

    fn constant(
        _ctx: &FeatureContext<'_>,
        request: &FeatureRequest,
        _options: &FeatureOptions,
    ) -> Result<FeatureOutput, ComputeError> {
        Ok(FeatureValue {
            timestamp: request.start,
            value: Some(42.0),
        }
        .into())
    }

    #[test]
    fn test_defaults() {
        let registry = FeatureRegistry::with_defaults();
        assert_eq!(registry.names(), vec![DATA_QUALITY, FRECHET]);
        assert_eq!(
            registry.dependencies(DATA_QUALITY).unwrap(),
            &["lamp.accelerometer", "lamp.gps"]
        );
        assert_eq!(registry.dependencies(FRECHET).unwrap(), &["lamp.gps"]);
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let result = FeatureRegistry::builder()
            .register(FeatureDescriptor::new("custom", &[], constant))
            .and_then(|b| b.register(FeatureDescriptor::new("custom", &[], constant)));
        assert!(matches!(result, Err(ComputeError::DuplicateFeature(name)) if name == "custom"));
    }

    #[test]
    fn test_unknown_feature() {
        let registry = FeatureRegistry::builder().build();
        assert!(registry.is_empty());

        let source = MemorySource::new();
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let result = registry.compute(
            "cortex.feature.missing",
            &ctx,
            &FeatureRequest::new("U1", 0, 1000),
            &FeatureOptions::default(),
        );
        assert!(matches!(result, Err(ComputeError::UnknownFeature(_))));
        assert!(registry.dependencies("cortex.feature.missing").is_err());
    }

    #[test]
    fn test_custom_registration_dispatches() {
        let registry = FeatureRegistry::builder()
            .register(FeatureDescriptor::new("custom", &["lamp.gps"], constant))
            .unwrap()
            .build();

        let source = MemorySource::new();
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let output = registry
            .compute(
                "custom",
                &ctx,
                &FeatureRequest::new("U1", 7, 8),
                &FeatureOptions::default(),
            )
            .unwrap();
        assert_eq!(output.timestamp(), 7);
        assert_eq!(output.scalar(), Some(42.0));
    }

    #[test]
    fn test_compute_data_quality_through_registry() {
        let mut source = MemorySource::new();
        for t in [0, 1000, 2000] {
            source.insert_accelerometer(
                "U1",
                AccelerometerSample {
                    timestamp: t,
                    x: 0.0,
                    y: 0.0,
                    z: 1.0,
                },
            );
        }
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let output = FeatureRegistry::with_defaults()
            .compute(
                DATA_QUALITY,
                &ctx,
                &FeatureRequest::new("U1", 0, 3000),
                &FeatureOptions::default().with_sensor("accelerometer"),
            )
            .unwrap();

        assert_eq!(
            output,
            FeatureOutput::Value(FeatureValue {
                timestamp: 0,
                value: Some(1.0)
            })
        );
    }

    #[test]
    fn test_missing_sensor_option_is_unsupported() {
        let source = MemorySource::new();
        let sink = MemorySink::new();
        let config = CortexConfig::default();
        let ctx = FeatureContext::new(&source, &sink, &config);

        let output = FeatureRegistry::with_defaults()
            .compute(
                DATA_QUALITY,
                &ctx,
                &FeatureRequest::new("U1", 0, 3000),
                &FeatureOptions::default(),
            )
            .unwrap();

        assert_eq!(output.scalar(), None);
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_global_registry_is_stable() {
        let first = FeatureRegistry::global();
        let second = FeatureRegistry::global();
        assert!(std::ptr::eq(first, second));
        assert!(first.contains(DATA_QUALITY));
        assert!(matches!(
            FeatureRegistry::install(FeatureRegistry::with_defaults()),
            Err(ComputeError::RegistryInitialized)
        ));
    }

    #[test]
    fn test_feature_info_serializes() {
        let registry = FeatureRegistry::with_defaults();
        let info: Vec<FeatureInfo> = registry.iter().map(FeatureDescriptor::info).collect();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json[1]["name"], FRECHET);
        assert_eq!(json[1]["dependencies"][0], "lamp.gps");
    }
}

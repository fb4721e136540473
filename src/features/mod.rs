//! Writing features: descriptors, the built-in table, collectors and the registry.

pub mod builtin;
pub mod collector;
pub mod descriptor;
pub mod registry;

pub use collector::{FeatureCollector, FeatureValue};
pub use descriptor::{
    CollectionPolicy, FeatureDescriptor, FeatureOrigin, LevelSet, identity_from_name,
};
pub use registry::{build_feature_set, color_maps};

//! Turning raw model answers into stored feature values.

mod normalizer;
mod reconciler;

pub use normalizer::normalize;
pub use reconciler::reconcile;

pub mod feature_weight;

pub use feature_weight::FeatureWeight;

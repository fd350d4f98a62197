//! Feature preprocessing: scaling, encoding, and the DataFrame → matrix seam
//!
//! The `FeaturePipeline` reproduces at inference time exactly the transform
//! fitted at training time: same columns, same order, same parameters.

mod encoder;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use pipeline::FeaturePipeline;
pub use scaler::StandardScaler;

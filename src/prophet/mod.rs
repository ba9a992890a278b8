pub mod artifact;
pub mod seasonality;
pub mod trend;

pub use artifact::ProphetArtifact;

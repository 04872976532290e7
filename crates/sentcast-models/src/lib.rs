//! Reference forecast models for sentcast.
//!
//! This crate provides [`ForecastModel`](sentcast_traits::ForecastModel)
//! implementations usable out of the box, plus a serde-friendly
//! [`ModelSpec`] that turns config entries into boxed models.
//!
//! - [`PersistenceModel`]: tomorrow equals today
//! - [`RidgeRegression`]: closed-form L2-regularized linear regression with
//!   residual-based prediction intervals
//!
//! # Examples
//!
//! ```rust,no_run
//! use ndarray::array;
//! use sentcast_models::ModelSpec;
//! use sentcast_traits::FeatureMatrix;
//!
//! let features = FeatureMatrix::new(
//!     vec!["lag_close_norm_1".to_string()],
//!     array![[0.1], [0.3], [0.2]],
//! )
//! .unwrap();
//!
//! let mut model = ModelSpec::ridge(1.0).build();
//! model.fit(&features, &[0.3, 0.2, 0.4]).unwrap();
//! let forecast = model.predict(&features).unwrap();
//! ```

mod persistence;
mod ridge;
mod spec;

// Re-export main types
pub use persistence::{PersistenceConfig, PersistenceModel};
pub use ridge::{RidgeConfig, RidgeRegression, Z_80};
pub use spec::{ModelSpec, ridge_alpha_grid};

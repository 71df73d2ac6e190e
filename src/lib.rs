//! # kmeans-engine - API documentation
//!
//! kmeans-engine is a small rust library for k-means clustering of real-valued points.
//!
//! ## API surfaces
//! The crate offers two ways of clustering data:
//! - A stepwise engine: [`PointSet`] holds the points, [`ClusteringEngine`] owns a list of [`Cluster`]s
//!   over that point set and advances a Lloyd iteration one partition/update step at a time.
//!   This is the surface to use when the caller wants to inspect or drive the iteration.
//! - A one-shot routine: [`kmeans`] (or [`KMeans::kmeans_lloyd`] for more control) runs a complete
//!   clustering with random or k-means++ initialization and returns the labels, centroids,
//!   inertia and iteration count as a [`KMeansState`].
//!
//! ## Supported centroid initializations
//! The outcome of each k-means run depends on the initialization of its clusters. For a list of
//! implemented initialization methods, see [`KMeans`]. All randomness is drawn from the generator
//! configured in [`KMeansConfig`], so a seeded generator gives repeatable results.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example (one-shot)
//! ```rust
//! use kmeans_engine::*;
//!
//! fn main() {
//!     let points = vec![
//!         vec![0.0f64, 0.0], vec![0.1, 0.2], vec![0.2, 0.1],
//!         vec![5.0, 5.0], vec![5.1, 4.9], vec![4.9, 5.2],
//!     ];
//!     let conf = KMeansConfig::build().random_seed(42).build();
//!     let result = kmeans(&points, 2, 100, InitMethod::KMeansPlusPlus, &conf).unwrap();
//!
//!     println!("Centroids: {:?}", result.centroids);
//!     println!("Labels: {:?}", result.assignments);
//!     println!("Inertia: {}", result.distsum);
//!     assert_eq!(result.assignments[0], result.assignments[1]);
//!     assert_ne!(result.assignments[0], result.assignments[3]);
//! }
//! ```
//!
//! ## Example (stepwise engine)
//! ```rust
//! use kmeans_engine::*;
//!
//! fn main() {
//!     let points = PointSet::from_rows(2, &[
//!         [0.0f64, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0],
//!     ]).unwrap();
//!     let mut engine = ClusteringEngine::with_seed_indices(&points, &[0, 3]).unwrap();
//!
//!     let converged = engine.run(10).unwrap();
//!     for cluster in engine.clusters() {
//!         println!("{} <- {:?}", cluster, cluster.members());
//!     }
//!     println!("converged: {}, inertia: {}", converged, engine.inertia());
//! }
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kmeans_engine::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims, k, max_iter) = (2000, 20, 4, 2500);
//!
//!     // Generate some random data
//!     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//!     samples.iter_mut().for_each(|v| *v = rand::random());
//!
//!     let conf = KMeansConfig::build()
//!         .init_done(&|_| println!("Initialization completed."))
//!         .iteration_done(&|s, nr, new_distsum|
//!             println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
//!                 nr, s.distsum, new_distsum, s.distsum - new_distsum))
//!         .build();
//!
//!     let kmean = KMeans::new(samples, sample_cnt, sample_dims, EuclideanDistance).unwrap();
//!     let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_random_sample, &conf).unwrap();
//!
//!     println!("Centroids: {:?}", result.centroids);
//!     println!("Cluster-Assignments: {:?}", result.assignments);
//!     println!("Error: {}", result.distsum);
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the one-shot surface is the [`KMeans`] struct. This struct is generic over the underlying primitive
//! type, that should be used for the calculations. To use it, an instance of this struct is created, taking
//! over the sample data into its ownership.
//!
//! Calling a variant method (e.g. [`KMeans::kmeans_lloyd`]) on the struct does not mutate it, so multiple runs can be
//! done in parallel (the assignment step itself is already parallellized though). Internally, a new instance of
//! [`KMeansState`] is used to store the state (and finally the result) of a k-means calculation.
//!
//! ## Logging
//! The crate emits [`tracing`] events: `debug` per finished iteration/step, `trace` for centroid
//! updates and empty cluster handling, `warn` when k-means++ has to fall back to uniform sampling.
//! No subscriber is installed by the library.

#[macro_use] mod helpers;
mod memory;
mod error;
mod api;
mod pointset;
mod cluster;
mod engine;
mod distances;
mod variants;
mod inits;
mod abort_strategy;

pub use abort_strategy::AbortStrategy;
pub use api::{
    kmeans, DistanceFunction, EmptyClusterPolicy, InitDoneCallbackFn, InitMethod, IterationDoneCallbackFn,
    KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState,
};
pub use cluster::Cluster;
pub use distances::EuclideanDistance;
pub use engine::ClusteringEngine;
pub use error::{KMeansError, Result};
pub use memory::Primitive;
pub use pointset::PointSet;

use crate::error::{KMeansError, Result};
use crate::{helpers, memory::*, AbortStrategy, EuclideanDistance, PointSet};
use rand::prelude::*;
use rayon::prelude::*;
use std::cell::RefCell;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// Distance measure used to find the nearest centroid of a sample.
pub trait DistanceFunction<T: Primitive>: Sync {
    fn distance(&self, a: &[T], b: &[T]) -> T;
}

/// What happens to the centroid of a cluster that received no samples in an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Leave the centroid where it was. This is what [`crate::ClusteringEngine`] always does.
    KeepCentroid,
    /// Move the centroid onto a sample drawn uniformly at random (using the configured random generator).
    ReseedRandom,
}

/// Centroid initialization method, for use with [`kmeans`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitMethod {
    /// Select **k** distinct samples uniformly at random. See [`KMeans::init_random_sample`].
    Random,
    /// Probability weighted seeding. See [`KMeans::init_kmeanplusplus`].
    KMeansPlusPlus,
}

/// This is a structure holding various configuration options for the a k-means calculations, such as
/// the random number generator to use, or a couple of callbacks, that can be set to get status information from
/// a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current[`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **distsum**: New distance sum (**state** contains the distsum from the previous iteration)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// Handling of clusters without samples
    pub(crate) empty_cluster_policy: EmptyClusterPolicy,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_, _, _| {},
            rnd: Box::new(RefCell::new(StdRng::from_entropy())),
            abort_strategy: AbortStrategy::default(),
            empty_cluster_policy: EmptyClusterPolicy::ReseedRandom,
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("empty_cluster_policy", &self.empty_cluster_policy)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>,
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Shorthand for [`Self::random_generator`] with a [`StdRng`] seeded from **seed**.
    pub fn random_seed(self, seed: u64) -> Self {
        self.random_generator(StdRng::seed_from_u64(seed))
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::CentroidShift`] `{ tolerance: 1e-4 }`
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Set how clusters that lost all of their samples are treated.
    /// ## Default
    /// [`EmptyClusterPolicy::ReseedRandom`]
    pub fn empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_cluster_policy = policy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation, as
/// well as the final result, as returned by the API.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// it to be used in parallel, without having to duplicate the input-data.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **distsum**: The total sum of (squared) distances from all samples to their respective centroids (inertia)
/// - **centroids**: Calculated cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest cluster
/// - **centroid_distances**: Vector containing each sample's (squared) distance to its centroid
/// - **iterations**: Amount of iterations that were executed
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub iterations: usize,

    pub(crate) sample_dims: usize,
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::zero(),
            centroids: vec![T::zero(); sample_dims * k],
            centroid_frequency: vec![0usize; k],
            assignments: vec![0usize; sample_cnt],
            centroid_distances: vec![T::infinity(); sample_cnt],
            iterations: 0,
            sample_dims,
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c, s)| *c = s);
    }

    /// Centroid of cluster **idx**. Panics if `idx >= k`.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Iterate all centroids in cluster order.
    pub fn centroids_iter(&self) -> std::slice::ChunksExact<'_, T> {
        self.centroids.chunks_exact(self.sample_dims)
    }

    /// Assign each of **points** to its nearest centroid (lowest cluster id on ties), using euclidean distance.
    ///
    /// ## Errors
    /// [`KMeansError::DimensionMismatch`] if a point does not have the dimensionality of the centroids.
    pub fn predict<R: AsRef<[T]>>(&self, points: &[R]) -> Result<Vec<usize>> {
        points.iter()
            .map(|p| {
                let p = p.as_ref();
                KMeansError::check_dims(self.sample_dims, p.len())?;
                let dists = self.centroids_iter().map(|c| EuclideanDistance.distance(p, c));
                helpers::nearest(dists)
                    .map(|(idx, _)| idx)
                    .ok_or_else(|| KMeansError::invalid("result has no centroids"))
            })
            .collect()
    }
}


/// Entrypoint of the one-shot API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples array will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Supported variants
/// - k-Means clustering (Lloyd) [`KMeans::kmeans_lloyd`]
///
/// ## Supported initialization methods
/// - K-Mean++ [`KMeans::init_kmeanplusplus`]
/// - Random-Sample [`KMeans::init_random_sample`]
/// - Precomputed [`KMeans::init_precomputed`]
pub struct KMeans<T: Primitive, D: DistanceFunction<T> = EuclideanDistance> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>,
    pub(crate) distance_fn: D,
}
impl<T: Primitive, D: DistanceFunction<T>> KMeans<T, D> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    /// - **distance_fn**: Distance function used to find each sample's nearest centroid
    ///
    /// ## Errors
    /// [`KMeansError::InvalidArgument`] if `sample_dims == 0` or `samples.len() != sample_cnt * sample_dims`
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize, distance_fn: D) -> Result<Self> {
        if sample_dims == 0 {
            return Err(KMeansError::invalid("sample_dims must be > 0"));
        }
        let expected_len = sample_cnt.checked_mul(sample_dims)
            .ok_or_else(|| KMeansError::invalid(format!("{} * {} values overflow usize", sample_cnt, sample_dims)))?;
        if samples.len() != expected_len {
            return Err(KMeansError::invalid(format!(
                "expected {} * {} values, got {}", sample_cnt, sample_dims, samples.len()
            )));
        }
        Ok(Self { sample_cnt, sample_dims, samples, distance_fn })
    }

    /// Create a new instance of the [`KMeans`] structure from a copy of **points**.
    pub fn from_point_set(points: &PointSet<T>, distance_fn: D) -> Self {
        Self {
            sample_cnt: points.count(),
            sample_dims: points.dimension(),
            samples: points.as_slice().to_vec(),
            distance_fn,
        }
    }

    pub(crate) fn sample(&self, idx: usize) -> &[T] {
        &self.samples[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    pub(crate) fn update_centroid_distances(&self, state: &mut KMeansState<T>) {
        let centroids = &state.centroids;
        let dims = self.sample_dims;
        self.samples.par_chunks_exact(dims)
            .zip(state.assignments.par_iter().cloned())
            .zip(state.centroid_distances.par_iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                let centroid = &centroids[assignment * dims..(assignment + 1) * dims];
                *centroid_dist = self.distance_fn.distance(s, centroid);
            });
    }

    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>) {
        let centroids = &state.centroids;
        let dims = self.sample_dims;

        self.samples.par_chunks_exact(dims)
            .zip(state.assignments.par_iter_mut())
            .zip(state.centroid_distances.par_iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                let dists = centroids.chunks_exact(dims).map(|c| self.distance_fn.distance(s, c));
                if let Some((best_idx, best_dist)) = helpers::nearest(dists) {
                    *assignment = best_idx;
                    *centroid_dist = best_dist;
                }
            });
    }

    pub(crate) fn update_cluster_frequencies(&self, assignments: &[usize], centroid_frequency: &mut [usize]) -> usize {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        let mut used_centroids_cnt = 0;
        assignments.iter().cloned()
            .for_each(|centroid_id| {
                if centroid_frequency[centroid_id] == 0 {
                    used_centroids_cnt += 1; // Count the amount of centroids with more than 0 samples
                }
                centroid_frequency[centroid_id] += 1;
            });
        used_centroids_cnt
    }


    /// Normal K-Means algorithm implementation (Lloyd).
    ///
    /// Each iteration assigns every sample to its nearest centroid and moves each centroid to the mean of its samples.
    /// The calculation stops when an iteration leaves all assignments unchanged, when the configured
    /// [`AbortStrategy`] reports convergence, or after **max_iter** iterations.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Limit the maximum amount of iterations (just pass a high number for infinite)
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Errors
    /// [`KMeansError::InvalidArgument`] if `k == 0`, `k > sample_cnt` or `max_iter == 0`, and any error of **init**.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_engine::*;
    /// fn main() {
    ///     let (sample_cnt, sample_dims, k, max_iter) = (2000, 20, 4, 100);
    ///
    ///     // Generate some random data
    ///     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    ///     samples.iter_mut().for_each(|v| *v = rand::random());
    ///
    ///     // Calculate kmeans, using kmean++ as initialization-method
    ///     let kmean = KMeans::new(samples, sample_cnt, sample_dims, EuclideanDistance).unwrap();
    ///     let conf = KMeansConfig::build().random_seed(42).build();
    ///     let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_kmeanplusplus, &conf).unwrap();
    ///
    ///     println!("Centroids: {:?}", result.centroids);
    ///     println!("Cluster-Assignments: {:?}", result.assignments);
    ///     println!("Inertia: {}", result.distsum);
    /// }
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, max_iter, init, config)
    }

    /// K-Means++ initialization method
    ///
    /// ## Description
    /// This initialization method starts by selecting one sample uniformly at random as first centroid.
    /// Proceeding from there, each following centroid is drawn with a probability proportional to the
    /// sample's squared distance to its nearest already chosen centroid. This leads to a tendency of selecting
    /// centroids that are far away from the ones chosen so far.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus<'a>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
        crate::inits::kmeanplusplus::calculate(kmean, state, config)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method randomly selects k distinct samples as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample<'a>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Uses the given **centroids** [row-major] as initial centroids. Fails with
    /// [`KMeansError::DimensionMismatch`] if they do not hold exactly `k * sample_dims` values.
    pub fn init_precomputed(centroids: Vec<T>) -> impl for<'c> FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        move |kmean, state, config| crate::inits::precomputed::calculate(kmean, state, config, centroids)
    }
}


/// One-shot k-means clustering of **points**.
///
/// ## Arguments
/// - **points**: The samples, all of equal length
/// - **k**: Amount of clusters to search for
/// - **max_iterations**: Upper bound for the amount of iterations
/// - **init**: Centroid initialization method
/// - **config**: Random generator, convergence tolerance and empty-cluster handling, see [`KMeansConfigBuilder`]
///
/// ## Returns
/// [`KMeansState`] with the labels (`assignments`), `centroids`, inertia (`distsum`) and `iterations`.
///
/// ## Errors
/// - [`KMeansError::InvalidArgument`] if **points** is empty, `k == 0`, `k > points.len()` or `max_iterations == 0`
/// - [`KMeansError::DimensionMismatch`] if the points differ in length
pub fn kmeans<T: Primitive, R: AsRef<[T]>>(
    points: &[R], k: usize, max_iterations: usize, init: InitMethod, config: &KMeansConfig<'_, T>,
) -> Result<KMeansState<T>> {
    let dimension = points.first()
        .map(|p| p.as_ref().len())
        .ok_or_else(|| KMeansError::invalid("no points given"))?;
    let points = PointSet::<T>::from_rows(dimension, points)?;
    let kmean = KMeans::from_point_set(&points, EuclideanDistance);
    match init {
        InitMethod::Random => kmean.kmeans_lloyd(k, max_iterations, KMeans::init_random_sample, config),
        InitMethod::KMeansPlusPlus => kmean.kmeans_lloyd(k, max_iterations, KMeans::init_kmeanplusplus, config),
    }
}

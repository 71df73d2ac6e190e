use rand::{seq::index, RngCore};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{KMeansError, Result};
use crate::helpers;
use crate::memory::Primitive;
use crate::{Cluster, DistanceFunction, EuclideanDistance, PointSet};

/// Stepwise Lloyd clustering of a [`PointSet`] into a fixed number of [`Cluster`]s.
///
/// Every step first partitions the point set (each point joins its nearest cluster) and then
/// moves every centroid to the mean of its members. Clusters that end up empty keep their
/// previous centroid ([`crate::EmptyClusterPolicy::KeepCentroid`]).
///
/// The engine only borrows the point set, so the point set can not grow while it is being clustered.
#[derive(Clone, Debug)]
pub struct ClusteringEngine<'a, T: Primitive> {
    points: &'a PointSet<T>,
    clusters: Vec<Cluster<'a, T>>,
}

impl<'a, T: Primitive> ClusteringEngine<'a, T> {
    /// Create a clustering of **points** into **k** clusters.
    ///
    /// ## Arguments
    /// - **points**: The point set to cluster
    /// - **k**: Amount of clusters
    /// - **seed_indices**: Indices of the points to use as initial centroids (cluster `i` starts at
    ///   `points[seed_indices[i]]`). If `None`, **k** distinct points are drawn uniformly at random.
    /// - **rnd**: Random number generator for the random draw (pass a seeded one for reproducible results)
    ///
    /// ## Errors
    /// - [`KMeansError::InvalidArgument`] if `k == 0`, `k > points.count()`, or **seed_indices** does not hold exactly **k** entries
    /// - [`KMeansError::IndexOutOfRange`] if a seed index does not address a point
    pub fn new(points: &'a PointSet<T>, k: usize, seed_indices: Option<&[usize]>, rnd: &mut dyn RngCore) -> Result<Self> {
        Self::check_k(points, k)?;
        let seeds = match seed_indices {
            Some(seeds) => seeds.to_vec(),
            None => index::sample(rnd, points.count(), k).into_vec(),
        };
        Self::from_seeds(points, k, &seeds)
    }

    /// Create a clustering whose initial centroids are the points at **seed_indices**.
    /// The amount of clusters is `seed_indices.len()`.
    pub fn with_seed_indices(points: &'a PointSet<T>, seed_indices: &[usize]) -> Result<Self> {
        Self::check_k(points, seed_indices.len())?;
        Self::from_seeds(points, seed_indices.len(), seed_indices)
    }

    fn check_k(points: &PointSet<T>, k: usize) -> Result<()> {
        if k == 0 {
            return Err(KMeansError::invalid("k must be > 0"));
        }
        if k > points.count() {
            return Err(KMeansError::invalid(format!(
                "k ({}) must not exceed the amount of points ({})", k, points.count()
            )));
        }
        Ok(())
    }

    fn from_seeds(points: &'a PointSet<T>, k: usize, seeds: &[usize]) -> Result<Self> {
        if seeds.len() != k {
            return Err(KMeansError::invalid(format!("expected {} seed indices, got {}", k, seeds.len())));
        }
        let clusters = seeds.iter()
            .map(|&idx| Cluster::new(points, points.point(idx)?))
            .collect::<Result<Vec<_>>>()?;
        debug!(k, point_cnt = points.count(), ?seeds, "Initialized clustering");
        Ok(Self { points, clusters })
    }

    pub fn clusters(&self) -> &[Cluster<'a, T>] { &self.clusters }

    /// Amount of clusters. Fixed for the lifetime of the engine.
    pub fn k(&self) -> usize { self.clusters.len() }

    pub fn points(&self) -> &'a PointSet<T> { self.points }

    /// Index of the cluster nearest to **point**. Ties are broken in favor of the lower index.
    ///
    /// ## Errors
    /// [`KMeansError::DimensionMismatch`] if `point.len()` differs from the point set's dimension.
    pub fn nearest_cluster(&self, point: &[T]) -> Result<usize> {
        let distances = self.clusters.iter()
            .map(|c| c.distance(point))
            .collect::<Result<Vec<_>>>()?;
        helpers::nearest(distances.into_iter())
            .map(|(idx, _)| idx)
            .ok_or_else(|| KMeansError::invalid("clustering has no clusters"))
    }

    /// Clear every cluster, then add every point of the point set to its nearest cluster.
    /// Repeating this without an [`Self::update`] in between yields the same membership.
    pub fn partition(&mut self) -> Result<()> {
        let dims = self.points.dimension();
        let clusters = &self.clusters;
        let nearest: Vec<usize> = self.points.as_slice()
            .par_chunks_exact(dims)
            .map(|p| {
                let dists = clusters.iter().map(|c| EuclideanDistance.distance(p, c.centroid()).sqrt());
                helpers::nearest(dists).map_or(0, |(idx, _)| idx)
            })
            .collect();

        self.clusters.iter_mut().for_each(Cluster::clear);
        for (point_idx, cluster_idx) in nearest.into_iter().enumerate() {
            self.clusters[cluster_idx].add_member(point_idx)?;
        }
        Ok(())
    }

    /// Recompute the centroid of every cluster, in order.
    ///
    /// ## Returns
    /// **true** if every cluster reported a stable centroid
    pub fn update(&mut self) -> bool {
        self.clusters.iter_mut()
            .map(Cluster::recompute_centroid)
            .fold(true, |all_stable, stable| all_stable && stable)
    }

    /// One cycle of the algorithm: [`Self::partition`] followed by [`Self::update`].
    ///
    /// ## Returns
    /// **true** if the clustering has converged
    pub fn step(&mut self) -> Result<bool> {
        self.partition()?;
        let converged = self.update();
        debug!(converged, inertia = %self.inertia(), "Finished clustering step");
        Ok(converged)
    }

    /// Run [`Self::step`] until it reports convergence, but at most **max_steps** times.
    /// `max_steps == 0` leaves the engine untouched.
    ///
    /// ## Returns
    /// **true** if the last step converged
    pub fn run(&mut self, max_steps: usize) -> Result<bool> {
        for i in 1..=max_steps {
            if self.step()? {
                debug!(steps = i, "Clustering converged");
                return Ok(true);
            }
        }
        debug!(max_steps, "Clustering stopped without convergence");
        Ok(false)
    }

    /// Cluster index of every point, as given by the current membership.
    /// Points that are not a member of any cluster (before the first partition) are `None`.
    pub fn labels(&self) -> Vec<Option<usize>> {
        let mut labels = vec![None; self.points.count()];
        for (ci, cluster) in self.clusters.iter().enumerate() {
            cluster.members().iter().for_each(|&idx| labels[idx] = Some(ci));
        }
        labels
    }

    /// Sum of the squared distances from every member point to its cluster's centroid.
    pub fn inertia(&self) -> T {
        let (data, dims) = (self.points.as_slice(), self.points.dimension());
        self.clusters.iter()
            .flat_map(|c| c.members().iter().map(move |&idx| (c, idx)))
            .map(|(c, idx)| EuclideanDistance.distance(&data[idx * dims..(idx + 1) * dims], c.centroid()))
            .sum()
    }
}

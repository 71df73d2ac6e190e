use std::fmt;

use tracing::trace;

use crate::error::{KMeansError, Result};
use crate::helpers;
use crate::memory::Primitive;
use crate::{DistanceFunction, EuclideanDistance, PointSet};

/// A subset of the points of a [`PointSet`], together with the centroid representing it.
///
/// Membership is stored as indices into the point set. The centroid is an independent
/// point, usually lying in between the member points rather than on one of them.
#[derive(Clone, Debug)]
pub struct Cluster<'a, T: Primitive> {
    points: &'a PointSet<T>,
    centroid: Vec<T>,
    members: Vec<usize>,
}

impl<'a, T: Primitive> Cluster<'a, T> {
    /// Create an empty cluster over **points**, whose centroid is a copy of **centroid**.
    ///
    /// ## Errors
    /// [`KMeansError::DimensionMismatch`] if `centroid.len()` differs from the point set's dimension.
    pub fn new(points: &'a PointSet<T>, centroid: &[T]) -> Result<Self> {
        KMeansError::check_dims(points.dimension(), centroid.len())?;
        Ok(Self { points, centroid: centroid.to_vec(), members: Vec::new() })
    }

    pub fn centroid(&self) -> &[T] { &self.centroid }

    /// Indices of the member points, in the order they were added.
    pub fn members(&self) -> &[usize] { &self.members }

    /// Copies of all member points.
    pub fn contents(&self) -> Vec<Vec<T>> {
        self.member_points().map(<[T]>::to_vec).collect()
    }

    /// Remove all members. The centroid is left untouched.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Add the point at **idx** to this cluster. Duplicates are not filtered.
    ///
    /// ## Errors
    /// [`KMeansError::IndexOutOfRange`] if **idx** does not address a point of the point set.
    pub fn add_member(&mut self, idx: usize) -> Result<()> {
        KMeansError::check_index(idx, self.points.count())?;
        self.members.push(idx);
        Ok(())
    }

    /// Euclidean distance from **point** to this cluster's centroid.
    ///
    /// ## Errors
    /// [`KMeansError::DimensionMismatch`] if `point.len()` differs from the centroid's length.
    pub fn distance(&self, point: &[T]) -> Result<T> {
        KMeansError::check_dims(self.centroid.len(), point.len())?;
        Ok(EuclideanDistance.distance(point, &self.centroid).sqrt())
    }

    /// Replace the centroid with the coordinate-wise mean of the current members.
    ///
    /// ## Returns
    /// - **true** if the centroid stayed (approximately) where it was, which makes it a stable position
    /// - **false** if it moved
    ///
    /// An empty cluster keeps its centroid unchanged and reports **true**.
    pub fn recompute_centroid(&mut self) -> bool {
        if self.members.is_empty() {
            return true;
        }
        let mut new_centroid = vec![T::zero(); self.centroid.len()];
        for point in self.member_points() {
            new_centroid.iter_mut().zip(point.iter()).for_each(|(c, p)| *c += p);
        }
        let cnt = T::from(self.members.len()).unwrap_or_else(T::one);
        new_centroid.iter_mut().for_each(|c| *c = *c / cnt);

        let stable = helpers::allclose(&new_centroid, &self.centroid);
        trace!(members = self.members.len(), stable, "Recomputed centroid");
        self.centroid = new_centroid;
        stable
    }

    fn member_points(&self) -> impl Iterator<Item = &[T]> + '_ {
        let (data, dims) = (self.points.as_slice(), self.points.dimension());
        self.members.iter().map(move |&idx| &data[idx * dims..(idx + 1) * dims])
    }
}

impl<'a, T: Primitive> fmt::Display for Cluster<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.centroid)
    }
}

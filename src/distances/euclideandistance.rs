use crate::{DistanceFunction, Primitive};

/// Squared euclidean distance. Callers that need the true metric take the square root.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanDistance;

impl<T: Primitive> DistanceFunction<T> for EuclideanDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b.iter())
            .map(|(&av, &bv)| av - bv)
            .map(|v| v * v)
            .sum::<T>()
    }
}

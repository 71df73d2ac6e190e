use crate::error::{KMeansError, Result};
use crate::memory::*;
use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansState};

#[inline(always)]
pub fn calculate<T, D>(
    kmean: &KMeans<T, D>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<T>,
) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    KMeansError::check_dims(state.k * kmean.sample_dims, computed.len())?;
    computed.chunks_exact(kmean.sample_dims).enumerate().for_each(|(ci, c)| {
        state.set_centroid_from_iter(ci, c.iter().cloned());
    });
    Ok(())
}

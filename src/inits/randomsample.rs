use crate::error::Result;
use crate::memory::*;
use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansState};
use rand::seq::index;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    let mut rnd = config.rnd.borrow_mut();
    index::sample(&mut *rnd, kmean.sample_cnt, state.k)
        .iter()
        .enumerate()
        .for_each(|(ci, si)| { // Copy randomly chosen samples into state.centroids
            state.set_centroid_from_iter(ci, kmean.sample(si).iter().cloned());
        });
    Ok(())
}

use crate::error::Result;
use crate::memory::*;
use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansState};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rayon::prelude::*;
use tracing::warn;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    let mut rnd = config.rnd.borrow_mut();
    let dims = kmean.sample_dims;

    // Randomly select first centroid
    let first_idx = rnd.gen_range(0..kmean.sample_cnt);
    state.set_centroid_from_iter(0, kmean.sample(first_idx).iter().cloned());

    // Each sample's (squared) distance to its nearest centroid chosen so far
    let mut closest_distances: Vec<T> = kmean.samples.par_chunks_exact(dims)
        .map(|s| kmean.distance_fn.distance(s, kmean.sample(first_idx)))
        .collect();

    for k in 1..state.k {
        // Draw the next centroid with probability proportional to the squared distance
        let sampled_idx = match WeightedIndex::new(&closest_distances) {
            Ok(weights) => weights.sample(&mut *rnd),
            Err(err) => {
                warn!(centroid = k, %err, "Degenerate k-means++ weights, drawing uniformly");
                rnd.gen_range(0..kmean.sample_cnt)
            }
        };
        let new_centroid = kmean.sample(sampled_idx);
        state.set_centroid_from_iter(k, new_centroid.iter().cloned());

        closest_distances.par_iter_mut()
            .zip(kmean.samples.par_chunks_exact(dims))
            .for_each(|(closest, s)| {
                let dist = kmean.distance_fn.distance(s, new_centroid);
                if dist < *closest {
                    *closest = dist;
                }
            });
    }
    Ok(())
}

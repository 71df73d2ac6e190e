use crate::abort_strategy::IterationOutcome;
use crate::error::{KMeansError, Result};
use crate::{memory::*, DistanceFunction, EmptyClusterPolicy, KMeans, KMeansConfig, KMeansState};
use rand::prelude::*;
use tracing::{debug, trace};

pub(crate) struct Lloyd<T: Primitive, D: DistanceFunction<T>> {
	_p: std::marker::PhantomData<(T, D)>
}
impl<T: Primitive, D: DistanceFunction<T>> Lloyd<T, D> {
    /// Move every centroid to the mean of its samples.
    /// Returns the root of the summed squared coordinate differences between old and new centroids.
    fn update_centroids(data: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> T {
        let dims = data.sample_dims;
        let mut new_centroids = vec![T::zero(); state.centroids.len()];

        let used_centroids_cnt = data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);
        // Sum all samples in a cluster together into new_centroids
        data.samples.chunks_exact(dims)
            .zip(state.assignments.iter().cloned())
            .for_each(|(s, centroid_id)| {
                new_centroids[centroid_id * dims..(centroid_id + 1) * dims].iter_mut()
                    .zip(s.iter())
                    .for_each(|(c, sv)| *c += sv);
            });
        if used_centroids_cnt != state.k {
            trace!(empty = state.k - used_centroids_cnt, policy = ?config.empty_cluster_policy, "Found empty clusters");
        }

        for (ci, (nc, &cfreq)) in new_centroids.chunks_exact_mut(dims).zip(state.centroid_frequency.iter()).enumerate() {
            if cfreq > 0 {
                let cfreq = T::from(cfreq).unwrap_or_else(T::one);
                nc.iter_mut().for_each(|v| *v = *v / cfreq);
                continue;
            }
            match config.empty_cluster_policy {
                EmptyClusterPolicy::KeepCentroid => nc.copy_from_slice(state.centroid(ci)),
                EmptyClusterPolicy::ReseedRandom => {
                    let sample_id = config.rnd.borrow_mut().gen_range(0..data.sample_cnt);
                    trace!(cluster = ci, sample = sample_id, "Reseeding empty cluster");
                    nc.copy_from_slice(data.sample(sample_id));
                }
            }
        }

        let shift = state.centroids.iter().cloned()
            .zip(new_centroids.iter().cloned())
            .map(|(o, n)| (n - o) * (n - o))
            .sum::<T>()
            .sqrt();
        state.centroids = new_centroids;
        shift
    }

    #[inline(always)] pub fn calculate<'a, F>(data: &KMeans<T, D>, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        if k == 0 || k > data.sample_cnt {
            return Err(KMeansError::invalid(format!("k ({}) must be in 1..={}", k, data.sample_cnt)));
        }
        if max_iter == 0 {
            return Err(KMeansError::invalid("max_iter must be > 0"));
        }

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);
        state.distsum = T::infinity();

        // Initialize clusters and notify subscriber
        init(data, &mut state, config)?;
        (config.init_done)(&state);
        let mut abort_strategy = config.abort_strategy.create_logic();

        for i in 1..=max_iter {
            let previous_assignments = (i > 1).then(|| state.assignments.clone());
            data.update_cluster_assignments(&mut state);
            let new_distsum = state.centroid_distances.iter().cloned().sum::<T>();
            let shift = Self::update_centroids(data, &mut state, config);
            state.iterations = i;

            // Notify subscriber about finished iteration
            (config.iteration_done)(&state, i, new_distsum);
            let unchanged = previous_assignments.map_or(false, |prev| prev == state.assignments);
            let proceed = abort_strategy.next(&IterationOutcome { shift, distsum: new_distsum });
            debug!(iteration = i, %shift, distsum = %new_distsum, unchanged, "Finished k-means iteration");
            state.distsum = new_distsum;
            if unchanged || !proceed {
                break;
            }
        }

        data.update_centroid_distances(&mut state);
        state.distsum = state.centroid_distances.iter().cloned().sum::<T>();
        Ok(state)
    }
}




#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::assert_kmeans_result_eq;
    use crate::{kmeans, AbortStrategy, EuclideanDistance, InitMethod};
    use std::cell::Cell;

    fn blobs(seed: u64) -> Vec<Vec<f64>> {
        let mut rnd = StdRng::seed_from_u64(seed);
        let centers = [[0.0, 0.0], [5.0, 5.0], [10.0, 0.0]];
        let mut points = Vec::new();
        for c in centers.iter() {
            for _ in 0..30 {
                points.push(vec![c[0] + rnd.gen_range(-0.4..0.4), c[1] + rnd.gen_range(-0.4..0.4)]);
            }
        }
        points
    }

    #[test]
    fn shapes_and_types() {
        let points = blobs(0);
        let conf = KMeansConfig::<f64>::build().random_seed(123).build();
        let res = kmeans(&points, 3, 300, InitMethod::Random, &conf).unwrap();

        assert_eq!(res.assignments.len(), points.len());
        assert_eq!(res.centroids.len(), 3 * 2);
        assert_eq!(res.centroid_frequency.iter().sum::<usize>(), points.len());
        assert!(res.distsum >= 0.0);
        assert!(res.iterations >= 1 && res.iterations <= 300);
    }

    #[test]
    fn determinism_with_seed() {
        let points = blobs(1);
        for init in [InitMethod::Random, InitMethod::KMeansPlusPlus] {
            let res1 = kmeans(&points, 3, 100, init, &KMeansConfig::<f64>::build().random_seed(7).build()).unwrap();
            let res2 = kmeans(&points, 3, 100, init, &KMeansConfig::<f64>::build().random_seed(7).build()).unwrap();
            assert_eq!(res1.assignments, res2.assignments);
            assert_eq!(res1.centroids, res2.centroids);
            assert_eq!(res1.iterations, res2.iterations);
        }
    }

    #[test]
    fn kmeanplusplus_finds_the_blobs() {
        let points = blobs(2);
        let conf = KMeansConfig::<f64>::build().random_seed(11).build();
        let res = kmeans(&points, 3, 100, InitMethod::KMeansPlusPlus, &conf).unwrap();

        // Every blob ends up in its own cluster, whose centroid is the blob's mean
        let mut centroids = Vec::new();
        for blob in points.chunks(30) {
            let sum = blob.iter().fold([0.0f64; 2], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
            centroids.extend_from_slice(&[sum[0] / 30.0, sum[1] / 30.0]);
        }
        let should = KMeansState {
            k: 3,
            distsum: res.distsum,
            centroids,
            centroid_frequency: vec![30, 30, 30],
            assignments: (0..90).map(|i| i / 30).collect(),
            centroid_distances: res.centroid_distances.clone(),
            iterations: res.iterations,
            sample_dims: 2,
        };
        assert_kmeans_result_eq(&should, &res);
    }

    #[test]
    fn predict_matches_training_assignment() {
        let points = blobs(3);
        let conf = KMeansConfig::<f64>::build().random_seed(9).build();
        let res = kmeans(&points, 3, 100, InitMethod::KMeansPlusPlus, &conf).unwrap();
        assert_eq!(res.predict(&points).unwrap(), res.assignments);

        let near_first = res.predict(&[res.centroid(0).to_vec()]).unwrap();
        assert_eq!(near_first, vec![0]);
    }

    #[test]
    fn inertia_definition() {
        let points = blobs(4);
        let conf = KMeansConfig::<f64>::build().random_seed(11).build();
        let res = kmeans(&points, 4, 100, InitMethod::Random, &conf).unwrap();

        let manual: f64 = points.iter().zip(res.assignments.iter())
            .map(|(p, &a)| p.iter().zip(res.centroid(a).iter()).map(|(pv, cv)| (pv - cv) * (pv - cv)).sum::<f64>())
            .sum();
        assert_approx_eq!(res.distsum, manual, 1e-8);
        assert_approx_eq!(res.centroid_distances.iter().sum::<f64>(), manual, 1e-8);
    }

    #[test]
    fn stops_when_assignments_are_unchanged() {
        let kmean = KMeans::new(vec![0.0f64, 1.0, 2.0, 20.0, 21.0, 22.0], 6, 1, EuclideanDistance).unwrap();
        // tolerance 0 never triggers, so only the unchanged assignments end the run
        let conf = KMeansConfig::<f64>::build()
            .abort_strategy(AbortStrategy::CentroidShift { tolerance: 0.0 })
            .random_seed(1)
            .build();
        let res = kmean.kmeans_lloyd(2, 50, KMeans::init_precomputed(vec![0.0, 22.0]), &conf).unwrap();
        assert_eq!(res.iterations, 2);
        assert_eq!(res.centroids, vec![1.0, 21.0]);
    }

    #[test]
    fn stops_when_centroid_shift_is_below_tolerance() {
        let kmean = KMeans::new(vec![0.0f64, 1.0, 2.0, 20.0, 21.0, 22.0], 6, 1, EuclideanDistance).unwrap();
        let conf = KMeansConfig::<f64>::build()
            .abort_strategy(AbortStrategy::CentroidShift { tolerance: 1.5 })
            .random_seed(1)
            .build();
        // the first iteration moves both centroids by 1.0 -> shift sqrt(2) < 1.5
        let res = kmean.kmeans_lloyd(2, 50, KMeans::init_precomputed(vec![0.0, 22.0]), &conf).unwrap();
        assert_eq!(res.iterations, 1);
        assert_eq!(res.centroids, vec![1.0, 21.0]);
    }

    #[test]
    fn stops_at_iteration_limit() {
        let points = blobs(5);
        let conf = KMeansConfig::<f64>::build()
            .abort_strategy(AbortStrategy::CentroidShift { tolerance: 0.0 })
            .random_seed(3)
            .build();
        let res = kmeans(&points, 3, 1, InitMethod::Random, &conf).unwrap();
        assert_eq!(res.iterations, 1);
    }

    #[test]
    fn no_improvement_strategy_runs_to_convergence() {
        let kmean = KMeans::new(vec![0.0f64, 1.0, 2.0, 20.0, 21.0, 22.0], 6, 1, EuclideanDistance).unwrap();
        let conf = KMeansConfig::<f64>::build()
            .abort_strategy(AbortStrategy::NoImprovement { threshold: 1e9 })
            .random_seed(1)
            .build();
        // the first iteration always improves on an infinite distance sum
        let res = kmean.kmeans_lloyd(2, 50, KMeans::init_precomputed(vec![0.0, 22.0]), &conf).unwrap();
        assert_eq!(res.iterations, 2);
        assert_eq!(res.distsum, 4.0);
    }

    fn empty_cluster_run(policy: EmptyClusterPolicy) -> KMeansState<f64> {
        let kmean = KMeans::new(vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0], 3, 2, EuclideanDistance).unwrap();
        let conf = KMeansConfig::<f64>::build()
            .empty_cluster_policy(policy)
            .random_seed(1)
            .build();
        kmean.kmeans_lloyd(2, 1, KMeans::init_precomputed(vec![2.0, 0.0, 1337.0, 0.0]), &conf).unwrap()
    }

    #[test]
    fn empty_cluster_keeps_centroid() {
        let res = empty_cluster_run(EmptyClusterPolicy::KeepCentroid);
        assert_eq!(&res.assignments, &[0, 0, 0]);
        assert_eq!(&res.centroid_frequency, &[3, 0]);
        assert_eq!(&res.centroids, &[2.0, 0.0, 1337.0, 0.0]);
        assert_eq!(res.distsum, 2.0);
        assert_eq!(&res.centroid_distances, &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn empty_cluster_is_reseeded_onto_a_sample() {
        let res = empty_cluster_run(EmptyClusterPolicy::ReseedRandom);
        assert_eq!(&res.assignments, &[0, 0, 0]);
        assert_eq!(res.centroid(0), &[2.0, 0.0]);
        let reseeded = res.centroid(1);
        assert!([[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]].iter().any(|s| s == reseeded));
        assert_eq!(res.distsum, 2.0);
    }

    #[test]
    fn status_callbacks() {
        let init_calls = Cell::new(0usize);
        let iterations = Cell::new(0usize);
        let init_done = |_: &KMeansState<f64>| init_calls.set(init_calls.get() + 1);
        let iteration_done = |_: &KMeansState<f64>, nr: usize, _: f64| iterations.set(nr);
        let conf = KMeansConfig::<f64>::build()
            .init_done(&init_done)
            .iteration_done(&iteration_done)
            .random_seed(4)
            .build();

        let res = kmeans(&blobs(6), 3, 100, InitMethod::KMeansPlusPlus, &conf).unwrap();
        assert_eq!(init_calls.get(), 1);
        assert_eq!(iterations.get(), res.iterations);
    }
}

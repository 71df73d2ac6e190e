use crate::memory::Primitive;

/// Relative tolerance used by [`allclose`].
pub(crate) const RTOL: f64 = 1e-5;
/// Absolute tolerance used by [`allclose`].
pub(crate) const ATOL: f64 = 1e-8;

/// Element-wise approximate equality: `|a - b| <= ATOL + RTOL * |b|` for all components.
/// Slices of differing length are never close.
pub(crate) fn allclose<T: Primitive>(a: &[T], b: &[T]) -> bool {
    let (rtol, atol) = (T::from(RTOL).unwrap_or_else(T::epsilon), T::from(ATOL).unwrap_or_else(T::epsilon));
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(&av, &bv)| (av - bv).abs() <= atol + rtol * bv.abs())
}

/// Index and value of the smallest distance, scanning in order.
/// Only a strictly smaller value replaces the current best, so ties go to the lowest index.
pub(crate) fn nearest<T: Primitive>(distances: impl Iterator<Item = T>) -> Option<(usize, T)> {
    let mut best: Option<(usize, T)> = None;
    for (idx, dist) in distances.enumerate() {
        match best {
            Some((_, best_dist)) if !(dist < best_dist || best_dist.is_nan()) => {}
            _ => best = Some((idx, dist)),
        }
    }
    best
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-9))
}

#[cfg(test)]
macro_rules! assert_slice_approx_eq {
	($left: expr, $right: expr) => ({
		let (left_val, right_val) = (&$left, &$right);
		assert_eq!(left_val.len(), right_val.len(), "slice lengths differ");
		for (l, r) in left_val.iter().zip(right_val.iter()) {
			assert_approx_eq!(*l, *r);
		}
	});
}

#[cfg(test)]
pub(crate) mod testing {
	use std::collections::HashMap;

	use crate::{KMeansState, Primitive};

	/// Compare two k-means results, allowing the cluster ids of `actual` to be any permutation
	/// of the ids in `should`.
	pub fn assert_kmeans_result_eq<T: Primitive>(should: &KMeansState<T>, actual: &KMeansState<T>) {
		let cmp_epsilon = T::from(1e-9).unwrap();
		assert_approx_eq!(should.distsum, actual.distsum, cmp_epsilon);
		assert_eq!(should.k, actual.k);

		// compare cluster assignments - and while doing so, build the id mapping for the centroids
		let mut idmap = HashMap::new();
		let mut idrevmap = HashMap::new();
		for idx in 0..should.assignments.len() {
			let (should_id, actual_id) = (should.assignments[idx], actual.assignments[idx]);
			if !idmap.contains_key(&should_id) {
				assert_eq!(idrevmap.contains_key(&actual_id), false);
				idmap.insert(should_id, actual_id);
				idrevmap.insert(actual_id, should_id);
			}
			if idmap[&should_id] != actual_id {
				panic!(
					"Cluster assignments different at idx {}.\nMapping(should -> actual): {:?}\nActual: {:?}\nShould: {:?}",
					idx, idmap, actual.assignments, should.assignments
				);
			}
		}
		for (should_idx, actual_idx) in idmap {
			assert_eq!(should.centroid_frequency[should_idx], actual.centroid_frequency[actual_idx]);
			for (s, a) in should.centroid(should_idx).iter().zip(actual.centroid(actual_idx).iter()) {
				assert_approx_eq!(*s, *a, cmp_epsilon);
			}
		}
	}
}

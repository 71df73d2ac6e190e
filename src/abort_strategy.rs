use crate::memory::*;

/// Enum with possible abort strategies.
/// These strategies specify when a running one-shot k-means calculation is considered converged.
/// Independent of the chosen strategy, the calculation always stops as soon as an iteration
/// leaves every cluster assignment unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
	/// This strategy aborts the calculation as soon as the centroids moved less than **tolerance** in one iteration.
	/// The movement is the root of the summed squared differences over all centroid coordinates.
	/// ## Fields:
	/// - **tolerance**: Movement below which the centroids are considered stable
	CentroidShift { tolerance: T },
	/// This strategy aborts the calculation directly after an iteration produced no improvement of the
	/// total (squared) distance sum, where `improvement > threshold`, for the first time.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
	NoImprovement { threshold: T },
}
impl<T: Primitive> Default for AbortStrategy<T> {
	fn default() -> Self {
		AbortStrategy::CentroidShift { tolerance: T::from(1e-4).unwrap_or_else(T::epsilon) }
	}
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::CentroidShift { tolerance } => Box::new(CentroidShiftLogic { tolerance }),
			AbortStrategy::NoImprovement { threshold } => Box::new(NoImprovementLogic {
				threshold,
				prev_error: T::infinity()
			})
		}
	}
}

/// What a finished iteration reports to the abort strategy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IterationOutcome<T: Primitive> {
	/// Root of the summed squared centroid coordinate differences
	pub shift: T,
	/// Sum of (squared) distances from all samples to their nearest centroid
	pub distsum: T,
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Function that has to be called once an iteration of the calculation ended.
	/// ## Returns
	/// - **true** if the calculation should continue
	/// - **false** if the calculation should abort
	fn next(&mut self, outcome: &IterationOutcome<T>) -> bool;
}


pub(crate) struct CentroidShiftLogic<T: Primitive> {
	tolerance: T
}
impl<T: Primitive> AbortStrategyLogic<T> for CentroidShiftLogic<T> {
	fn next(&mut self, outcome: &IterationOutcome<T>) -> bool {
		!(outcome.shift < self.tolerance)
	}
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_error: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
	fn next(&mut self, outcome: &IterationOutcome<T>) -> bool {
		let improvement = self.prev_error - outcome.distsum;
		self.prev_error = outcome.distsum;
		improvement > self.threshold
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn shift<T: Primitive>(shift: f64) -> IterationOutcome<T> {
		IterationOutcome { shift: T::from(shift).unwrap(), distsum: T::zero() }
	}
	fn error<T: Primitive>(distsum: f64) -> IterationOutcome<T> {
		IterationOutcome { shift: T::zero(), distsum: T::from(distsum).unwrap() }
	}

	#[test] fn test_centroid_shift_f32() { test_centroid_shift::<f32>(); }
	#[test] fn test_centroid_shift_f64() { test_centroid_shift::<f64>(); }

	fn test_centroid_shift<T: Primitive>() {
		let mut abort_strategy = AbortStrategy::CentroidShift { tolerance: T::from(1e-4).unwrap() }.create_logic();
		assert_eq!(abort_strategy.next(&shift(10.0)), true);
		assert_eq!(abort_strategy.next(&shift(0.001)), true);
		assert_eq!(abort_strategy.next(&shift(1e-4)), true);
		assert_eq!(abort_strategy.next(&shift(0.5e-4)), false);
		assert_eq!(abort_strategy.next(&shift(0.0)), false);
	}

	#[test]
	fn default_is_centroid_shift() {
		assert_eq!(AbortStrategy::<f64>::default(), AbortStrategy::CentroidShift { tolerance: 1e-4 });
	}

	#[test] fn test_no_improvement_f32() { test_no_improvement::<f32>(); }
	#[test] fn test_no_improvement_f64() { test_no_improvement::<f64>(); }

	fn test_no_improvement<T: Primitive>() {
		{
			let mut abort_strategy = AbortStrategy::NoImprovement { threshold: T::from(0.0005).unwrap() }.create_logic();
			assert_eq!(abort_strategy.next(&error(3000.0)), true);
			assert_eq!(abort_strategy.next(&error(3000.0)), false);
		}
		{
			let mut abort_strategy = AbortStrategy::NoImprovement { threshold: T::from(0.0005).unwrap() }.create_logic();
			assert_eq!(abort_strategy.next(&error(3000.0)), true);
			assert_eq!(abort_strategy.next(&error(2000.0)), true);
			assert_eq!(abort_strategy.next(&error(1999.99)), true);
			assert_eq!(abort_strategy.next(&error(1999.99999999)), false);
		}
		{ // Getting worse is never an improvement
			let mut abort_strategy = AbortStrategy::NoImprovement { threshold: T::from(0.0005).unwrap() }.create_logic();
			assert_eq!(abort_strategy.next(&error(10.0)), true);
			assert_eq!(abort_strategy.next(&error(11.0)), false);
		}
	}
}

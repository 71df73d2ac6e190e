use crate::error::{KMeansError, Result};
use crate::memory::Primitive;

/// Append-only collection of points that all share one fixed dimensionality.
///
/// Points are stored row-major in a single buffer: `[<point0>,<point1>,<point2>,...]`.
/// Everything handed in is copied, so later mutation of the caller's vectors never
/// reaches the stored data.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet<T: Primitive> {
    dimension: usize,
    data: Vec<T>,
}

impl<T: Primitive> PointSet<T> {
    /// Create an empty point set of the given dimensionality.
    ///
    /// ## Errors
    /// [`KMeansError::InvalidArgument`] if **dimension** is `0`.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(KMeansError::invalid("dimension must be > 0"));
        }
        Ok(Self { dimension, data: Vec::new() })
    }

    /// Create a point set holding copies of **rows**.
    ///
    /// ## Errors
    /// - [`KMeansError::InvalidArgument`] if **dimension** is `0`
    /// - [`KMeansError::DimensionMismatch`] if any row's length differs from **dimension**
    pub fn from_rows<R: AsRef<[T]>>(dimension: usize, rows: &[R]) -> Result<Self> {
        let mut set = Self::new(dimension)?;
        for row in rows {
            KMeansError::check_dims(dimension, row.as_ref().len())?;
        }
        set.data.reserve(rows.len() * dimension);
        rows.iter().for_each(|row| set.data.extend_from_slice(row.as_ref()));
        Ok(set)
    }

    /// Append a copy of **point**.
    ///
    /// ## Errors
    /// [`KMeansError::DimensionMismatch`] if `point.len() != dimension`. Nothing is stored then.
    pub fn append(&mut self, point: &[T]) -> Result<()> {
        KMeansError::check_dims(self.dimension, point.len())?;
        self.data.extend_from_slice(point);
        Ok(())
    }

    pub fn dimension(&self) -> usize { self.dimension }

    /// Amount of stored points.
    pub fn count(&self) -> usize { self.data.len() / self.dimension }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Borrowed view of point **idx**.
    pub fn point(&self, idx: usize) -> Result<&[T]> {
        KMeansError::check_index(idx, self.count())?;
        Ok(&self.data[idx * self.dimension..(idx + 1) * self.dimension])
    }

    /// Owned copy of point **idx**.
    pub fn get(&self, idx: usize) -> Result<Vec<T>> {
        self.point(idx).map(<[T]>::to_vec)
    }

    /// Iterate all points in insertion order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.dimension)
    }

    /// Row-major buffer of all points.
    pub fn as_slice(&self) -> &[T] { &self.data }
}

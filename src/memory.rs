use num::{Float, NumCast, Zero};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
};

/// Floating point type every container and algorithm in this crate is generic over.
pub trait Primitive:
    Add
    + AddAssign
    + Sum
    + Sub
    + SubAssign
    + Zero
    + Float
    + NumCast
    + SampleUniform
    + PartialOrd
    + Copy
    + Default
    + Display
    + Debug
    + Sync
    + Send
    + LowerExp
    + 'static
    + for<'a> AddAssign<&'a Self>
    + for<'a> Sub<&'a Self>
{
}
impl Primitive for f32 {}
impl Primitive for f64 {}

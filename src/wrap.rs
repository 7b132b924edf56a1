use std::marker::PhantomData;

pub trait RangeF64 {
    const MIN: f64;
    const MAX: f64;
    const DELTA: f64 = Self::MAX - Self::MIN;
}

/// The half-open range [-1, 1)
#[derive(Debug, Clone, Copy)]
pub struct RangeF64Bipolar;

impl RangeF64 for RangeF64Bipolar {
    const MIN: f64 = -1f64;
    const MAX: f64 = 1f64;
}

#[derive(Debug)]
pub struct WrapF64<R: RangeF64> {
    value: f64,
    range: PhantomData<R>,
}

impl<R: RangeF64> Clone for WrapF64<R> {
    fn clone(&self) -> Self {
        Self {
            value: self.value,
            range: PhantomData,
        }
    }
}

impl<R: RangeF64> Copy for WrapF64<R> {}

// Euclidean remainder so negative inputs wrap upwards into the range rather than out of it.
fn wrap_f64<R: RangeF64>(value: f64) -> f64 {
    (value - R::MIN).rem_euclid(R::DELTA) + R::MIN
}

impl<R: RangeF64> WrapF64<R> {
    pub fn new(value: f64) -> Self {
        Self {
            value: wrap_f64::<R>(value),
            range: PhantomData,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

pub type WrapF64Bipolar = WrapF64<RangeF64Bipolar>;

impl<R: RangeF64> From<f64> for WrapF64<R> {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl<R: RangeF64> From<WrapF64<R>> for f64 {
    fn from(value: WrapF64<R>) -> Self {
        value.value()
    }
}

use crate::waveform::WaveShape;
use std::marker::PhantomData;

pub trait Signal<T> {
    fn sample(&mut self, i: u64) -> T;
}

pub struct Map<T, S, F> {
    t: PhantomData<T>,
    signal: S,
    f: F,
}

impl<T, U, S, F> Signal<U> for Map<T, S, F>
where
    S: Signal<T>,
    F: FnMut(T) -> U,
{
    fn sample(&mut self, i: u64) -> U {
        (self.f)(self.signal.sample(i))
    }
}

pub fn map<T, U, S: Signal<T>, F: FnMut(T) -> U>(signal: S, f: F) -> Map<T, S, F> {
    Map {
        t: PhantomData,
        signal,
        f,
    }
}

pub struct Const<T> {
    value: T,
}

impl<T> Const<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Copy> Signal<T> for Const<T> {
    fn sample(&mut self, _: u64) -> T {
        self.value
    }
}

pub struct WaveOscillatorBuilder<FS: Signal<f64>> {
    pub shape: WaveShape,
    pub frequency_hz_signal: FS,
    pub sample_rate: u32,
}

impl<FS: Signal<f64>> WaveOscillatorBuilder<FS> {
    pub fn build(self) -> WaveOscillator<FS> {
        WaveOscillator::new(self)
    }
}

/// Evaluates a wave shape at `t = i / sample_rate`. There is no phase accumulator, so sample `i`
/// depends only on `i` and the frequency at `i`.
pub struct WaveOscillator<FS: Signal<f64>> {
    shape: WaveShape,
    frequency_hz_signal: FS,
    sample_rate: u32,
}

impl<FS: Signal<f64>> WaveOscillator<FS> {
    pub fn new(
        WaveOscillatorBuilder {
            shape,
            frequency_hz_signal,
            sample_rate,
        }: WaveOscillatorBuilder<FS>,
    ) -> Self {
        Self {
            shape,
            frequency_hz_signal,
            sample_rate,
        }
    }
}

impl<FS: Signal<f64>> Signal<f64> for WaveOscillator<FS> {
    fn sample(&mut self, i: u64) -> f64 {
        let t = i as f64 / self.sample_rate as f64;
        self.shape.value_at(self.frequency_hz_signal.sample(i), t)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn const_ignores_index() {
        let mut signal = Const::new(3_i16);
        assert_eq!(signal.sample(0), 3);
        assert_eq!(signal.sample(1_000_000), 3);
    }

    #[test]
    fn map_applies_to_each_sample() {
        let mut signal = map(Const::new(0.5_f64), |x| (x * 4.0) as i32);
        assert_eq!(signal.sample(7), 2);
    }

    #[test]
    fn oscillator_is_indexed_by_sample() {
        let mut osc = WaveOscillatorBuilder {
            shape: WaveShape::Sawtooth,
            frequency_hz_signal: Const::new(1.0),
            sample_rate: 4,
        }
        .build();
        // out of order reads give the same values as in order reads
        let late = osc.sample(2);
        let early = osc.sample(0);
        assert!((late - 0.0).abs() < 1e-12);
        assert!((early + 1.0).abs() < 1e-12);
    }
}

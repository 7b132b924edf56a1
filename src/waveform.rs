use crate::{
    signal::{self, Const, Signal, WaveOscillatorBuilder},
    wrap::WrapF64Bipolar,
};
use std::{f64::consts::TAU, fmt, rc::Rc, str::FromStr};

pub const SAMPLE_RATE_HZ: u32 = 44100;
pub const NOTE_DURATION_S: f64 = 1.0;

const AMPLITUDE_SCALE: f64 = i16::MAX as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveShape {
    #[default]
    Sine,
    Square,
    Sawtooth,
}

// Unlike `f64::signum`, zero maps to zero.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl WaveShape {
    pub const ALL: [Self; 3] = [Self::Sine, Self::Square, Self::Sawtooth];

    /// Value of the waveform in [-1, 1] at time `t` seconds for a tone of `frequency_hz`.
    pub fn value_at(self, frequency_hz: f64, t: f64) -> f64 {
        use WaveShape::*;
        match self {
            Sine => (TAU * frequency_hz * t).sin(),
            Square => sign((TAU * frequency_hz * t).sin()),
            Sawtooth => WrapF64Bipolar::new(2.0 * frequency_hz * t - 1.0).value(),
        }
    }
}

impl fmt::Display for WaveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use WaveShape::*;
        let str = match self {
            Sine => "Sine",
            Square => "Square",
            Sawtooth => "Sawtooth",
        };
        write!(f, "{}", str)
    }
}

impl FromStr for WaveShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for shape in Self::ALL {
            if shape.to_string().eq_ignore_ascii_case(s) {
                return Ok(shape);
            }
        }
        anyhow::bail!("unsupported waveform: {}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: f64,
    pub duration_s: f64,
}

impl Note {
    pub fn new(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            duration_s: NOTE_DURATION_S,
        }
    }
}

/// An immutable rendered note. Cloning shares the samples rather than copying them, so the audio
/// sink and the display sink see the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Rc<[i16]>,
    sample_rate_hz: u32,
    duration_s: f64,
}

impl SampleBuffer {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Pairs of (seconds, amplitude) evenly spaced over [0, duration).
    pub fn time_series(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let step = self.duration_s / self.samples.len().max(1) as f64;
        self.samples
            .iter()
            .enumerate()
            .map(move |(i, &sample)| (i as f64 * step, sample as f64))
    }
}

fn quantize(value: f64) -> i16 {
    // `as` truncates towards zero
    (value.clamp(-1.0, 1.0) * AMPLITUDE_SCALE) as i16
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generator {
    pub sample_rate_hz: u32,
    pub duration_s: f64,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            sample_rate_hz: SAMPLE_RATE_HZ,
            duration_s: NOTE_DURATION_S,
        }
    }
}

impl Generator {
    pub fn new(sample_rate_hz: u32, duration_s: f64) -> Self {
        Self {
            sample_rate_hz,
            duration_s,
        }
    }

    fn num_samples(&self, duration_s: f64) -> u64 {
        (self.sample_rate_hz as f64 * duration_s).floor() as u64
    }

    fn oscillator(&self, shape: WaveShape, frequency_hz: f64) -> impl Signal<f64> {
        WaveOscillatorBuilder {
            shape,
            frequency_hz_signal: Const::new(frequency_hz),
            sample_rate: self.sample_rate_hz,
        }
        .build()
    }

    /// Unquantized samples in [-1, 1]
    pub fn normalized(&self, shape: WaveShape, frequency_hz: f64) -> Vec<f64> {
        let mut osc = self.oscillator(shape, frequency_hz);
        (0..self.num_samples(self.duration_s))
            .map(|i| osc.sample(i))
            .collect()
    }

    pub fn render(&self, shape: WaveShape, note: Note) -> SampleBuffer {
        let mut signal = signal::map(self.oscillator(shape, note.frequency_hz), quantize);
        let samples = (0..self.num_samples(note.duration_s))
            .map(|i| signal.sample(i))
            .collect::<Rc<[i16]>>();
        SampleBuffer {
            samples,
            sample_rate_hz: self.sample_rate_hz,
            duration_s: note.duration_s,
        }
    }

    pub fn generate(&self, shape: WaveShape, frequency_hz: f64) -> SampleBuffer {
        self.render(
            shape,
            Note {
                frequency_hz,
                duration_s: self.duration_s,
            },
        )
    }

    /// Returns `None` if `shape_name` doesn't name a supported waveform.
    pub fn generate_named(&self, shape_name: &str, frequency_hz: f64) -> Option<SampleBuffer> {
        let shape = shape_name.parse::<WaveShape>().ok()?;
        Some(self.generate(shape, frequency_hz))
    }
}

pub fn generate(shape: WaveShape, frequency_hz: f64) -> SampleBuffer {
    Generator::default().generate(shape, frequency_hz)
}

pub fn generate_named(shape_name: &str, frequency_hz: f64) -> Option<SampleBuffer> {
    Generator::default().generate_named(shape_name, frequency_hz)
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! assert_approx_eq_f64 {
        ($lhs: expr, $rhs: expr) => {
            assert!(
                ($lhs - $rhs).abs() < 1e-9,
                "abs({} - {}) >= {}",
                $lhs,
                $rhs,
                1e-9
            )
        };
    }

    const FREQUENCIES: [f64; 5] = [1.0, 261.63, 440.0, 493.88, 12345.6];

    #[test]
    fn length_is_independent_of_shape_and_frequency() {
        for shape in WaveShape::ALL {
            for frequency in FREQUENCIES {
                let buffer = generate(shape, frequency);
                assert_eq!(buffer.len(), 44100, "{} at {} Hz", shape, frequency);
                assert_eq!(buffer.sample_rate_hz(), SAMPLE_RATE_HZ);
            }
        }
    }

    #[test]
    fn samples_stay_in_full_scale() {
        for shape in WaveShape::ALL {
            for frequency in FREQUENCIES {
                let buffer = generate(shape, frequency);
                assert!(buffer
                    .samples()
                    .iter()
                    .all(|&s| (-i16::MAX..=i16::MAX).contains(&s)));
            }
        }
    }

    #[test]
    fn sine_starts_at_zero() {
        for frequency in FREQUENCIES {
            assert_eq!(generate(WaveShape::Sine, frequency).samples()[0], 0);
        }
    }

    #[test]
    fn sine_peaks_at_quarter_period() {
        // 441 Hz puts the first peak exactly on sample 25
        let buffer = generate(WaveShape::Sine, 441.0);
        assert!(buffer.samples()[25] >= i16::MAX - 1);
    }

    #[test]
    fn square_changes_sign_after_half_period() {
        let buffer = generate(WaveShape::Square, 440.0);
        let samples = buffer.samples();
        assert_eq!(samples[0], 0);
        assert!(samples[1..=50].iter().all(|&s| s == i16::MAX));
        assert_eq!(samples[51], -i16::MAX);
    }

    #[test]
    fn square_only_takes_three_values() {
        let buffer = generate(WaveShape::Square, 293.66);
        assert!(buffer
            .samples()
            .iter()
            .all(|&s| s == 0 || s == i16::MAX || s == -i16::MAX));
    }

    #[test]
    fn sawtooth_ramps_and_resets() {
        let generator = Generator::new(10, 1.0);
        let values = generator.normalized(WaveShape::Sawtooth, 1.0);
        let expected = [-1.0, -0.8, -0.6, -0.4, -0.2, 0.0, 0.2, 0.4, 0.6, 0.8];
        assert_eq!(values.len(), expected.len());
        for (value, expected) in values.iter().zip(expected) {
            assert_approx_eq_f64!(*value, expected);
        }
        let two_periods = Generator::new(10, 2.0).normalized(WaveShape::Sawtooth, 1.0);
        assert_eq!(two_periods.len(), 20);
        assert_approx_eq_f64!(two_periods[10], -1.0);
        assert!(two_periods[10] < two_periods[9]);
    }

    #[test]
    fn sawtooth_quantizes_from_minus_full_scale() {
        let buffer = Generator::new(10, 1.0).generate(WaveShape::Sawtooth, 1.0);
        assert_eq!(buffer.samples()[0], -i16::MAX);
        assert_eq!(buffer.samples()[5], 0);
    }

    #[test]
    fn generation_is_idempotent() {
        for shape in WaveShape::ALL {
            assert_eq!(generate(shape, 329.63), generate(shape, 329.63));
        }
    }

    #[test]
    fn unknown_name_generates_nothing() {
        assert!(generate_named("Triangle", 440.0).is_none());
        assert!(generate_named("", 440.0).is_none());
        assert_eq!(
            generate_named("Square", 440.0),
            Some(generate(WaveShape::Square, 440.0))
        );
    }

    #[test]
    fn shape_names_round_trip_through_display() {
        for shape in WaveShape::ALL {
            assert_eq!(shape.to_string().parse::<WaveShape>().unwrap(), shape);
        }
        assert_eq!("sawtooth".parse::<WaveShape>().unwrap(), WaveShape::Sawtooth);
        assert!("saw".parse::<WaveShape>().is_err());
    }

    #[test]
    fn time_series_excludes_endpoint() {
        let buffer = Generator::new(10, 1.0).generate(WaveShape::Sine, 1.0);
        let times = buffer.time_series().map(|(t, _)| t).collect::<Vec<_>>();
        assert_eq!(times.len(), 10);
        assert_approx_eq_f64!(times[0], 0.0);
        assert_approx_eq_f64!(times[9], 0.9);
    }

    #[test]
    fn render_uses_note_duration() {
        let note = Note {
            frequency_hz: 440.0,
            duration_s: 0.5,
        };
        let buffer = Generator::default().render(WaveShape::Sine, note);
        assert_eq!(buffer.len(), 22050);
        assert_approx_eq_f64!(buffer.duration_s(), 0.5);
        assert_eq!(Note::new(440.0).duration_s, NOTE_DURATION_S);
    }
}

use crate::{
    playback::DisplaySink,
    waveform::{SampleBuffer, NOTE_DURATION_S},
};
use chargrid::core::{Coord, Size};

const AUTOSCALE_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The data limits of `values` widened by a margin on each side. Returns `None` for empty
    /// input.
    pub fn fit<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })?;
        if min == max {
            return Some(Self::new(min - 1.0, max + 1.0));
        }
        let margin = (max - min) * AUTOSCALE_MARGIN;
        Some(Self::new(min - margin, max + margin))
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    fn to_column(&self, value: f64, width: u32) -> i32 {
        let x = ((value - self.min) / self.span() * width as f64).floor() as i64;
        x.clamp(0, width as i64 - 1) as i32
    }

    // Row 0 is the top of the grid so the maximum maps to it.
    fn to_row(&self, value: f64, height: u32) -> i32 {
        let y = ((self.max - value) / self.span() * (height - 1) as f64).round() as i64;
        y.clamp(0, height as i64 - 1) as i32
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnSpan {
    first: i32,
    last: i32,
    top: i32,
    bottom: i32,
}

/// Display sink showing the last played buffer as amplitude against time.
pub struct Oscilloscope {
    trace: Vec<(f64, f64)>,
    x_range: AxisRange,
    y_range: AxisRange,
}

impl Default for Oscilloscope {
    fn default() -> Self {
        Self::new()
    }
}

impl Oscilloscope {
    pub fn new() -> Self {
        Self {
            trace: Vec::new(),
            x_range: AxisRange::new(0.0, NOTE_DURATION_S),
            y_range: AxisRange::new(i16::MIN as f64, i16::MAX as f64),
        }
    }

    pub fn trace(&self) -> &[(f64, f64)] {
        &self.trace
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    pub fn y_range(&self) -> AxisRange {
        self.y_range
    }

    fn column_spans(&self, size: Size) -> Vec<Option<ColumnSpan>> {
        let mut spans: Vec<Option<ColumnSpan>> = vec![None; size.width() as usize];
        for &(t, amplitude) in &self.trace {
            let x = self.x_range.to_column(t, size.width());
            let y = self.y_range.to_row(amplitude, size.height());
            let span = spans[x as usize].get_or_insert(ColumnSpan {
                first: y,
                last: y,
                top: y,
                bottom: y,
            });
            span.last = y;
            span.top = span.top.min(y);
            span.bottom = span.bottom.max(y);
        }
        spans
    }

    /// Grid cells covered by the trace when drawn into a grid of the given size. Every sample
    /// falling in a column is drawn, and consecutive columns are joined by a line.
    pub fn trace_coords(&self, size: Size) -> Vec<Coord> {
        if self.trace.is_empty() || size.width() == 0 || size.height() == 0 {
            return Vec::new();
        }
        let mut coords = Vec::new();
        let mut prev: Option<Coord> = None;
        for (x, span) in self.column_spans(size).into_iter().enumerate() {
            let Some(span) = span else {
                continue;
            };
            let x = x as i32;
            if let Some(prev) = prev {
                coords.extend(line_2d::coords_between(prev, Coord::new(x, span.first)));
            }
            coords.extend((span.top..=span.bottom).map(|y| Coord::new(x, y)));
            prev = Some(Coord::new(x, span.last));
        }
        coords
    }
}

impl DisplaySink for Oscilloscope {
    fn show(&mut self, buffer: &SampleBuffer) {
        self.trace = buffer.time_series().collect();
        if let Some(x_range) = AxisRange::fit(self.trace.iter().map(|&(t, _)| t)) {
            self.x_range = x_range;
        }
        if let Some(y_range) = AxisRange::fit(self.trace.iter().map(|&(_, a)| a)) {
            self.y_range = y_range;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::waveform::{generate, Generator, WaveShape};

    macro_rules! assert_approx_eq_f64 {
        ($lhs: expr, $rhs: expr) => {
            assert!(
                ($lhs - $rhs).abs() < 1e-6,
                "abs({} - {}) >= {}",
                $lhs,
                $rhs,
                1e-6
            )
        };
    }

    #[test]
    fn starts_with_fixed_axes_and_no_trace() {
        let scope = Oscilloscope::new();
        assert!(scope.trace().is_empty());
        assert_eq!(scope.x_range(), AxisRange::new(0.0, 1.0));
        assert_eq!(scope.y_range(), AxisRange::new(-32768.0, 32767.0));
        assert!(scope.trace_coords(Size::new(40, 10)).is_empty());
    }

    #[test]
    fn show_autoscales_to_data() {
        let mut scope = Oscilloscope::new();
        scope.show(&Generator::new(10, 1.0).generate(WaveShape::Sawtooth, 1.0));
        assert_eq!(scope.trace().len(), 10);
        // time data spans [0, 0.9], amplitude data spans [-32767, 26213]
        assert_approx_eq_f64!(scope.x_range().min, -0.045);
        assert_approx_eq_f64!(scope.x_range().max, 0.945);
        let y_margin = (26213.0 + 32767.0) * 0.05;
        assert_approx_eq_f64!(scope.y_range().min, -32767.0 - y_margin);
        assert_approx_eq_f64!(scope.y_range().max, 26213.0 + y_margin);
    }

    #[test]
    fn fit_widens_flat_data() {
        assert_eq!(
            AxisRange::fit([0.0, 0.0, 0.0]),
            Some(AxisRange::new(-1.0, 1.0))
        );
        assert_eq!(AxisRange::fit(std::iter::empty()), None);
    }

    #[test]
    fn trace_stays_inside_grid() {
        let size = Size::new(80, 20);
        for shape in WaveShape::ALL {
            let mut scope = Oscilloscope::new();
            scope.show(&generate(shape, 261.63));
            let coords = scope.trace_coords(size);
            assert!(!coords.is_empty());
            assert!(coords.iter().all(|c| c.x >= 0
                && c.y >= 0
                && (c.x as u32) < size.width()
                && (c.y as u32) < size.height()));
        }
    }

    #[test]
    fn dense_trace_fills_the_plot() {
        let size = Size::new(50, 12);
        let mut scope = Oscilloscope::new();
        scope.show(&generate(WaveShape::Sine, 440.0));
        let coords = scope.trace_coords(size);
        // columns at the edges only cover the autoscale margin
        for x in 3..47 {
            assert!(coords.iter().any(|c| c.x == x), "column {} is empty", x);
        }
        let top = coords.iter().map(|c| c.y).min().unwrap();
        let bottom = coords.iter().map(|c| c.y).max().unwrap();
        assert!(top <= 1);
        assert!(bottom >= size.height() as i32 - 2);
    }
}

/// Sums of every `width`-long contiguous window of `values`, in order of the window start.
///
/// Uses a rolling sum with [Neumaier][1] compensation, so each step costs O(1) and windows
/// holding the same values produce the same sum no matter how much was added and removed before.
///
/// A zero `width` yields `values.len() + 1` empty windows, a `width` longer than `values` yields
/// none.
///
/// [1]: https://en.wikipedia.org/wiki/Kahan_summation_algorithm#Further_enhancements
pub fn rolling_sums(values: &[f64], width: usize) -> Vec<f64> {
    if width > values.len() {
        return Vec::new();
    }
    let mut sums = Vec::with_capacity(values.len() - width + 1);
    let mut accumulator = Accumulator::default();
    for value in &values[..width] {
        accumulator.add(*value);
    }
    sums.push(accumulator.value());
    for (entering, leaving) in values[width..].iter().zip(values) {
        accumulator.add(*entering);
        accumulator.add(-*leaving);
        sums.push(accumulator.value());
    }
    sums
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    compensation: f64,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

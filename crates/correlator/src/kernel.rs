//! Correlation strategies.
//!
//! Each kernel owns its delay line(s) and turns one incoming sample into the
//! complex correlation sum for the updated window. All three evaluate
//! `Σ window[j]·template[j]` (no conjugation); they differ in how the real
//! multiplies are arranged.

use contracts::CorrelationStrategy;
use fixed_point::{CFixed, Fixed, FixedFormat};

use crate::engine::{split_sample, RealConvolver};
use crate::template::{combine, Template, ThreeMultTaps};
use crate::window::SlidingWindow;

/// One correlation strategy with its own sample history
pub trait CorrelationKernel: Send {
    /// Shift `sample` in as the newest entry and return the correlation sum
    fn push(&mut self, sample: CFixed) -> CFixed;

    /// Zero the delay line(s)
    fn reset(&mut self);

    fn strategy(&self) -> CorrelationStrategy;
}

/// Build the kernel for `strategy`
pub fn kernel_for(
    strategy: CorrelationStrategy,
    fmt: FixedFormat,
    template: &Template,
) -> Box<dyn CorrelationKernel> {
    match strategy {
        CorrelationStrategy::Direct => Box::new(DirectKernel::new(fmt, template.clone())),
        CorrelationStrategy::ThreeMult => Box::new(ThreeMultKernel::new(
            fmt,
            ThreeMultTaps::from_template(template, &fmt),
        )),
        CorrelationStrategy::SplitEngine => Box::new(SplitKernel::new(
            fmt,
            &ThreeMultTaps::from_template(template, &fmt),
        )),
    }
}

/// Four real multiplies per tap: `acc += window[j] * template[j]`
#[derive(Debug)]
pub struct DirectKernel {
    fmt: FixedFormat,
    template: Template,
    window: SlidingWindow<CFixed>,
}

impl DirectKernel {
    pub fn new(fmt: FixedFormat, template: Template) -> Self {
        let window = SlidingWindow::new(template.len());
        Self {
            fmt,
            template,
            window,
        }
    }
}

impl CorrelationKernel for DirectKernel {
    fn push(&mut self, sample: CFixed) -> CFixed {
        self.window.push(sample);
        let fmt = &self.fmt;
        self.window
            .iter()
            .zip(self.template.taps())
            .fold(fmt.complex_zero(), |acc, (&x, &t)| {
                fmt.cadd(acc, fmt.cmul(x, t))
            })
    }

    fn reset(&mut self) {
        self.window.clear();
    }

    fn strategy(&self) -> CorrelationStrategy {
        CorrelationStrategy::Direct
    }
}

/// Three real multiplies per tap over a complex window
#[derive(Debug)]
pub struct ThreeMultKernel {
    fmt: FixedFormat,
    taps: ThreeMultTaps,
    window: SlidingWindow<CFixed>,
}

impl ThreeMultKernel {
    pub fn new(fmt: FixedFormat, taps: ThreeMultTaps) -> Self {
        let window = SlidingWindow::new(taps.len());
        Self { fmt, taps, window }
    }
}

impl CorrelationKernel for ThreeMultKernel {
    fn push(&mut self, sample: CFixed) -> CFixed {
        self.window.push(sample);
        let fmt = &self.fmt;
        let (c0, c1, c2) = (self.taps.c0(), self.taps.c1(), self.taps.c2());

        let (mut a, mut b, mut c) = (Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);
        for (j, x) in self.window.iter().enumerate() {
            a = fmt.mac(a, x.re, c0[j]);
            b = fmt.mac(b, x.im, c1[j]);
            c = fmt.mac(c, fmt.add(x.re, x.im), c2[j]);
        }
        combine(fmt, a, b, c)
    }

    fn reset(&mut self) {
        self.window.clear();
    }

    fn strategy(&self) -> CorrelationStrategy {
        CorrelationStrategy::ThreeMult
    }
}

/// Three independent real convolvers, recombined per sample.
///
/// Same arithmetic as [`ThreeMultKernel`] in the same order, so the two are
/// bit-identical; the difference is that each stream has its own delay line,
/// which lets the concurrent pipeline run them as separate stages.
#[derive(Debug)]
pub struct SplitKernel {
    fmt: FixedFormat,
    engines: [RealConvolver; 3],
}

impl SplitKernel {
    pub fn new(fmt: FixedFormat, taps: &ThreeMultTaps) -> Self {
        let engines = taps.streams().map(|set| RealConvolver::new(fmt, set));
        Self { fmt, engines }
    }
}

impl CorrelationKernel for SplitKernel {
    fn push(&mut self, sample: CFixed) -> CFixed {
        let streams = split_sample(&self.fmt, sample);
        let [a, b, c] = [0, 1, 2].map(|i| self.engines[i].push(streams[i]));
        combine(&self.fmt, a, b, c)
    }

    fn reset(&mut self) {
        self.engines.iter_mut().for_each(RealConvolver::reset);
    }

    fn strategy(&self) -> CorrelationStrategy {
        CorrelationStrategy::SplitEngine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn fmt() -> FixedFormat {
        FixedFormat::signed(18, 2).unwrap()
    }

    fn random_taps(rng: &mut StdRng, fmt: &FixedFormat, len: usize, scale: f64) -> Vec<CFixed> {
        (0..len)
            .map(|_| {
                fmt.complex_from_f64(
                    rng.random_range(-scale..scale),
                    rng.random_range(-scale..scale),
                )
            })
            .collect()
    }

    fn all_kernels(fmt: FixedFormat, template: &Template) -> Vec<Box<dyn CorrelationKernel>> {
        CorrelationStrategy::ALL
            .iter()
            .map(|&s| kernel_for(s, fmt, template))
            .collect()
    }

    #[test]
    fn test_kernel_for_selects_strategy() {
        let fmt = fmt();
        let template = Template::new(&[fmt.complex_from_f64(0.5, 0.0); 4], 4).unwrap();
        for strategy in CorrelationStrategy::ALL {
            assert_eq!(kernel_for(strategy, fmt, &template).strategy(), strategy);
        }
    }

    #[test]
    fn test_impulse_reads_out_template() {
        // A unit impulse walks through the window and reproduces each tap
        let fmt = fmt();
        let taps = vec![
            fmt.complex_from_f64(0.5, 0.25),
            fmt.complex_from_f64(-0.125, 0.75),
            fmt.complex_from_f64(0.0, -0.5),
        ];
        let template = Template::new(&taps, 3).unwrap();
        let one = fmt.complex_from_f64(1.0, 0.0);
        let zero = fmt.complex_zero();

        for mut kernel in all_kernels(fmt, &template) {
            assert_eq!(kernel.push(one), taps[0], "{}", kernel.strategy());
            assert_eq!(kernel.push(zero), taps[1], "{}", kernel.strategy());
            assert_eq!(kernel.push(zero), taps[2], "{}", kernel.strategy());
            assert_eq!(kernel.push(zero), zero, "{}", kernel.strategy());
        }
    }

    #[test]
    fn test_template_is_not_conjugated() {
        // i * i = -1: a conjugating kernel would give +1
        let fmt = fmt();
        let j = fmt.complex_from_f64(0.0, 0.5);
        let template = Template::new(&[j], 1).unwrap();
        for mut kernel in all_kernels(fmt, &template) {
            let sum = fmt.complex_to_c64(kernel.push(j));
            assert_eq!(sum.re, -0.25, "{}", kernel.strategy());
            assert_eq!(sum.im, 0.0, "{}", kernel.strategy());
        }
    }

    #[test]
    fn test_reset_zeroes_history() {
        let fmt = fmt();
        let template = Template::new(&[fmt.complex_from_f64(0.5, 0.5); 2], 2).unwrap();
        let x = fmt.complex_from_f64(0.25, -0.25);
        for mut kernel in all_kernels(fmt, &template) {
            let first = kernel.push(x);
            kernel.push(x);
            kernel.reset();
            assert_eq!(kernel.push(x), first, "{}", kernel.strategy());
        }
    }

    #[test]
    fn test_split_engine_bit_identical_to_three_mult() {
        let fmt = fmt();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let taps = random_taps(&mut rng, &fmt, 16, 1.0 / 32.0);
            let template = Template::new(&taps, 16).unwrap();
            let three = ThreeMultTaps::from_template(&template, &fmt);
            let mut a = ThreeMultKernel::new(fmt, three.clone());
            let mut b = SplitKernel::new(fmt, &three);
            for sample in random_taps(&mut rng, &fmt, 64, 0.5) {
                assert_eq!(a.push(sample), b.push(sample));
            }
        }
    }

    #[test]
    fn test_three_mult_matches_direct_within_tolerance() {
        let fmt = fmt();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let len = 16;
        // Truncation error: < len lsb per sum, at most two sums per component
        let tolerance = 3 * len as i64;

        for _ in 0..50 {
            let taps = random_taps(&mut rng, &fmt, len, 1.0 / 32.0);
            let template = Template::new(&taps, len).unwrap();
            let mut direct = DirectKernel::new(fmt, template.clone());
            let mut three = ThreeMultKernel::new(fmt, ThreeMultTaps::from_template(&template, &fmt));

            for sample in random_taps(&mut rng, &fmt, 48, 0.5) {
                let d = direct.push(sample);
                let t = three.push(sample);
                assert!((d.re.raw() - t.re.raw()).abs() <= tolerance);
                assert!((d.im.raw() - t.im.raw()).abs() <= tolerance);
            }
        }
    }

    #[test]
    fn test_exact_values_agree_bit_for_bit() {
        // Coarse values whose products are exact in the format
        let fmt = fmt();
        let mut rng = StdRng::seed_from_u64(3);
        let grid = |rng: &mut StdRng| rng.random_range(-4i32..4) as f64 / 16.0;
        let taps: Vec<CFixed> = (0..8)
            .map(|_| fmt.complex_from_f64(grid(&mut rng), grid(&mut rng)))
            .collect();
        let template = Template::new(&taps, 8).unwrap();

        let mut kernels = all_kernels(fmt, &template);
        for _ in 0..40 {
            let sample = fmt.complex_from_f64(grid(&mut rng), grid(&mut rng));
            let sums: Vec<CFixed> = kernels.iter_mut().map(|k| k.push(sample)).collect();
            assert_eq!(sums[0], sums[1]);
            assert_eq!(sums[1], sums[2]);
        }
    }
}

//! Streaming correlator: one sample in, one energy out.

use std::fmt;

use contracts::{ContractError, CorrelationStrategy, DetectorConfig};
use fixed_point::{CFixed, Fixed, FixedFormat};
use tracing::{debug, instrument};

use crate::kernel::{kernel_for, CorrelationKernel};
use crate::template::Template;

/// Matched-filter correlator.
///
/// Holds the template and a zero-initialized window of `filter_length`
/// samples. Each [`process`](Self::process) call shifts one sample in and
/// returns `|Σ window[j]·template[j]|²` for the updated window.
pub struct Correlator {
    fmt: FixedFormat,
    template: Template,
    kernel: Box<dyn CorrelationKernel>,
}

impl fmt::Debug for Correlator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correlator")
            .field("strategy", &self.kernel.strategy())
            .field("filter_length", &self.template.len())
            .finish()
    }
}

impl Correlator {
    /// Build a correlator with the configured strategy
    ///
    /// # Errors
    /// - Invalid fixed-point format
    /// - Template length different from `detector.filter_length`
    #[instrument(
        name = "correlator_new",
        skip(config, template),
        fields(
            strategy = %config.strategy(),
            filter_length = config.filter_length(),
            taps = template.len()
        )
    )]
    pub fn new(config: &DetectorConfig, template: &[CFixed]) -> Result<Self, ContractError> {
        let fmt = config.format()?;
        let template = Template::new(template, config.filter_length())?;
        let correlator = Self::with_template(fmt, template, config.strategy());
        debug!("correlator ready");
        Ok(correlator)
    }

    /// Build from an already validated template
    pub fn with_template(
        fmt: FixedFormat,
        template: Template,
        strategy: CorrelationStrategy,
    ) -> Self {
        let kernel = kernel_for(strategy, fmt, &template);
        Self {
            fmt,
            template,
            kernel,
        }
    }

    /// Shift one sample in and return the correlation energy
    #[inline]
    pub fn process(&mut self, sample: CFixed) -> Fixed {
        let sum = self.correlate(sample);
        self.fmt.norm_sqr(sum)
    }

    /// Shift one sample in and return the complex correlation sum
    #[inline]
    pub fn correlate(&mut self, sample: CFixed) -> CFixed {
        self.kernel.push(sample)
    }

    /// Zero the window; the template is kept
    pub fn reset(&mut self) {
        self.kernel.reset();
    }

    pub fn strategy(&self) -> CorrelationStrategy {
        self.kernel.strategy()
    }

    pub fn format(&self) -> FixedFormat {
        self.fmt
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn filter_length(&self) -> usize {
        self.template.len()
    }
}

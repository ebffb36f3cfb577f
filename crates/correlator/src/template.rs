//! Coefficient tables.

use std::sync::Arc;

use contracts::ContractError;
use fixed_point::{CFixed, Fixed, FixedFormat};

/// Complex template, exactly `filter_length` taps.
///
/// Tap `j` multiplies window entry `j` (the sample `j` positions back from
/// the newest). Cloning shares the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    taps: Arc<[CFixed]>,
}

impl Template {
    /// Load a template for a filter of `filter_length` taps
    ///
    /// # Errors
    /// `InvalidConfiguration` when the tap count differs from `filter_length`
    pub fn new(taps: &[CFixed], filter_length: usize) -> Result<Self, ContractError> {
        if filter_length == 0 {
            return Err(ContractError::invalid_configuration(
                "filter_length must be >= 1",
            ));
        }
        if taps.len() != filter_length {
            return Err(ContractError::invalid_configuration(format!(
                "template has {} taps, filter_length is {}",
                taps.len(),
                filter_length
            )));
        }
        Ok(Self {
            taps: Arc::from(taps),
        })
    }

    #[inline]
    pub fn taps(&self) -> &[CFixed] {
        &self.taps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Precomputed real tap sets for the three-multiply product.
///
/// For tap `t = tr + ti·i`: `c0 = tr + ti`, `c1 = tr - ti`, `c2 = ti`.
/// With `A = Σ dr·c0`, `B = Σ di·c1`, `C = Σ (dr + di)·c2` the complex sum
/// is `(A - C) + (B + C)i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeMultTaps {
    c0: Arc<[Fixed]>,
    c1: Arc<[Fixed]>,
    c2: Arc<[Fixed]>,
}

impl ThreeMultTaps {
    pub fn from_template(template: &Template, fmt: &FixedFormat) -> Self {
        let taps = template.taps();
        Self {
            c0: taps.iter().map(|t| fmt.add(t.re, t.im)).collect(),
            c1: taps.iter().map(|t| fmt.sub(t.re, t.im)).collect(),
            c2: taps.iter().map(|t| t.im).collect(),
        }
    }

    pub fn c0(&self) -> &Arc<[Fixed]> {
        &self.c0
    }

    pub fn c1(&self) -> &Arc<[Fixed]> {
        &self.c1
    }

    pub fn c2(&self) -> &Arc<[Fixed]> {
        &self.c2
    }

    /// Tap sets in stream order: `dr`, `di`, `dr + di`
    pub fn streams(&self) -> [Arc<[Fixed]>; 3] {
        [self.c0.clone(), self.c1.clone(), self.c2.clone()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.c0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.c0.is_empty()
    }
}

/// Recombine the three real sums into the complex correlation
#[inline]
pub fn combine(fmt: &FixedFormat, a: Fixed, b: Fixed, c: Fixed) -> CFixed {
    CFixed::new(fmt.sub(a, c), fmt.add(b, c))
}

//! Multi-sweep driver
//!
//! Sweeps share no state, so a volume runs them in parallel. Each sweep gets
//! its own clumps, gaps and kernels, and kernel ids restart per sweep.

use crate::clump::RegionLabeler;
use crate::config::RepohParams;
use crate::sweep::{Sweep, SweepError, SweepGeometry, SweepInputs, SweepResult};
use rayon::prelude::*;
use tracing::{info, warn};

/// The sweeps of one radar volume
#[derive(Debug, Clone, Default)]
pub struct Volume<'a> {
    sweeps: Vec<(SweepInputs<'a>, SweepGeometry)>,
}

impl<'a> Volume<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sweep
    pub fn push(&mut self, inputs: SweepInputs<'a>, geometry: SweepGeometry) {
        self.sweeps.push((inputs, geometry));
    }

    pub fn len(&self) -> usize {
        self.sweeps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sweeps.is_empty()
    }

    /// Process every sweep
    ///
    /// # Returns
    ///
    /// One result per sweep, in the order sweeps were added
    pub fn process<L>(&self, params: &RepohParams, labeler: &L) -> Vec<Result<SweepResult, SweepError>>
    where
        L: RegionLabeler + Sync + ?Sized,
    {
        let results: Vec<_> = self
            .sweeps
            .par_iter()
            .map(|(inputs, geometry)| Sweep::process(inputs, params, geometry, labeler))
            .collect();

        let mut good = 0;
        for (i, r) in results.iter().enumerate() {
            match r {
                Ok(sweep) => good += sweep.kernels.len(),
                Err(e) => warn!("Sweep {} failed: {}", i, e),
            }
        }
        info!(
            "Volume: {} sweeps processed, {} good kernel pairs",
            results.len(),
            good
        );
        results
    }
}

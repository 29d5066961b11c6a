//! All kernel pairs of one sweep

use super::grids::KernelGrids;
use super::kernel::Kernel;
use super::pair::{humidity_from_attenuation, KernelPair};
use crate::clump::ClumpRegions;
use crate::config::KernelParams;
use crate::gap::{CloudGap, CloudGaps};
use crate::grid::Grid;
use crate::output::{AsciiRecord, KernelPolygon};
use crate::sweep::SweepGeometry;
use tracing::debug;

/// Id given to the near kernel of the first pair
pub const FIRST_KERNEL_ID: usize = 1;

/// Insertion-ordered kernel pairs with sweep-unique ids
#[derive(Debug, Clone, PartialEq)]
pub struct Kernels {
    pairs: Vec<KernelPair>,
    next_id: usize,
}

impl Default for Kernels {
    fn default() -> Self {
        Self {
            pairs: Vec::new(),
            next_id: FIRST_KERNEL_ID,
        }
    }
}

impl Kernels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pair for every gap, keeping the usable ones
    ///
    /// # Arguments
    ///
    /// * `gaps` - Gaps in detection order
    /// * `clumps` - Regions whose colors the gap endpoints carry
    /// * `template` - Grid giving the sweep shape and sentinel
    /// * `outside_mask` - Background points
    /// * `grids` - Fields read for statistics
    /// * `params` - Kernel thresholds
    pub fn build(
        gaps: &CloudGaps,
        clumps: &ClumpRegions,
        template: &Grid,
        outside_mask: &Grid,
        grids: &KernelGrids<'_>,
        params: &KernelParams,
    ) -> Self {
        let mut kernels = Self::new();
        for gap in gaps {
            let Some(far_mask) = Self::clump_mask(gap, true, clumps, template) else {
                continue;
            };
            let near_mask = if gap.is_closest() {
                template.blank_like()
            } else {
                match Self::clump_mask(gap, false, clumps, template) {
                    Some(mask) => mask,
                    None => continue,
                }
            };

            let pair = KernelPair::build(gap, &near_mask, &far_mask, outside_mask, grids, params);
            if pair.is_ok() {
                kernels.add(pair);
            } else {
                debug!("{} dropped: kernels too small", gap);
            }
        }
        debug!(
            "Built {} kernel pairs from {} gaps",
            kernels.len(),
            gaps.len()
        );
        kernels
    }

    fn clump_mask(
        gap: &CloudGap,
        is_far: bool,
        clumps: &ClumpRegions,
        template: &Grid,
    ) -> Option<Grid> {
        let color = gap.color(is_far)?;
        let index = clumps.index_for_color(color)?;
        clumps.region_mask(index, template)
    }

    /// Append a pair, giving its kernels the next two ids
    pub fn add(&mut self, mut pair: KernelPair) {
        pair.finish(self.next_id, self.next_id + 1);
        self.next_id += 2;
        self.pairs.push(pair);
    }

    /// Id the next added near kernel receives
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KernelPair> {
        self.pairs.iter()
    }

    /// Remove pairs that are not good, keeping order and ids
    pub fn filter_to_good(&mut self) {
        let before = self.pairs.len();
        self.pairs.retain(KernelPair::is_good);
        debug!("Kept {} of {} kernel pairs as good", self.pairs.len(), before);
    }

    /// Copy holding only the good pairs
    #[must_use]
    pub fn filtered_to_good(&self) -> Self {
        let mut good = self.clone();
        good.filter_to_good();
        good
    }

    /// Kernel centers painted with their ids
    pub fn center_points_grid(&self, template: &Grid) -> Grid {
        let mut out = template.blank_like();
        for pair in &self.pairs {
            for k in [pair.near(), pair.far()] {
                if let Some(id) = k.id() {
                    out.set_at(k.center(), id as f64);
                }
            }
        }
        out
    }

    /// Attenuation written across each pair's gate span
    pub fn attenuation_grid(&self, dx_km: f64, template: &Grid) -> Grid {
        self.span_grid(template, |pair| pair.attenuation(dx_km))
    }

    /// Humidity written across each pair's gate span
    pub fn humidity_grid(&self, dx_km: f64, template: &Grid) -> Grid {
        self.span_grid(template, |pair| pair.humidity(dx_km))
    }

    fn span_grid<F>(&self, template: &Grid, value: F) -> Grid
    where
        F: Fn(&KernelPair) -> Option<f64>,
    {
        let mut out = template.blank_like();
        for pair in &self.pairs {
            let Some(v) = value(pair) else {
                continue;
            };
            let y = pair.y();
            let (x0, x1) = pair.x_span();
            for x in x0..=x1 {
                out.set(x, y, v);
            }
        }
        out
    }

    /// One record per pair with an attenuation value
    pub fn ascii_records(&self, vlevel: f64, geometry: &SweepGeometry) -> Vec<AsciiRecord> {
        self.pairs
            .iter()
            .filter_map(|pair| {
                let attenuation = pair.attenuation(geometry.gate_spacing_km)?;
                Some(AsciiRecord {
                    vlevel,
                    azimuth: geometry.azimuth_deg(pair.y()),
                    x_far_km: geometry.range_km(pair.far().center().x),
                    x_near_km: geometry.range_km(pair.near().center().x),
                    attenuation,
                    humidity: humidity_from_attenuation(attenuation),
                })
            })
            .collect()
    }

    /// Boundary polygons of every finished kernel
    pub fn polygons(&self, vlevel: f64) -> Vec<KernelPolygon> {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.near(), pair.far()])
            .filter_map(|k| {
                Some(KernelPolygon {
                    id: k.id()?,
                    vlevel,
                    beam: k.y(),
                    is_far: k.is_far(),
                    good: k.is_good(),
                    points: k.boundary(),
                })
            })
            .collect()
    }

    /// One line per pair
    pub fn summary(&self, dx_km: f64) -> Vec<String> {
        self.pairs
            .iter()
            .map(|pair| {
                let id = |k: &Kernel| k.id().unwrap_or_default();
                let atten = pair
                    .attenuation(dx_km)
                    .map_or_else(|| "-".to_string(), |a| format!("{a:.5}"));
                let humidity = pair
                    .humidity(dx_km)
                    .map_or_else(|| "-".to_string(), |h| format!("{h:.5}"));
                format!(
                    "pair {}/{} y={} near_x={} far_x={} ok={} good={} atten={} humidity={}",
                    id(pair.near()),
                    id(pair.far()),
                    pair.y(),
                    pair.near().center().x,
                    pair.far().center().x,
                    pair.is_ok(),
                    pair.is_good(),
                    atten,
                    humidity
                )
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Kernels {
    type Item = &'a KernelPair;
    type IntoIter = std::slice::Iter<'a, KernelPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

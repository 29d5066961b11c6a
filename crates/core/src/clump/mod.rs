//! Connected-region bookkeeping
//!
//! Clumps are maximal connected sets of foreground points. Region `i` of a
//! labeling is painted with color `i + 1`; every lookup in the pipeline goes
//! through [`index_to_color`] and [`color_to_index`] so the convention lives
//! in one place.

mod associate;
mod labeling;
mod regions;

pub use associate::{ClumpAssociate, ClumpAssociation};
pub use labeling::{ConnectedRegions, RegionLabeler};
pub use regions::ClumpRegions;

/// Color painted for region index `index`
pub fn index_to_color(index: usize) -> f64 {
    (index + 1) as f64
}

/// Region index for a painted color
///
/// Returns `None` for colors below 1, which no region can carry.
pub fn color_to_index(color: f64) -> Option<usize> {
    let c = color.round();
    (c >= 1.0).then(|| c as usize - 1)
}

/// Integer key for a color, used for hashing
pub(crate) fn color_key(color: f64) -> i64 {
    color.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_index_convention() {
        assert_eq!(index_to_color(0), 1.0);
        assert_eq!(color_to_index(1.0), Some(0));
        assert_eq!(color_to_index(17.0), Some(16));
        assert_eq!(color_to_index(0.0), None);
        assert_eq!(color_to_index(-3.0), None);
    }
}

//! The per-step statistics tuple.

use crate::cell::Cell;

/// What one relaxation step did.
///
/// This is the only externally observed output of a step besides the
/// grid itself. `lost` and `total` share the grid's cell type: the
/// dissipative model loses fractional grains at the boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepStats<T> {
    /// Number of cells that toppled during the step.
    pub critical: u64,
    /// Grains injected by forcing during the step.
    pub added: u64,
    /// Grains that left the grid through a void boundary.
    pub lost: T,
    /// Total grains in grid plus pending buffer after the step.
    pub total: T,
}

impl<T: Cell> StepStats<T> {
    /// `true` when nothing toppled, i.e. the next step may inject grains
    /// in the slowly driven regime.
    pub fn is_quiet(&self) -> bool {
        self.critical == 0
    }

    /// Render as one data-log line: `critical;added;lost;total;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use topple_core::StepStats;
    ///
    /// let s = StepStats { critical: 3, added: 0, lost: 1i64, total: 2040 };
    /// assert_eq!(s.log_line(), "3;0;1;2040;");
    ///
    /// // Real cells always carry a decimal point.
    /// let s = StepStats { critical: 0, added: 2, lost: 0.0f64, total: 18.0 };
    /// assert_eq!(s.log_line(), "0;2;0.0;18.0;");
    /// ```
    pub fn log_line(&self) -> String {
        // `Debug` keeps the `.0` on integral reals; for `i64` it matches `Display`.
        format!(
            "{};{};{:?};{:?};",
            self.critical, self.added, self.lost, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_means_no_topples() {
        let s = StepStats {
            critical: 0,
            added: 5,
            lost: 0i64,
            total: 10,
        };
        assert!(s.is_quiet());
        assert!(!StepStats { critical: 1, ..s }.is_quiet());
    }

    #[test]
    fn real_log_line_uses_shortest_float_repr() {
        let s = StepStats {
            critical: 1,
            added: 0,
            lost: 0.25f64,
            total: 12.5,
        };
        assert_eq!(s.log_line(), "1;0;0.25;12.5;");
        let whole = StepStats {
            lost: 4.0f64,
            total: 18.0,
            ..s
        };
        assert_eq!(whole.log_line(), "1;0;4.0;18.0;");
    }

    #[test]
    fn integer_log_line_has_no_decimal_point() {
        let s = StepStats {
            critical: 2,
            added: 1,
            lost: 0i64,
            total: 18,
        };
        assert_eq!(s.log_line(), "2;1;0;18;");
    }
}

use nalgebra::DMatrix;

use crate::properties::{PropertyId, PropertyStore};
use crate::utils::math::{reciprocal_seq_diff, scale_array, search_ordered, Bracket};

/// 1-D interpolated lookup table keyed on a property.
///
/// Breakpoints are scaled to SI once at construction and the reciprocal row
/// differences precomputed, so evaluation is allocation-free. Queries outside
/// the row range clamp to the edge values; there is no extrapolation.
#[derive(Debug, Clone)]
pub struct Table1 {
    pub var: PropertyId,
    rows: Vec<f32>,
    values: Vec<f32>,
    r_row_diff: Vec<f32>,
}

impl Table1 {
    pub fn new(var: PropertyId, mut rows: Vec<f32>, values: Vec<f32>, scale: f32) -> Self {
        debug_assert!(rows.len() >= 2 && rows.len() == values.len());
        scale_array(&mut rows, scale);
        let r_row_diff = reciprocal_seq_diff(&rows);
        Table1 {
            var,
            rows,
            values,
            r_row_diff,
        }
    }

    pub fn eval(&self, props: &PropertyStore) -> f32 {
        self.lookup(props.value(self.var))
    }

    pub fn lookup(&self, v: f32) -> f32 {
        let i = match search_ordered(&self.rows, v) {
            Bracket::Below => return self.values[0],
            Bracket::Above => return self.values[self.values.len() - 1],
            Bracket::Within(i) => i,
        };
        let alpha = (v - self.rows[i]) * self.r_row_diff[i];
        // linear interpolation
        self.values[i] + (self.values[i + 1] - self.values[i]) * alpha
    }

    pub fn rows(&self) -> &[f32] {
        &self.rows
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// 2-D bilinear lookup table. When one axis clamps, evaluation degrades to a
/// 1-D interpolation along the in-range axis at the clamped edge; when both
/// clamp, the corner value is returned directly.
#[derive(Debug, Clone)]
pub struct Table2 {
    pub var_row: PropertyId,
    pub var_col: PropertyId,
    rows: Vec<f32>,
    cols: Vec<f32>,
    values: DMatrix<f32>,
    r_row_diff: Vec<f32>,
    r_col_diff: Vec<f32>,
}

impl Table2 {
    pub fn new(
        var_row: PropertyId,
        var_col: PropertyId,
        mut rows: Vec<f32>,
        mut cols: Vec<f32>,
        values: DMatrix<f32>,
        row_scale: f32,
        col_scale: f32,
    ) -> Self {
        debug_assert!(values.nrows() == rows.len() && values.ncols() == cols.len());
        scale_array(&mut rows, row_scale);
        scale_array(&mut cols, col_scale);
        let r_row_diff = reciprocal_seq_diff(&rows);
        let r_col_diff = reciprocal_seq_diff(&cols);
        Table2 {
            var_row,
            var_col,
            rows,
            cols,
            values,
            r_row_diff,
            r_col_diff,
        }
    }

    pub fn eval(&self, props: &PropertyStore) -> f32 {
        self.lookup(props.value(self.var_row), props.value(self.var_col))
    }

    pub fn lookup(&self, vr: f32, vc: f32) -> f32 {
        let last_row = self.rows.len() - 1;
        let last_col = self.cols.len() - 1;
        let bi = search_ordered(&self.rows, vr);
        let bj = search_ordered(&self.cols, vc);

        let (i, j) = match (bi, bj) {
            (Bracket::Below, Bracket::Below) => return self.values[(0, 0)],
            (Bracket::Below, Bracket::Above) => return self.values[(0, last_col)],
            (Bracket::Above, Bracket::Below) => return self.values[(last_row, 0)],
            (Bracket::Above, Bracket::Above) => return self.values[(last_row, last_col)],
            (Bracket::Below, Bracket::Within(j)) => {
                return self.col_interp(0, j, vc);
            }
            (Bracket::Above, Bracket::Within(j)) => {
                return self.col_interp(last_row, j, vc);
            }
            (Bracket::Within(i), Bracket::Below) => {
                return self.row_interp(i, 0, vr);
            }
            (Bracket::Within(i), Bracket::Above) => {
                return self.row_interp(i, last_col, vr);
            }
            (Bracket::Within(i), Bracket::Within(j)) => (i, j),
        };

        let alpha = (vr - self.rows[i]) * self.r_row_diff[i];
        let beta = (vc - self.cols[j]) * self.r_col_diff[j];
        let a10 = self.values[(i + 1, j)] - self.values[(i, j)];
        let a01 = self.values[(i, j + 1)] - self.values[(i, j)];
        let a11 = self.values[(i + 1, j + 1)] + self.values[(i, j)]
            - (self.values[(i + 1, j)] + self.values[(i, j + 1)]);
        // bilinear interpolation
        self.values[(i, j)] + a10 * alpha + a01 * beta + a11 * alpha * beta
    }

    fn col_interp(&self, i: usize, j: usize, vc: f32) -> f32 {
        let a = (vc - self.cols[j]) * self.r_col_diff[j];
        self.values[(i, j)] + (self.values[(i, j + 1)] - self.values[(i, j)]) * a
    }

    fn row_interp(&self, i: usize, j: usize, vr: f32) -> f32 {
        let a = (vr - self.rows[i]) * self.r_row_diff[i];
        self.values[(i, j)] + (self.values[(i + 1, j)] - self.values[(i, j)]) * a
    }

    pub fn rows(&self) -> &[f32] {
        &self.rows
    }

    pub fn cols(&self) -> &[f32] {
        &self.cols
    }

    pub fn values(&self) -> &DMatrix<f32> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn store_with(var: &str) -> (PropertyStore, PropertyId) {
        let mut store = PropertyStore::new();
        let id = store.get_or_create(var);
        (store, id)
    }

    #[test]
    fn table1_interpolates_and_clamps() {
        let (store, var) = store_with("aero/alpha-rad");
        let t = Table1::new(
            var,
            vec![-0.2, 0.0, 0.3, 0.6],
            vec![-0.5, 0.2, 1.4, 0.9],
            1.0,
        );
        let _ = &store;

        // at breakpoints
        assert_relative_eq!(t.lookup(0.0), 0.2);
        assert_relative_eq!(t.lookup(0.3), 1.4);
        // manual linear interpolation between (0.0, 0.2) and (0.3, 1.4)
        assert_relative_eq!(t.lookup(0.15), 0.8, epsilon = 1e-6);
        // clamping
        assert_relative_eq!(t.lookup(-1.0), -0.5);
        assert_relative_eq!(t.lookup(0.6), 0.9);
        assert_relative_eq!(t.lookup(10.0), 0.9);
    }

    #[test]
    fn table1_scales_breakpoints_at_init() {
        let (_, var) = store_with("aero/alpha-deg");
        let deg = std::f32::consts::PI / 180.0;
        let t = Table1::new(var, vec![0.0, 10.0], vec![0.0, 1.0], deg);
        assert_relative_eq!(t.lookup(5.0 * deg), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn nan_query_propagates_instead_of_panicking() {
        let (_, var) = store_with("aero/alpha-rad");
        // long enough to exercise the bisection path
        let rows: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let values: Vec<f32> = rows.iter().map(|r| r * 2.0).collect();
        let t = Table1::new(var, rows, values, 1.0);
        assert!(t.lookup(f32::NAN).is_nan());

        let (mut store, vr) = store_with("r");
        let vc = store.get_or_create("c");
        let grid = DMatrix::from_fn(12, 12, |i, j| (i + j) as f32);
        let t2 = Table2::new(
            vr,
            vc,
            (0..12).map(|i| i as f32).collect(),
            (0..12).map(|i| i as f32).collect(),
            grid,
            1.0,
            1.0,
        );
        assert!(t2.lookup(f32::NAN, 3.0).is_nan());
        assert!(t2.lookup(3.0, f32::NAN).is_nan());
    }

    #[test]
    fn table2_bilinear_center() {
        let (mut store, vr) = store_with("aero/alpha-rad");
        let vc = store.get_or_create("fcs/flap-pos-deg");
        let values = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let t = Table2::new(vr, vc, vec![0.0, 1.0], vec![0.0, 1.0], values, 1.0, 1.0);
        assert_relative_eq!(t.lookup(0.5, 0.5), 2.5);
        assert_relative_eq!(t.lookup(0.0, 0.0), 1.0);
        assert_relative_eq!(t.lookup(0.25, 0.75), 1.0 + 2.0 * 0.25 + 1.0 * 0.75, epsilon = 1e-6);
    }

    #[test]
    fn table2_degrades_to_linear_on_clamped_axis() {
        let (mut store, vr) = store_with("r");
        let vc = store.get_or_create("c");
        let values = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = Table2::new(
            vr,
            vc,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0],
            values,
            1.0,
            1.0,
        );
        // row below range: 1-D along columns at row 0
        assert_relative_eq!(t.lookup(-5.0, 0.5), 1.5);
        // row above range: 1-D along columns at last row
        assert_relative_eq!(t.lookup(9.0, 0.5), 5.5);
        // column below range: 1-D along rows at column 0
        assert_relative_eq!(t.lookup(0.5, -3.0), 2.0);
        // both clamped: corner
        assert_relative_eq!(t.lookup(-1.0, -1.0), 1.0);
        assert_relative_eq!(t.lookup(9.0, 9.0), 6.0);
    }
}

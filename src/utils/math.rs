use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Result of an ordered-sequence search: either the bracketing interval or
/// which side of the table the query fell off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// `v < seq[0]`
    Below,
    /// `seq[i] <= v < seq[i + 1]`
    Within(usize),
    /// `v >= seq[last]`
    Above,
}

/// Locates `v` within a strictly increasing breakpoint sequence.
///
/// Short sequences are scanned linearly, longer ones bisected; the two paths
/// are observably identical. `seq` must hold at least two breakpoints.
pub fn search_ordered(seq: &[f32], v: f32) -> Bracket {
    if v.is_nan() {
        // an unordered query brackets nowhere; pin it to the last interval
        // so interpolation yields NaN instead of panicking
        return Bracket::Within(seq.len() - 2);
    }
    if v < seq[0] {
        return Bracket::Below;
    }
    if v >= seq[seq.len() - 1] {
        return Bracket::Above;
    }
    if seq.len() <= 10 {
        for i in 0..seq.len() - 1 {
            if v < seq[i + 1] {
                return Bracket::Within(i);
            }
        }
        // guards above make this unreachable for finite input
        Bracket::Within(seq.len() - 2)
    } else {
        let i = seq.partition_point(|&x| x <= v);
        Bracket::Within(i - 1)
    }
}

/// Precomputes `1 / (seq[i + 1] - seq[i])` for interpolation.
pub fn reciprocal_seq_diff(seq: &[f32]) -> Vec<f32> {
    seq.windows(2).map(|w| 1.0 / (w[1] - w[0])).collect()
}

/// Scales every element of `a` in place.
pub fn scale_array(a: &mut [f32], scale: f32) {
    for x in a.iter_mut() {
        *x *= scale;
    }
}

const DIAG_MAX_ITERS: usize = 24;

fn indexed_rotation(axis: usize, s: f32, c: f32) -> Quaternion<f32> {
    let mut v = [0.0f32; 3];
    v[axis] = s;
    Quaternion::new(c, v[0], v[1], v[2])
}

/// Diagonalizes a symmetric 3x3 matrix by iterative Jacobi quaternion
/// rotation (after an idea of Stan Melax, with a precision fix).
///
/// Returns the diagonal (principal moments when `m` is an inertia tensor)
/// and the accumulated rotation `q`, such that with `R = q.to_rotation_matrix()`
/// the input satisfies `m ≈ R * diag * Rᵀ`.
pub fn diagonalize(m: &Matrix3<f32>) -> (Vector3<f32>, UnitQuaternion<f32>) {
    let mut q = UnitQuaternion::identity();
    let mut d = *m;

    for _ in 0..DIAG_MAX_ITERS {
        let axes = q.to_rotation_matrix().into_inner();
        d = axes.transpose() * m * axes;

        // rotation axis index, from the largest off-diagonal element
        let d0 = d[(1, 2)].abs();
        let d1 = d[(0, 2)].abs();
        let d2 = d[(0, 1)].abs();
        let a = if d0 > d1 && d0 > d2 {
            0
        } else if d1 > d2 {
            1
        } else {
            2
        };

        let a1 = (a + 1) % 3;
        let a2 = (a1 + 1) % 3;
        if d[(a1, a2)] == 0.0
            || (d[(a1, a1)] - d[(a2, a2)]).abs() > 2e6 * (2.0 * d[(a1, a2)]).abs()
        {
            break;
        }

        // cot(2 * phi), where phi is the rotation angle
        let w = (d[(a1, a1)] - d[(a2, a2)]) / (2.0 * d[(a1, a2)]);

        let r = if w.abs() > 1000.0 {
            // cos(phi) would round to 1, use the small-angle approximation
            indexed_rotation(a, 1.0 / (4.0 * w), 1.0)
        } else {
            let t = 1.0 / (w.abs() + (w * w + 1.0).sqrt()); // |tan phi|
            let h = 1.0 / (t * t + 1.0).sqrt(); // |cos phi|
            indexed_rotation(
                a,
                ((1.0 - h) / 2.0).sqrt() * w.signum(),
                ((1.0 + h) / 2.0).sqrt(),
            )
        };

        q = UnitQuaternion::from_quaternion(q.into_inner() * r);
    }

    (Vector3::new(d[(0, 0)], d[(1, 1)], d[(2, 2)]), q)
}

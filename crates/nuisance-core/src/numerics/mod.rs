pub mod linalg;

pub use linalg::{
    HermitianEigenDecomposition, LinalgError, adjoint, complex_identity,
    hermitian_eigen_decompose, multiply, real_diagonal_to_complex, unitarity_deviation,
};

use faer::Mat;
use num_complex::Complex64;

pub type DenseComplexMatrix = Mat<Complex64>;
pub type DenseRealMatrix = Mat<f64>;

pub fn deterministic_argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_unstable_by(|lhs, rhs| {
        values[*lhs]
            .total_cmp(&values[*rhs])
            .then_with(|| lhs.cmp(rhs))
    });
    indices
}

pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 {
        return None;
    }

    let step = (end - start) / ((count - 1) as f64);
    let mut grid = Vec::with_capacity(count);
    for index in 0..count {
        grid.push(start + step * (index as f64));
    }

    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

/// `count` points spaced evenly in log10 between `10^start_exponent` and
/// `10^end_exponent`, both inclusive.
pub fn log_grid(start_exponent: f64, end_exponent: f64, count: usize) -> Option<Vec<f64>> {
    let exponents = linear_grid(start_exponent, end_exponent, count)?;
    Some(
        exponents
            .into_iter()
            .map(|exponent| 10_f64.powf(exponent))
            .collect(),
    )
}

pub fn is_strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|window| window[0] < window[1])
}

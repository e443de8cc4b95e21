use super::{DenseComplexMatrix, DenseRealMatrix};
use num_complex::Complex64;

const HERMITIAN_RELATIVE_TOLERANCE: f64 = 1.0e-12;
const JACOBI_RELATIVE_TOLERANCE: f64 = 1.0e-14;
const JACOBI_MAX_SWEEPS: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinalgError {
    #[error("eigendecomposition requires a square matrix, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("eigendecomposition requires a non-empty matrix")]
    EmptyMatrix,
    #[error("matrix entry ({row},{col}) is not finite")]
    NonFiniteEntry { row: usize, col: usize },
    #[error("matrix is not Hermitian at ({row},{col}), deviation {deviation:.3e}")]
    NonHermitian {
        row: usize,
        col: usize,
        deviation: f64,
    },
    #[error("Jacobi iteration did not converge after {sweeps} sweeps (off-diagonal norm {off_norm:.3e})")]
    NoConvergence { sweeps: usize, off_norm: f64 },
    #[error("matrix product shape mismatch: {lhs_rows}x{lhs_cols} * {rhs_rows}x{rhs_cols}")]
    ShapeMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },
}

/// Eigenpairs of a Hermitian matrix; column `k` of `eigenvectors` belongs to
/// `eigenvalues[k]`. Order is the order the sweeps leave on the diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct HermitianEigenDecomposition {
    eigenvalues: Vec<f64>,
    eigenvectors: DenseComplexMatrix,
    sweeps: usize,
}

impl HermitianEigenDecomposition {
    pub fn dimension(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn eigenvectors(&self) -> &DenseComplexMatrix {
        &self.eigenvectors
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    pub fn into_parts(self) -> (Vec<f64>, DenseComplexMatrix) {
        (self.eigenvalues, self.eigenvectors)
    }
}

/// Cyclic complex Jacobi diagonalization.
///
/// Each `(p, q)` rotation first removes the phase of `a[p,q]` and then applies
/// a real Givens rotation, so `G^H A G` zeroes the pair exactly. The sweep
/// order is fixed, which keeps the eigenvector phases reproducible.
pub fn hermitian_eigen_decompose(
    matrix: &DenseComplexMatrix,
) -> Result<HermitianEigenDecomposition, LinalgError> {
    let dimension = validate_hermitian(matrix)?;
    let mut work = matrix.clone();
    for index in 0..dimension {
        work[(index, index)] = Complex64::new(work[(index, index)].re, 0.0);
    }
    let mut vectors = complex_identity(dimension);

    let scale = frobenius_norm(&work);
    if scale == 0.0 {
        return Ok(HermitianEigenDecomposition {
            eigenvalues: vec![0.0; dimension],
            eigenvectors: vectors,
            sweeps: 0,
        });
    }

    let threshold = JACOBI_RELATIVE_TOLERANCE * scale;
    for sweep in 0..JACOBI_MAX_SWEEPS {
        if off_diagonal_norm(&work) <= threshold {
            return Ok(finish(work, vectors, sweep));
        }

        for p in 0..dimension {
            for q in (p + 1)..dimension {
                rotate_pair(&mut work, &mut vectors, p, q);
            }
        }
    }

    let off_norm = off_diagonal_norm(&work);
    if off_norm <= threshold {
        return Ok(finish(work, vectors, JACOBI_MAX_SWEEPS));
    }

    Err(LinalgError::NoConvergence {
        sweeps: JACOBI_MAX_SWEEPS,
        off_norm,
    })
}

fn finish(
    work: DenseComplexMatrix,
    vectors: DenseComplexMatrix,
    sweeps: usize,
) -> HermitianEigenDecomposition {
    let eigenvalues = (0..work.nrows()).map(|index| work[(index, index)].re).collect();
    HermitianEigenDecomposition {
        eigenvalues,
        eigenvectors: vectors,
        sweeps,
    }
}

fn rotate_pair(
    work: &mut DenseComplexMatrix,
    vectors: &mut DenseComplexMatrix,
    p: usize,
    q: usize,
) {
    let apq = work[(p, q)];
    let magnitude = apq.norm();
    if magnitude == 0.0 {
        return;
    }

    let phase = apq / magnitude;
    let app = work[(p, p)].re;
    let aqq = work[(q, q)].re;
    let theta = 0.5 * (2.0 * magnitude).atan2(aqq - app);
    let (sin, cos) = theta.sin_cos();

    let g_pp = Complex64::new(cos, 0.0);
    let g_pq = Complex64::new(sin, 0.0);
    let g_qp = -phase.conj() * sin;
    let g_qq = phase.conj() * cos;

    let dimension = work.nrows();
    for row in 0..dimension {
        let akp = work[(row, p)];
        let akq = work[(row, q)];
        work[(row, p)] = akp * g_pp + akq * g_qp;
        work[(row, q)] = akp * g_pq + akq * g_qq;

        let vkp = vectors[(row, p)];
        let vkq = vectors[(row, q)];
        vectors[(row, p)] = vkp * g_pp + vkq * g_qp;
        vectors[(row, q)] = vkp * g_pq + vkq * g_qq;
    }

    for col in 0..dimension {
        let apk = work[(p, col)];
        let aqk = work[(q, col)];
        work[(p, col)] = g_pp.conj() * apk + g_qp.conj() * aqk;
        work[(q, col)] = g_pq.conj() * apk + g_qq.conj() * aqk;
    }

    work[(p, q)] = Complex64::new(0.0, 0.0);
    work[(q, p)] = Complex64::new(0.0, 0.0);
    work[(p, p)] = Complex64::new(work[(p, p)].re, 0.0);
    work[(q, q)] = Complex64::new(work[(q, q)].re, 0.0);
}

pub fn multiply(
    lhs: &DenseComplexMatrix,
    rhs: &DenseComplexMatrix,
) -> Result<DenseComplexMatrix, LinalgError> {
    let nrows = lhs.nrows();
    let inner = lhs.ncols();
    let ncols = rhs.ncols();
    if rhs.nrows() != inner {
        return Err(LinalgError::ShapeMismatch {
            lhs_rows: nrows,
            lhs_cols: inner,
            rhs_rows: rhs.nrows(),
            rhs_cols: ncols,
        });
    }

    let mut output = DenseComplexMatrix::zeros(nrows, ncols);
    for row in 0..nrows {
        for col in 0..ncols {
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..inner {
                sum += lhs[(row, k)] * rhs[(k, col)];
            }
            output[(row, col)] = sum;
        }
    }
    Ok(output)
}

pub fn adjoint(matrix: &DenseComplexMatrix) -> DenseComplexMatrix {
    let mut output = DenseComplexMatrix::zeros(matrix.ncols(), matrix.nrows());
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            output[(col, row)] = matrix[(row, col)].conj();
        }
    }
    output
}

pub fn complex_identity(size: usize) -> DenseComplexMatrix {
    let mut identity = DenseComplexMatrix::zeros(size, size);
    for index in 0..size {
        identity[(index, index)] = Complex64::new(1.0, 0.0);
    }
    identity
}

pub fn real_diagonal_to_complex(matrix: &DenseRealMatrix) -> DenseComplexMatrix {
    let mut output = DenseComplexMatrix::zeros(matrix.nrows(), matrix.ncols());
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            output[(row, col)] = Complex64::new(matrix[(row, col)], 0.0);
        }
    }
    output
}

/// Largest entry of `|U U^H - I|`.
pub fn unitarity_deviation(matrix: &DenseComplexMatrix) -> f64 {
    let size = matrix.nrows();
    let mut worst: f64 = 0.0;
    for row in 0..size {
        for col in 0..size {
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..matrix.ncols() {
                sum += matrix[(row, k)] * matrix[(col, k)].conj();
            }
            if row == col {
                sum -= Complex64::new(1.0, 0.0);
            }
            worst = worst.max(sum.norm());
        }
    }
    worst
}

fn validate_hermitian(matrix: &DenseComplexMatrix) -> Result<usize, LinalgError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LinalgError::NonSquareMatrix { rows, cols });
    }

    let mut largest: f64 = 0.0;
    for row in 0..rows {
        for col in 0..cols {
            let value = matrix[(row, col)];
            if !value.re.is_finite() || !value.im.is_finite() {
                return Err(LinalgError::NonFiniteEntry { row, col });
            }
            largest = largest.max(value.norm());
        }
    }

    let tolerance = HERMITIAN_RELATIVE_TOLERANCE * largest;
    for row in 0..rows {
        for col in row..cols {
            let deviation = (matrix[(row, col)] - matrix[(col, row)].conj()).norm();
            if deviation > tolerance {
                return Err(LinalgError::NonHermitian {
                    row,
                    col,
                    deviation,
                });
            }
        }
    }

    Ok(rows)
}

fn frobenius_norm(matrix: &DenseComplexMatrix) -> f64 {
    let mut sum = 0.0;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            sum += matrix[(row, col)].norm_sqr();
        }
    }
    sum.sqrt()
}

fn off_diagonal_norm(matrix: &DenseComplexMatrix) -> f64 {
    let mut sum = 0.0;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            if row != col {
                sum += matrix[(row, col)].norm_sqr();
            }
        }
    }
    sum.sqrt()
}

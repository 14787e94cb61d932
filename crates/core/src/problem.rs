use crate::math::{dot, interval_violation, norm_inf, Scalar};
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
}

pub type ProblemResult<T> = Result<T, ProblemError>;

/// Compressed sparse column matrix in the layout expected by conic solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CscMatrix {
    pub nrows: usize,
    pub ncols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<Scalar>,
}

impl CscMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            indptr: vec![0; ncols + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Assembles a matrix from `(row, col, value)` entries; duplicates are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, Scalar)],
    ) -> ProblemResult<Self> {
        let mut tri = TriMat::with_capacity((nrows, ncols), triplets.len());
        for &(row, col, value) in triplets {
            if row >= nrows || col >= ncols {
                return Err(ProblemError::DimensionMismatch(format!(
                    "entry ({row}, {col}) outside {nrows}x{ncols} matrix"
                )));
            }
            tri.add_triplet(row, col, value);
        }
        let csc: CsMat<Scalar> = tri.to_csc();
        let (indptr, indices, data) = csc.into_raw_storage();
        Ok(Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        })
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.indptr.len() != self.ncols + 1 {
            return Err(ProblemError::DimensionMismatch(format!(
                "indptr length {} != ncols + 1 ({})",
                self.indptr.len(),
                self.ncols + 1
            )));
        }
        if self.indices.len() != self.data.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "indices length {} != data length {}",
                self.indices.len(),
                self.data.len()
            )));
        }
        if self.indptr[0] != 0 || self.indptr[self.ncols] != self.nnz() {
            return Err(ProblemError::InvalidStructure(
                "indptr must start at 0 and end at nnz".into(),
            ));
        }
        for col in 0..self.ncols {
            let (start, end) = (self.indptr[col], self.indptr[col + 1]);
            if start > end {
                return Err(ProblemError::InvalidStructure(format!(
                    "indptr decreases at column {col}"
                )));
            }
            let rows = &self.indices[start..end];
            if rows.iter().any(|&row| row >= self.nrows) {
                return Err(ProblemError::InvalidStructure(format!(
                    "row index out of range in column {col}"
                )));
            }
            if rows.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ProblemError::InvalidStructure(format!(
                    "row indices of column {col} are not strictly increasing"
                )));
            }
        }
        if self.data.iter().any(|value| !value.is_finite()) {
            return Err(ProblemError::InvalidStructure(
                "matrix contains non-finite entries".into(),
            ));
        }
        Ok(())
    }

    pub fn is_upper_triangular(&self) -> bool {
        (0..self.ncols).all(|col| {
            self.indices[self.indptr[col]..self.indptr[col + 1]]
                .iter()
                .all(|&row| row <= col)
        })
    }

    pub fn multiply(&self, x: &[Scalar]) -> Vec<Scalar> {
        assert_eq!(x.len(), self.ncols, "matrix-vector dimension mismatch");
        let mut out = vec![0.0; self.nrows];
        for (col, &xc) in x.iter().enumerate() {
            for idx in self.indptr[col]..self.indptr[col + 1] {
                out[self.indices[idx]] += self.data[idx] * xc;
            }
        }
        out
    }

    /// `0.5 * x' P x` where `self` stores only the upper triangle of `P`.
    fn half_quadratic_form(&self, x: &[Scalar]) -> Scalar {
        let mut acc = 0.0;
        for (col, &xc) in x.iter().enumerate() {
            for idx in self.indptr[col]..self.indptr[col + 1] {
                let row = self.indices[idx];
                let term = self.data[idx] * x[row] * xc;
                acc += if row == col { 0.5 * term } else { term };
            }
        }
        acc
    }

    /// Stacks `self` on top of `below`.
    pub fn vstack(&self, below: &CscMatrix) -> ProblemResult<Self> {
        if self.ncols != below.ncols {
            return Err(ProblemError::DimensionMismatch(format!(
                "cannot stack {} columns over {} columns",
                self.ncols, below.ncols
            )));
        }
        let mut indptr = Vec::with_capacity(self.ncols + 1);
        let mut indices = Vec::with_capacity(self.nnz() + below.nnz());
        let mut data = Vec::with_capacity(self.nnz() + below.nnz());
        indptr.push(0);
        for col in 0..self.ncols {
            let upper = self.indptr[col]..self.indptr[col + 1];
            indices.extend_from_slice(&self.indices[upper.clone()]);
            data.extend_from_slice(&self.data[upper]);
            let lower = below.indptr[col]..below.indptr[col + 1];
            indices.extend(below.indices[lower.clone()].iter().map(|row| row + self.nrows));
            data.extend_from_slice(&below.data[lower]);
            indptr.push(indices.len());
        }
        Ok(Self {
            nrows: self.nrows + below.nrows,
            ncols: self.ncols,
            indptr,
            indices,
            data,
        })
    }
}

/// Rows of `matrix * x` compared against `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraints {
    pub matrix: CscMatrix,
    pub rhs: Vec<Scalar>,
}

impl LinearConstraints {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    fn validate(&self, nvars: usize) -> ProblemResult<()> {
        self.matrix.validate()?;
        if self.matrix.ncols != nvars {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint matrix columns {} != nvars {}",
                self.matrix.ncols, nvars
            )));
        }
        if self.matrix.nrows != self.rhs.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint rows {} != rhs len {}",
                self.matrix.nrows,
                self.rhs.len()
            )));
        }
        if self.rhs.iter().any(|value| !value.is_finite()) {
            return Err(ProblemError::InvalidStructure(
                "constraint right-hand side contains non-finite entries".into(),
            ));
        }
        Ok(())
    }
}

/// `minimize 0.5 x'Px + q'x + constant`
/// subject to `equalities.matrix x = equalities.rhs`
/// and `inequalities.matrix x <= inequalities.rhs`.
///
/// `quadratic` holds the upper triangle of `P` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticProgram {
    pub quadratic: CscMatrix,
    pub linear: Vec<Scalar>,
    #[serde(default)]
    pub constant: Scalar,
    pub equalities: Option<LinearConstraints>,
    pub inequalities: Option<LinearConstraints>,
}

impl QuadraticProgram {
    pub fn nvars(&self) -> usize {
        self.linear.len()
    }

    pub fn n_equalities(&self) -> usize {
        self.equalities.as_ref().map_or(0, LinearConstraints::len)
    }

    pub fn n_inequalities(&self) -> usize {
        self.inequalities.as_ref().map_or(0, LinearConstraints::len)
    }

    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.nvars();
        self.quadratic.validate()?;
        if self.quadratic.ncols != n || self.quadratic.nrows != n {
            return Err(ProblemError::DimensionMismatch(format!(
                "quadratic matrix must be square and match variable dimension {n}"
            )));
        }
        if !self.quadratic.is_upper_triangular() {
            return Err(ProblemError::InvalidStructure(
                "quadratic matrix must only store its upper triangle".into(),
            ));
        }
        if self.linear.iter().any(|value| !value.is_finite()) || !self.constant.is_finite() {
            return Err(ProblemError::InvalidStructure(
                "objective contains non-finite entries".into(),
            ));
        }
        if let Some(eq) = &self.equalities {
            eq.validate(n)?;
        }
        if let Some(ineq) = &self.inequalities {
            ineq.validate(n)?;
        }
        Ok(())
    }

    pub fn objective(&self, x: &[Scalar]) -> Scalar {
        self.quadratic.half_quadratic_form(x) + dot(&self.linear, x) + self.constant
    }

    /// Largest equality residual or inequality excess at `x`.
    pub fn constraint_violation(&self, x: &[Scalar]) -> Scalar {
        let mut worst: Scalar = 0.0;
        if let Some(eq) = &self.equalities {
            let residual: Vec<Scalar> = eq
                .matrix
                .multiply(x)
                .iter()
                .zip(eq.rhs.iter())
                .map(|(lhs, rhs)| lhs - rhs)
                .collect();
            worst = worst.max(norm_inf(&residual));
        }
        if let Some(ineq) = &self.inequalities {
            for (lhs, rhs) in ineq.matrix.multiply(x).iter().zip(ineq.rhs.iter()) {
                worst = worst.max(interval_violation(*lhs, Scalar::NEG_INFINITY, *rhs));
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn diagonal(n: usize, value: Scalar) -> CscMatrix {
        let triplets: Vec<_> = (0..n).map(|i| (i, i, value)).collect();
        CscMatrix::from_triplets(n, n, &triplets).unwrap()
    }

    #[test]
    fn triplets_sum_duplicates_and_sort_rows() {
        let matrix =
            CscMatrix::from_triplets(3, 2, &[(2, 0, 1.0), (0, 0, 2.0), (2, 0, 0.5), (1, 1, -1.0)])
                .unwrap();
        assert!(matrix.validate().is_ok());
        assert_eq!(matrix.indptr, vec![0, 2, 3]);
        assert_eq!(matrix.indices, vec![0, 2, 1]);
        assert_eq!(matrix.data, vec![2.0, 1.5, -1.0]);
        assert_eq!(matrix.multiply(&[1.0, 2.0]), vec![2.0, -2.0, 1.5]);
    }

    #[test]
    fn triplets_out_of_range_are_rejected() {
        assert!(CscMatrix::from_triplets(2, 2, &[(2, 0, 1.0)]).is_err());
    }

    #[test]
    fn vstack_offsets_lower_rows() {
        let top = diagonal(2, 1.0);
        let bottom = CscMatrix::from_triplets(1, 2, &[(0, 1, 3.0)]).unwrap();
        let stacked = top.vstack(&bottom).unwrap();
        assert!(stacked.validate().is_ok());
        assert_eq!(stacked.nrows, 3);
        assert_eq!(stacked.multiply(&[1.0, 1.0]), vec![1.0, 1.0, 3.0]);
        assert!(top.vstack(&CscMatrix::zeros(1, 3)).is_err());
    }

    #[test]
    fn qp_validation_passes() {
        let n = 3;
        let qp = QuadraticProgram {
            quadratic: diagonal(n, 2.0),
            linear: vec![1.0; n],
            constant: 0.0,
            equalities: None,
            inequalities: Some(LinearConstraints {
                matrix: diagonal(n, 1.0),
                rhs: vec![1.0; n],
            }),
        };
        assert!(qp.validate().is_ok());
    }

    #[test]
    fn qp_rejects_lower_triangle_and_mismatch() {
        let lower = CscMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 0, 0.5), (1, 1, 1.0)])
            .unwrap();
        let qp = QuadraticProgram {
            quadratic: lower,
            linear: vec![0.0; 2],
            constant: 0.0,
            equalities: None,
            inequalities: None,
        };
        assert!(qp.validate().is_err());

        let qp = QuadraticProgram {
            quadratic: diagonal(2, 1.0),
            linear: vec![0.0; 2],
            constant: 0.0,
            equalities: Some(LinearConstraints {
                matrix: diagonal(2, 1.0),
                rhs: vec![1.0],
            }),
            inequalities: None,
        };
        assert!(qp.validate().is_err());
    }

    #[test]
    fn objective_and_violation() {
        // (x0 - 1)^2 + (x1 - 2)^2 = 0.5 * x'(2I)x - 2 x0 - 4 x1 + 5
        let qp = QuadraticProgram {
            quadratic: diagonal(2, 2.0),
            linear: vec![-2.0, -4.0],
            constant: 5.0,
            equalities: Some(LinearConstraints {
                matrix: CscMatrix::from_triplets(1, 2, &[(0, 0, 1.0), (0, 1, 1.0)]).unwrap(),
                rhs: vec![3.0],
            }),
            inequalities: Some(LinearConstraints {
                matrix: diagonal(2, 1.0),
                rhs: vec![0.5, 5.0],
            }),
        };
        assert_relative_eq!(qp.objective(&[1.0, 2.0]), 0.0, epsilon = 1e-12);
        assert_relative_eq!(qp.objective(&[0.0, 0.0]), 5.0, epsilon = 1e-12);
        assert_relative_eq!(qp.constraint_violation(&[1.0, 2.0]), 0.5, epsilon = 1e-12);
        assert_relative_eq!(qp.constraint_violation(&[0.5, 2.5]), 0.0, epsilon = 1e-12);
    }
}

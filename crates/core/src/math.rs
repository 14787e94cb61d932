pub type Scalar = f64;

pub fn dot(lhs: &[Scalar], rhs: &[Scalar]) -> Scalar {
    assert_eq!(lhs.len(), rhs.len(), "dot product dimension mismatch");
    lhs.iter().zip(rhs.iter()).map(|(a, b)| a * b).sum()
}

pub fn norm_inf(data: &[Scalar]) -> Scalar {
    data.iter()
        .copied()
        .map(Scalar::abs)
        .fold(0.0, Scalar::max)
}

/// Amount by which `value` lies outside `[lower, upper]`; zero when inside.
pub fn interval_violation(value: Scalar, lower: Scalar, upper: Scalar) -> Scalar {
    (lower - value).max(value - upper).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::{dot, interval_violation, norm_inf, Scalar};

    #[test]
    fn test_dot_norms() {
        let v = [3.0 as Scalar, -4.0];
        assert!((dot(&v, &v) - 25.0).abs() < 1e-12);
        assert!((norm_inf(&v) - 4.0).abs() < 1e-12);
        assert_eq!(norm_inf(&[]), 0.0);
    }

    #[test]
    fn test_interval_violation() {
        assert_eq!(interval_violation(18.0, 16.0, 24.0), 0.0);
        assert!((interval_violation(15.5, 16.0, 24.0) - 0.5).abs() < 1e-12);
        assert!((interval_violation(25.0, 16.0, 24.0) - 1.0).abs() < 1e-12);
    }
}

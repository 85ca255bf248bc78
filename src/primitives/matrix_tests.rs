pub(crate) use super::*;

fn spd_3x3() -> Matrix<f64> {
    Matrix::from_vec(3, 3, vec![4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0])
        .expect("test data has correct dimensions: 3*3=9 elements")
}

#[test]
fn test_from_vec() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
    assert!((m.get(1, 2) - 6.0).abs() < 1e-12);
}

#[test]
fn test_from_vec_error() {
    let result = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0]);
    assert!(result.is_err());
}

#[test]
fn test_transpose() {
    let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    let t = m.transpose();
    assert_eq!(t.shape(), (3, 2));
    assert!((t.get(0, 1) - 4.0).abs() < 1e-12);
    assert!((t.get(2, 1) - 6.0).abs() < 1e-12);
}

#[test]
fn test_matmul() {
    let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    let b = Matrix::from_vec(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let c = a.matmul(&b).expect("2x3 * 3x2 is compatible");
    assert_eq!(c.shape(), (2, 2));
    assert!((c.get(0, 0) - 58.0).abs() < 1e-12);
    assert!((c.get(0, 1) - 64.0).abs() < 1e-12);
    assert!((c.get(1, 0) - 139.0).abs() < 1e-12);
    assert!((c.get(1, 1) - 154.0).abs() < 1e-12);
}

#[test]
fn test_matmul_dimension_error() {
    let a = Matrix::<f64>::zeros(2, 3);
    assert!(a.matmul(&a).is_err());
}

#[test]
fn test_gram_matches_transpose_product() {
    let x = Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let expected = x.transpose().matmul(&x).expect("compatible");
    assert_eq!(x.gram(), expected);
}

#[test]
fn test_t_matvec() {
    let x = Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let v = Vector::from_slice(&[1.0, 1.0, 1.0]);
    let out = x.t_matvec(&v).expect("row count matches");
    assert_eq!(out.as_slice(), &[9.0, 12.0]);
}

#[test]
fn test_with_intercept_column() {
    let x = Matrix::from_vec(2, 1, vec![3.0, 4.0]).expect("2*1=2 elements");
    let d = x.with_intercept_column();
    assert_eq!(d.shape(), (2, 2));
    assert_eq!(d.as_slice(), &[1.0, 3.0, 1.0, 4.0]);
}

#[test]
fn test_cholesky_known_factor() {
    // Classic example: L = [[2,0,0],[6,1,0],[-8,5,3]]
    let l = spd_3x3().cholesky().expect("matrix is SPD");
    let expected = [2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0];
    for (got, want) in l.as_slice().iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-10, "got {got}, want {want}");
    }
}

#[test]
fn test_cholesky_not_positive_definite() {
    let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 1.0]).expect("2*2=4 elements");
    let err = m.cholesky().unwrap_err();
    assert!(matches!(err, BrainregError::SingularMatrix { .. }));
}

#[test]
fn test_cholesky_solve() {
    let a = spd_3x3();
    let x_true = Vector::from_slice(&[1.0, -2.0, 0.5]);
    let b = a.matvec(&x_true).expect("3x3 * 3");
    let x = a.cholesky_solve(&b).expect("SPD system");
    for i in 0..3 {
        assert!((x[i] - x_true[i]).abs() < 1e-9);
    }
}

#[test]
fn test_inverse_spd_round_trip() {
    let a = spd_3x3();
    let inv = a.inverse_spd().expect("SPD");
    let prod = a.matmul(&inv).expect("3x3 * 3x3");
    let eye = Matrix::eye(3);
    for (got, want) in prod.as_slice().iter().zip(eye.as_slice()) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn test_add_diagonal() {
    let m = Matrix::<f64>::zeros(2, 2).add_diagonal(3.0);
    assert_eq!(m.as_slice(), &[3.0, 0.0, 0.0, 3.0]);
}

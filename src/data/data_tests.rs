pub(crate) use super::*;

fn frame() -> DataFrame {
    DataFrame::new(vec![
        ("Age".to_string(), Vector::from_slice(&[70.0, 75.0, 80.0, 85.0])),
        ("MMSE".to_string(), Vector::from_slice(&[30.0, 28.0, 26.0, 20.0])),
    ])
    .expect("valid columns")
}

#[test]
fn test_new_rejects_ragged_columns() {
    let result = DataFrame::new(vec![
        ("a".to_string(), Vector::from_slice(&[1.0, 2.0])),
        ("b".to_string(), Vector::from_slice(&[1.0])),
    ]);
    assert!(matches!(
        result,
        Err(BrainregError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_new_rejects_duplicate_names() {
    let result = DataFrame::new(vec![
        ("a".to_string(), Vector::from_slice(&[1.0])),
        ("a".to_string(), Vector::from_slice(&[2.0])),
    ]);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Duplicate"));
}

#[test]
fn test_column_missing_lists_available() {
    let err = frame().column("eTIV").unwrap_err();
    match err {
        BrainregError::MissingColumn { column, available } => {
            assert_eq!(column, "eTIV");
            assert_eq!(available, "Age, MMSE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_select_and_to_matrix_order() {
    let df = frame();
    let m = df.to_matrix(&["MMSE", "Age"]).expect("columns exist");
    assert_eq!(m.shape(), (4, 2));
    assert_eq!(m.row_slice(0), &[30.0, 70.0]);
    let sel = df.select(&["MMSE"]).expect("column exists");
    assert_eq!(sel.column_names(), vec!["MMSE"]);
}

#[test]
fn test_add_column() {
    let mut df = frame();
    df.add_column("Gender".to_string(), Vector::from_slice(&[0.0, 1.0, 1.0, 0.0]))
        .expect("matching length");
    assert_eq!(df.n_cols(), 3);
    assert!(df
        .add_column("Gender".to_string(), Vector::zeros(4))
        .is_err());
    assert!(df.add_column("x".to_string(), Vector::zeros(3)).is_err());
}

#[test]
fn test_describe() {
    let stats = frame().describe();
    assert_eq!(stats.len(), 2);
    let age = &stats[0];
    assert_eq!(age.count, 4);
    assert!((age.mean - 77.5).abs() < 1e-12);
    assert!((age.median - 77.5).abs() < 1e-12);
    assert!((age.min - 70.0).abs() < 1e-12);
    assert!((age.max - 85.0).abs() < 1e-12);
}

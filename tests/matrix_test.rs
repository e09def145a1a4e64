// Unit tests for Matrix module

use rand::rngs::StdRng;
use rand::SeedableRng;
use scatter_matmul::error::MatrixError;
use scatter_matmul::matrix::{Matrix, MAX_RANDOM_VALUE};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_matrix_creation() {
    let m = Matrix::new(3, 4);
    assert_eq!(m.rows, 3);
    assert_eq!(m.cols, 4);
    assert_eq!(m.data, vec![0; 12]);
}

#[test]
fn test_matrix_from_vec() {
    let data = vec![1, 2, 3, 4, 5, 6];
    let m = Matrix::from_vec(data.clone(), 2, 3).unwrap();
    assert_eq!(m.rows, 2);
    assert_eq!(m.cols, 3);
    assert_eq!(m.data, data);
}

#[test]
fn test_from_vec_invalid_size() {
    let err = Matrix::from_vec(vec![1, 2, 3], 2, 2).unwrap_err();
    assert!(matches!(err, MatrixError::LengthMismatch { len: 3, rows: 2, cols: 2 }));
}

#[test]
fn test_random_values_in_range() {
    let mut rng = StdRng::seed_from_u64(3);
    let m = Matrix::random(20, 30, &mut rng);
    assert_eq!(m.data.len(), 600);
    assert!(m.data.iter().all(|v| (0..=MAX_RANDOM_VALUE).contains(v)));
    // 600 draws from ten values cannot all be equal in practice
    assert!(m.data.iter().any(|&v| v != m.data[0]));
}

#[test]
fn test_load_and_save() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "1 2 3").unwrap();
    writeln!(file, "4 5 6").unwrap();
    file.flush().unwrap();

    let m = Matrix::load_from_file(file.path()).unwrap();
    assert_eq!(m.rows, 2);
    assert_eq!(m.cols, 3);
    assert_eq!(m.get(0, 0).unwrap(), 1);
    assert_eq!(m.get(1, 2).unwrap(), 6);

    let output_file = NamedTempFile::new().unwrap();
    m.save_to_file(output_file.path()).unwrap();

    let m2 = Matrix::load_from_file(output_file.path()).unwrap();
    assert_eq!(m, m2);
}

#[test]
fn test_load_with_mixed_whitespace_and_blank_lines() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "1  2\t3\n\n4 5   6\n").unwrap();
    file.flush().unwrap();

    let m = Matrix::load_from_file(file.path()).unwrap();
    assert_eq!((m.rows, m.cols), (2, 3));
    assert_eq!(m.data, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_load_empty_file() {
    let file = NamedTempFile::new().unwrap();
    assert!(matches!(
        Matrix::load_from_file(file.path()),
        Err(MatrixError::Empty(_))
    ));
}

#[test]
fn test_load_inconsistent_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "1 2 3").unwrap();
    writeln!(file, "4 5").unwrap();
    file.flush().unwrap();

    assert!(matches!(
        Matrix::load_from_file(file.path()),
        Err(MatrixError::Ragged { expected: 3, found: 2, line: 2 })
    ));
}

#[test]
fn test_load_rejects_non_integers() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "1 2.5").unwrap();
    file.flush().unwrap();

    match Matrix::load_from_file(file.path()) {
        Err(MatrixError::Parse { line, value }) => {
            assert_eq!(line, 1);
            assert_eq!(value, "2.5");
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Matrix::load_from_file(dir.path().join("missing.txt")),
        Err(MatrixError::Io { .. })
    ));
}

#[test]
fn test_get_set() {
    let mut m = Matrix::new(3, 3);
    m.set(1, 2, 42).unwrap();
    assert_eq!(m.get(1, 2).unwrap(), 42);
    assert_eq!(m.get(0, 0).unwrap(), 0);
}

#[test]
fn test_get_set_out_of_bounds() {
    let mut m = Matrix::new(3, 3);
    assert!(m.get(3, 0).is_err());
    assert!(m.get(0, 3).is_err());
    assert!(m.set(3, 0, 1).is_err());
    assert!(m.set(0, 3, 1).is_err());
}

#[test]
fn test_get_row() {
    let m = Matrix::from_vec(vec![1, 2, 3, 4, 5, 6], 2, 3).unwrap();
    assert_eq!(m.get_row(0).unwrap(), &[1, 2, 3]);
    assert_eq!(m.get_row(1).unwrap(), &[4, 5, 6]);
    assert!(m.get_row(2).is_err());
}

#[test]
fn test_get_row_chunk() {
    let m = Matrix::from_vec((1..=12).collect(), 4, 3).unwrap();

    let chunk = m.get_row_chunk(1, 2).unwrap();
    assert_eq!(chunk.rows, 2);
    assert_eq!(chunk.cols, 3);
    assert_eq!(chunk.get(0, 0).unwrap(), 4); // row 1, col 0
    assert_eq!(chunk.get(1, 2).unwrap(), 9); // row 2, col 2

    assert_eq!(m.get_row_chunk(4, 0).unwrap().data, Vec::<i64>::new());
    assert!(m.get_row_chunk(3, 2).is_err());
}

#[test]
fn test_multiply() {
    let a = Matrix::from_vec(vec![1, 2, 3, 4], 2, 2).unwrap();
    let b = Matrix::from_vec(vec![5, 6, 7, 8], 2, 2).unwrap();
    let c = a.multiply(&b).unwrap();

    // [1 2]   [5 6]   [19 22]
    // [3 4] * [7 8] = [43 50]
    assert_eq!(c.data, vec![19, 22, 43, 50]);
}

#[test]
fn test_multiply_identity() {
    let size = 5;
    let mut identity = Matrix::new(size, size);
    for i in 0..size {
        identity.set(i, i, 1).unwrap();
    }
    let m = Matrix::from_vec((0..(size * size) as i64).collect(), size, size).unwrap();
    assert_eq!(m.multiply(&identity).unwrap(), m);
}

#[test]
fn test_multiply_incompatible_dimensions() {
    let a = Matrix::from_vec(vec![1, 2, 3, 4], 2, 2).unwrap();
    let b = Matrix::from_vec(vec![1, 2, 3], 3, 1).unwrap();
    assert!(matches!(
        a.multiply(&b),
        Err(MatrixError::Incompatible { a_cols: 2, b_rows: 3, .. })
    ));
}

#[test]
fn test_large_matrix_operations() {
    let size = 100;
    let a = Matrix::from_vec((0..(size * size) as i64).collect(), size, size).unwrap();
    let b = Matrix::from_vec(vec![1; size * size], size, size).unwrap();

    let result = a.multiply(&b).unwrap();
    assert_eq!(result.rows, size);
    assert_eq!(result.cols, size);
    // First row should be sum of first row of a
    let first_row_sum: i64 = (0..size as i64).sum();
    assert_eq!(result.get(0, 0).unwrap(), first_row_sum);
    assert_eq!(result.get(0, size - 1).unwrap(), first_row_sum);
}

//! Local multiply kernel: a block of rows of A times the full B.

use crate::error::{MatmulError, Result};
use crate::matrix::Element;

/// Multiply a row block of A (`local_a.len() / inner` rows of width `inner`)
/// by the `inner x cols` matrix `b`, returning the matching row block of C.
///
/// Accumulates in `Element` (i64); inputs in [0, 9] stay far from overflow.
pub fn multiply_block(
    local_a: &[Element],
    b: &[Element],
    inner: usize,
    cols: usize,
) -> Result<Vec<Element>> {
    if b.len() != inner * cols {
        return Err(MatmulError::DimensionMismatch {
            what: "matrix B",
            expected: inner * cols,
            got: b.len(),
        });
    }
    if inner == 0 {
        return Err(MatmulError::Config("inner dimension must be at least 1".into()));
    }
    if local_a.len() % inner != 0 {
        return Err(MatmulError::DimensionMismatch {
            what: "row block of A",
            expected: (local_a.len() / inner) * inner,
            got: local_a.len(),
        });
    }

    let local_rows = local_a.len() / inner;
    let mut local_c = vec![0; local_rows * cols];
    for i in 0..local_rows {
        let row = &local_a[i * inner..(i + 1) * inner];
        for j in 0..cols {
            let mut sum: Element = 0;
            for (k, &a_ik) in row.iter().enumerate() {
                sum += a_ik * b[k * cols + j];
            }
            local_c[i * cols + j] = sum;
        }
    }

    Ok(local_c)
}

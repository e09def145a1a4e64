#![allow(dead_code)]

use std::time::Duration;

use scatter_matmul::transport::{Collective, LocalUniverse};
use scatter_matmul::{Coordinator, MatmulError, Matrix, Worker};

/// Generous upper bound so a protocol bug fails the test instead of hanging it.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn universe(workers: usize) -> LocalUniverse {
    LocalUniverse::new(workers).with_timeout(TEST_TIMEOUT)
}

/// 4x3 matrix holding 1..=12
pub fn fixture_a() -> Matrix {
    Matrix::from_vec((1..=12).collect(), 4, 3).unwrap()
}

/// 3x2 matrix holding 1..=6
pub fn fixture_b() -> Matrix {
    Matrix::from_vec((1..=6).collect(), 3, 2).unwrap()
}

/// fixture_a * fixture_b, worked out by hand
pub fn fixture_c() -> Matrix {
    Matrix::from_vec(vec![22, 28, 49, 64, 76, 100, 103, 136], 4, 2).unwrap()
}

/// Multiply `a * b` over `workers` in-process ranks and return C from rank 0.
pub fn distributed_product(a: &Matrix, b: &Matrix, workers: usize) -> Matrix {
    let results = universe(workers)
        .run(|world| -> Result<Option<Matrix>, MatmulError> {
            if world.is_root() {
                let product = Coordinator::new(&world)?.multiply_matrices(a, b)?;
                Ok(Some(product.c))
            } else {
                Worker::new(&world).process_work()?;
                Ok(None)
            }
        })
        .unwrap();

    let mut results = results.into_iter();
    let c = results
        .next()
        .unwrap()
        .unwrap()
        .expect("rank 0 returns the product");
    for (rank, result) in results.enumerate() {
        assert!(result.unwrap().is_none(), "worker {} returned a product", rank + 1);
    }
    c
}

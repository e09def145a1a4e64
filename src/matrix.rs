use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rand::Rng;

use crate::error::MatrixError;
use crate::kernel::multiply_block;

/// Scalar type carried by every matrix and every transport buffer.
pub type Element = i64;

/// Upper bound (inclusive) of randomly initialised entries.
pub const MAX_RANDOM_VALUE: Element = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub data: Vec<Element>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    /// Create a zero-filled matrix with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from row-major data
    pub fn from_vec(data: Vec<Element>, rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if data.len() != rows * cols {
            return Err(MatrixError::LengthMismatch {
                len: data.len(),
                rows,
                cols,
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Fill a matrix with uniform values in `[0, MAX_RANDOM_VALUE]`
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let data = (0..rows * cols)
            .map(|_| rng.gen_range(0..=MAX_RANDOM_VALUE))
            .collect();
        Matrix { data, rows, cols }
    }

    /// Load a matrix from a text file
    /// Format: whitespace-separated integers, one row per line
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MatrixError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut data = Vec::new();
        let mut rows = 0;
        let mut num_cols = None;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| MatrixError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let values = trimmed
                .split_whitespace()
                .map(|s| {
                    s.parse::<Element>().map_err(|_| MatrixError::Parse {
                        line: line_num + 1,
                        value: s.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            match num_cols {
                Some(n) if n != values.len() => {
                    return Err(MatrixError::Ragged {
                        expected: n,
                        found: values.len(),
                        line: line_num + 1,
                    });
                }
                None => num_cols = Some(values.len()),
                _ => {}
            }

            data.extend(values);
            rows += 1;
        }

        let cols = num_cols.ok_or_else(|| MatrixError::Empty(path.to_path_buf()))?;
        Ok(Matrix { data, rows, cols })
    }

    /// Save a matrix to a text file in the format `load_from_file` reads
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MatrixError> {
        let path = path.as_ref();
        let io_err = |source| MatrixError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        for row in self.data.chunks(self.cols.max(1)) {
            let line = row
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{}", line).map_err(io_err)?;
        }

        writer.flush().map_err(io_err)
    }

    /// Get a value at a specific position
    pub fn get(&self, row: usize, col: usize) -> Result<Element, MatrixError> {
        self.check_bounds(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Set a value at a specific position
    pub fn set(&mut self, row: usize, col: usize, value: Element) -> Result<(), MatrixError> {
        self.check_bounds(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Get a row as a slice
    pub fn get_row(&self, row: usize) -> Result<&[Element], MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::OutOfBounds {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Get a contiguous block of rows
    pub fn get_row_chunk(&self, start_row: usize, num_rows: usize) -> Result<Matrix, MatrixError> {
        if start_row + num_rows > self.rows {
            return Err(MatrixError::ChunkOutOfBounds {
                start: start_row,
                len: num_rows,
                rows: self.rows,
            });
        }
        let start = start_row * self.cols;
        let end = (start_row + num_rows) * self.cols;
        Ok(Matrix {
            data: self.data[start..end].to_vec(),
            rows: num_rows,
            cols: self.cols,
        })
    }

    /// Sequential reference product (A * B) on a single rank
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(self.incompatible(other));
        }
        let data = multiply_block(&self.data, &other.data, self.cols, other.cols)
            .map_err(|_| self.incompatible(other))?;
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: other.cols,
        })
    }

    fn incompatible(&self, other: &Matrix) -> MatrixError {
        MatrixError::Incompatible {
            a_rows: self.rows,
            a_cols: self.cols,
            b_rows: other.rows,
            b_cols: other.cols,
        }
    }
}

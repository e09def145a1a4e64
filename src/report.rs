//! Text report written by the coordinator once the product is assembled.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{MatmulError, Result};
use crate::matrix::Matrix;

pub struct ReportSink<W: Write> {
    writer: W,
}

impl ReportSink<BufWriter<File>> {
    /// Open (truncate) the report file. Failing here is fatal for the whole run.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| MatmulError::SinkUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ReportSink::new(BufWriter::new(file)))
    }
}

impl<W: Write> ReportSink<W> {
    pub fn new(writer: W) -> Self {
        ReportSink { writer }
    }

    pub fn write_report(&mut self, a: &Matrix, b: &Matrix, c: &Matrix, seconds: f64) -> Result<()> {
        self.write_sections(a, b, c, seconds).map_err(MatmulError::Report)
    }

    fn write_sections(&mut self, a: &Matrix, b: &Matrix, c: &Matrix, seconds: f64) -> std::io::Result<()> {
        writeln!(self.writer, "Matrix A ({} x {}):", a.rows, a.cols)?;
        write_matrix(&mut self.writer, a)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "Matrix B ({} x {}):", b.rows, b.cols)?;
        write_matrix(&mut self.writer, b)?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Resultant Matrix C took {:.6} seconds to be computed:",
            seconds
        )?;
        write_matrix(&mut self.writer, c)?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// One line per row, each value right-aligned in five columns.
pub fn write_matrix<W: Write>(writer: &mut W, matrix: &Matrix) -> std::io::Result<()> {
    for row in matrix.data.chunks(matrix.cols.max(1)) {
        for value in row {
            write!(writer, "{:5} ", value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

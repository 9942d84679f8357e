//! Binary interchange format for compressed-column matrices.
//!
//! All numbers are little-endian. The file starts with the header
//!
//! ```text
//! u64 classid   u64 value kind   u64 nrows   u64 ncols   u64 nnz
//! ```
//!
//! followed by `u64 col_ptr[ncols + 1]`, `u64 row_idx[nnz]` and the values.
//! Real values are `f64 values[nnz]`. Complex values are either interleaved
//! `(re, im)` pairs or the array of real parts followed by the array of
//! imaginary parts, as given by the value kind.

use crate::{
  csc::CscMatrix,
  error::{Error, Result},
};

use common::{Complex64, Scalar};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
  fs::File,
  io::{BufReader, BufWriter, Read, Write},
  path::Path,
};

const CSC_FILE_CLASSID: u64 = 0x4353_435f_4d41_5431;

const KIND_REAL: u64 = 0;
const KIND_INTERLEAVED: u64 = 1;
const KIND_SPLIT: u64 = 2;

/// Storage of complex values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComplexLayout {
  /// `[re0, im0, re1, im1, ...]`
  #[default]
  Interleaved,
  /// `[re0, re1, ...]` followed by `[im0, im1, ...]`
  Split,
}

/// Scalars that can be stored in the interchange format.
pub trait BinaryValues: Scalar {
  fn kind(layout: ComplexLayout) -> u64;
  fn write_values<W: Write>(writer: &mut W, values: &[Self], layout: ComplexLayout) -> Result<()>;
  fn read_values<R: Read>(reader: &mut R, kind: u64, nnz: usize) -> Result<Vec<Self>>;
}

impl BinaryValues for f64 {
  fn kind(_: ComplexLayout) -> u64 {
    KIND_REAL
  }

  fn write_values<W: Write>(writer: &mut W, values: &[Self], _: ComplexLayout) -> Result<()> {
    for &v in values {
      writer.write_f64::<LittleEndian>(v)?;
    }
    Ok(())
  }

  fn read_values<R: Read>(reader: &mut R, kind: u64, nnz: usize) -> Result<Vec<Self>> {
    if kind != KIND_REAL {
      return Err(invalid_data(format!(
        "expected real values, file holds value kind {kind}"
      )));
    }
    read_f64s(reader, nnz)
  }
}

impl BinaryValues for Complex64 {
  fn kind(layout: ComplexLayout) -> u64 {
    match layout {
      ComplexLayout::Interleaved => KIND_INTERLEAVED,
      ComplexLayout::Split => KIND_SPLIT,
    }
  }

  fn write_values<W: Write>(writer: &mut W, values: &[Self], layout: ComplexLayout) -> Result<()> {
    match layout {
      ComplexLayout::Interleaved => {
        for z in values {
          writer.write_f64::<LittleEndian>(z.re)?;
          writer.write_f64::<LittleEndian>(z.im)?;
        }
      }
      ComplexLayout::Split => {
        for z in values {
          writer.write_f64::<LittleEndian>(z.re)?;
        }
        for z in values {
          writer.write_f64::<LittleEndian>(z.im)?;
        }
      }
    }
    Ok(())
  }

  fn read_values<R: Read>(reader: &mut R, kind: u64, nnz: usize) -> Result<Vec<Self>> {
    match kind {
      KIND_INTERLEAVED => {
        let len = nnz
          .checked_mul(2)
          .ok_or_else(|| invalid_data(format!("nnz = {nnz} is too large for complex values")))?;
        let raw = read_f64s(reader, len)?;
        Ok(raw.chunks_exact(2).map(|z| Complex64::new(z[0], z[1])).collect())
      }
      KIND_SPLIT => {
        let re = read_f64s(reader, nnz)?;
        let im = read_f64s(reader, nnz)?;
        Ok(re.into_iter().zip(im).map(|(re, im)| Complex64::new(re, im)).collect())
      }
      kind => Err(invalid_data(format!(
        "expected complex values, file holds value kind {kind}"
      ))),
    }
  }
}

fn invalid_data(msg: String) -> Error {
  Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize> {
  let v = reader.read_u64::<LittleEndian>()?;
  usize::try_from(v).map_err(|_| invalid_data(format!("length {v} does not fit into usize")))
}

fn read_lens<R: Read>(reader: &mut R, n: usize) -> Result<Vec<usize>> {
  (0..n).map(|_| read_len(reader)).collect()
}

fn read_f64s<R: Read>(reader: &mut R, n: usize) -> Result<Vec<f64>> {
  (0..n)
    .map(|_| Ok(reader.read_f64::<LittleEndian>()?))
    .collect()
}

/// Writes `a` to `writer`. The layout only matters for complex matrices.
pub fn write_csc<T: BinaryValues, W: Write>(
  writer: &mut W,
  a: &CscMatrix<T>,
  layout: ComplexLayout,
) -> Result<()> {
  writer.write_u64::<LittleEndian>(CSC_FILE_CLASSID)?;
  writer.write_u64::<LittleEndian>(T::kind(layout))?;
  writer.write_u64::<LittleEndian>(a.nrows() as u64)?;
  writer.write_u64::<LittleEndian>(a.ncols() as u64)?;
  writer.write_u64::<LittleEndian>(a.nnz() as u64)?;
  for &p in a.col_ptr() {
    writer.write_u64::<LittleEndian>(p as u64)?;
  }
  for &r in a.row_idx() {
    writer.write_u64::<LittleEndian>(r as u64)?;
  }
  T::write_values(writer, a.values(), layout)?;
  Ok(())
}

/// Reads a matrix written by [`write_csc`], validating its structure.
///
/// Arrays are read element by element, so a header announcing more data
/// than the stream holds fails with [`Error::Io`] instead of allocating upfront.
pub fn read_csc<T: BinaryValues, R: Read>(reader: &mut R) -> Result<CscMatrix<T>> {
  let classid = reader.read_u64::<LittleEndian>()?;
  if classid != CSC_FILE_CLASSID {
    return Err(invalid_data(format!(
      "not a matrix file (classid {classid:#x})"
    )));
  }
  let kind = reader.read_u64::<LittleEndian>()?;
  let nrows = read_len(reader)?;
  let ncols = read_len(reader)?;
  let nnz = read_len(reader)?;
  let ncol_ptr = ncols
    .checked_add(1)
    .ok_or_else(|| invalid_data(format!("ncols = {ncols} is too large")))?;
  if nrows.checked_mul(ncols).is_some_and(|size| nnz > size) {
    return Err(invalid_data(format!(
      "nnz = {nnz} exceeds the size of a {nrows}x{ncols} matrix"
    )));
  }
  let col_ptr = read_lens(reader, ncol_ptr)?;
  let row_idx = read_lens(reader, nnz)?;
  let values = T::read_values(reader, kind, nnz)?;
  CscMatrix::from_parts(nrows, ncols, col_ptr, row_idx, values)
}

pub fn save_csc<T: BinaryValues>(
  path: impl AsRef<Path>,
  a: &CscMatrix<T>,
  layout: ComplexLayout,
) -> Result<()> {
  let file = File::create(path)?;
  let mut writer = BufWriter::new(file);
  write_csc(&mut writer, a, layout)?;
  writer.flush()?;
  Ok(())
}

pub fn load_csc<T: BinaryValues>(path: impl AsRef<Path>) -> Result<CscMatrix<T>> {
  let file = File::open(path)?;
  let mut reader = BufReader::new(file);
  read_csc(&mut reader)
}

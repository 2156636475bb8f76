//! Typed, length-tagged task buffers.
//!
//! A task hands the solver four input regions and one output region in a
//! fixed order:
//!
//! | index | content                  | element count |
//! |-------|--------------------------|---------------|
//! | 0     | dimension `n` (integer)  | 1             |
//! | 1     | tolerance `eps`          | 1             |
//! | 2     | matrix `A`, row-major    | `n * n`       |
//! | 3     | right-hand side `b`      | `n`           |
//!
//! The single output region holds the solution `x` (`n` elements).
//!
//! Each [`BufferRegion`] carries a *declared* length next to its data. The
//! two normally agree, but a caller may declare a different count and the
//! validator is expected to notice.

/// Input region index of the dimension `n`.
pub const DIMENSION: usize = 0;
/// Input region index of the tolerance `eps`.
pub const TOLERANCE: usize = 1;
/// Input region index of the row-major matrix.
pub const MATRIX: usize = 2;
/// Input region index of the right-hand side.
pub const RHS: usize = 3;
/// Output region index of the solution vector.
pub const SOLUTION: usize = 0;

/// Number of input regions a task must carry.
pub const INPUT_REGIONS: usize = 4;
/// Number of output regions a task must carry.
pub const OUTPUT_REGIONS: usize = 1;

/// Element storage of a region.
#[derive(Debug, Clone, PartialEq)]
enum RegionData {
    /// Signed integers.
    Int(Vec<i64>),
    /// Double-precision floats.
    Float(Vec<f64>),
}

impl RegionData {
    fn len(&self) -> usize {
        match self {
            RegionData::Int(v) => v.len(),
            RegionData::Float(v) => v.len(),
        }
    }
}

/// One typed region plus its declared element count.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRegion {
    declared_len: usize,
    data: RegionData,
}

impl BufferRegion {
    /// Integer region whose declared length equals its data length.
    pub fn int(values: Vec<i64>) -> Self {
        Self {
            declared_len: values.len(),
            data: RegionData::Int(values),
        }
    }

    /// Float region whose declared length equals its data length.
    pub fn float(values: Vec<f64>) -> Self {
        Self {
            declared_len: values.len(),
            data: RegionData::Float(values),
        }
    }

    /// Zero-filled float region, typically an output.
    pub fn zeros(len: usize) -> Self {
        Self::float(vec![0.0; len])
    }

    /// Override the declared element count.
    pub fn with_declared_len(mut self, declared_len: usize) -> Self {
        self.declared_len = declared_len;
        self
    }

    /// Element count the caller declared.
    #[inline]
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }

    /// Element count actually backing the region.
    #[inline]
    pub fn actual_len(&self) -> usize {
        self.data.len()
    }

    /// Integer view, or `None` for a float region.
    pub fn as_int(&self) -> Option<&[i64]> {
        match &self.data {
            RegionData::Int(v) => Some(v),
            RegionData::Float(_) => None,
        }
    }

    /// Float view, or `None` for an integer region.
    pub fn as_float(&self) -> Option<&[f64]> {
        match &self.data {
            RegionData::Float(v) => Some(v),
            RegionData::Int(_) => None,
        }
    }

    /// Mutable float view, or `None` for an integer region.
    pub fn as_float_mut(&mut self) -> Option<&mut [f64]> {
        match &mut self.data {
            RegionData::Float(v) => Some(v),
            RegionData::Int(_) => None,
        }
    }
}

/// The full set of regions exchanged with a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBuffers {
    /// Input regions, in the order documented at module level.
    pub inputs: Vec<BufferRegion>,
    /// Output regions.
    pub outputs: Vec<BufferRegion>,
}

impl TaskBuffers {
    /// Empty task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Well-formed task for an `n`-dimensional system with a zeroed output.
    pub fn for_system(n: usize, tolerance: f64, matrix: Vec<f64>, rhs: Vec<f64>) -> Self {
        Self {
            inputs: vec![
                BufferRegion::int(vec![n as i64]),
                BufferRegion::float(vec![tolerance]),
                BufferRegion::float(matrix),
                BufferRegion::float(rhs),
            ],
            outputs: vec![BufferRegion::zeros(n)],
        }
    }

    /// Append an input region.
    pub fn push_input(&mut self, region: BufferRegion) -> &mut Self {
        self.inputs.push(region);
        self
    }

    /// Append an output region.
    pub fn push_output(&mut self, region: BufferRegion) -> &mut Self {
        self.outputs.push(region);
        self
    }

    /// Contents of the solution region, if present.
    pub fn solution(&self) -> Option<&[f64]> {
        self.outputs.get(SOLUTION).and_then(BufferRegion::as_float)
    }
}

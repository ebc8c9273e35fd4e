use super::TargetError;

/// Float components per texel (RGBA).
pub const CHANNELS: usize = 4;

/// Host-side array laid out as `width * height` RGBA texels.
///
/// This is the pre-image and post-image of a fragment kernel pass. Its length
/// is always `width * height * CHANNELS`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ComputeBuffer {
    /// Number of `f32` elements in a `width x height` buffer.
    #[inline]
    pub fn element_count(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    pub fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; Self::element_count(width, height)],
        }
    }

    /// Wraps `data`, which must hold exactly `width * height * 4` floats.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Result<Self, TargetError> {
        let expected = Self::element_count(width, height);
        if data.len() != expected {
            return Err(TargetError::PayloadLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Wraps data whose length the caller derived from the same extent.
    pub(crate) fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), Self::element_count(width, height));
        Self { width, height, data }
    }

    /// Fills element `i` with `f(i)`.
    pub fn from_fn(width: u32, height: u32, f: impl FnMut(usize) -> f32) -> Self {
        let data = (0..Self::element_count(width, height)).map(f).collect();
        Self { width, height, data }
    }

    /// `data[i] = i + 1`, the demo input.
    pub fn sequential(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |i| i as f32 + 1.0)
    }

    /// Applies `f` element-wise into a new buffer of the same shape.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// RGBA components of texel `(x, y)`, row-major from the top-left.
    pub fn texel(&self, x: u32, y: u32) -> Option<[f32; CHANNELS]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut out = [0.0; CHANNELS];
        out.copy_from_slice(&self.data[i..i + CHANNELS]);
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_starts_at_one() {
        let b = ComputeBuffer::sequential(4, 4);
        assert_eq!(b.len(), 64);
        assert_eq!(b.as_slice()[0], 1.0);
        assert_eq!(b.as_slice()[63], 64.0);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = ComputeBuffer::from_vec(2, 2, vec![0.0; 15]).unwrap_err();
        assert!(matches!(
            err,
            TargetError::PayloadLength {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn map_preserves_length() {
        let b = ComputeBuffer::sequential(3, 5);
        let m = b.map(f32::sqrt);
        assert_eq!(m.len(), b.len());
        assert_eq!(m.width(), 3);
        assert_eq!(m.height(), 5);
        assert_eq!(m.as_slice()[3], 2.0);
    }

    #[test]
    fn texel_addresses_rows() {
        let b = ComputeBuffer::sequential(2, 2);
        assert_eq!(b.texel(0, 0), Some([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(b.texel(1, 1), Some([13.0, 14.0, 15.0, 16.0]));
        assert_eq!(b.texel(2, 0), None);
    }
}

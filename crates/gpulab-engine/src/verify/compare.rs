/// Accepted difference between a GPU result and its CPU reference.
///
/// An element matches when `|gpu - cpu| <= epsilon * max(1, |cpu|)`: an
/// absolute bound below 1 and a relative one above, which covers rounding
/// differences between GPU and CPU `sqrt` over the whole float range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerance {
    pub epsilon: f32,
}

impl Tolerance {
    /// Bit-for-bit equality (vector add).
    pub const EXACT: Tolerance = Tolerance { epsilon: 0.0 };

    pub const fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    #[inline]
    pub fn accepts(self, gpu: f32, cpu: f32) -> bool {
        if gpu == cpu {
            return true;
        }
        // NaN never matches, including NaN vs NaN.
        (gpu - cpu).abs() <= self.epsilon * cpu.abs().max(1.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(1e-5)
    }
}

/// Element-wise agreement between two equally long arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub len: usize,
    pub mismatches: usize,
    pub first_mismatch: Option<usize>,
    /// Largest `|gpu - cpu|` over non-NaN pairs.
    pub max_abs_error: f32,
}

impl Comparison {
    pub fn matches(&self) -> usize {
        self.len - self.mismatches
    }

    pub fn is_exact_match(&self) -> bool {
        self.mismatches == 0
    }
}

/// Compares `gpu` against `cpu`.
///
/// Arrays of different length are a programming error; the extra tail of the
/// longer one is counted as mismatches.
pub fn compare(gpu: &[f32], cpu: &[f32], tolerance: Tolerance) -> Comparison {
    let len = gpu.len().max(cpu.len());
    let mut mismatches = len - gpu.len().min(cpu.len());
    let mut first_mismatch = (mismatches > 0).then(|| gpu.len().min(cpu.len()));
    let mut max_abs_error = 0.0f32;

    for (i, (&g, &c)) in gpu.iter().zip(cpu).enumerate() {
        let err = (g - c).abs();
        if !err.is_nan() {
            max_abs_error = max_abs_error.max(err);
        }
        if !tolerance.accepts(g, c) {
            mismatches += 1;
            if first_mismatch.is_none_or(|f| i < f) {
                first_mismatch = Some(i);
            }
        }
    }

    Comparison {
        len,
        mismatches,
        first_mismatch,
        max_abs_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_arrays_match() {
        let a = [1.0, 2.0, 3.0];
        let c = compare(&a, &a, Tolerance::EXACT);
        assert!(c.is_exact_match());
        assert_eq!(c.matches(), 3);
        assert_eq!(c.first_mismatch, None);
    }

    #[test]
    fn rounding_noise_is_tolerated() {
        let cpu = [512.0f32, 0.5];
        let gpu = [512.0 + 512.0 * 1e-6, 0.5 + 1e-6];
        assert!(compare(&gpu, &cpu, Tolerance::default()).is_exact_match());
    }

    #[test]
    fn real_difference_is_counted() {
        let cpu = [1.0, 2.0, 3.0, 4.0];
        let gpu = [1.0, 2.5, 3.0, 0.0];
        let c = compare(&gpu, &cpu, Tolerance::default());
        assert_eq!(c.mismatches, 2);
        assert_eq!(c.first_mismatch, Some(1));
        assert_eq!(c.max_abs_error, 4.0);
    }

    #[test]
    fn nan_is_a_mismatch() {
        let c = compare(&[f32::NAN], &[f32::NAN], Tolerance::default());
        assert_eq!(c.mismatches, 1);
        assert_eq!(c.max_abs_error, 0.0);
    }

    #[test]
    fn length_difference_counts_as_mismatch() {
        let c = compare(&[1.0, 2.0], &[1.0, 2.0, 3.0], Tolerance::EXACT);
        assert_eq!(c.len, 3);
        assert_eq!(c.mismatches, 1);
        assert_eq!(c.first_mismatch, Some(2));
    }
}

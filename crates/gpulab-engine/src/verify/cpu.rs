/// `out[i] = sqrt(input[i])`. Negative inputs give NaN, as on the GPU.
pub fn cpu_sqrt(input: &[f32], out: &mut [f32]) {
    assert_eq!(input.len(), out.len(), "sqrt is one output per input");
    for (o, &x) in out.iter_mut().zip(input) {
        *o = x.sqrt();
    }
}

/// `res[i] = a[i] + b[i]`.
pub fn cpu_vector_add(a: &[f32], b: &[f32], res: &mut [f32]) {
    assert!(a.len() == b.len() && a.len() == res.len(), "length mismatch");
    for ((r, &x), &y) in res.iter_mut().zip(a).zip(b) {
        *r = x + y;
    }
}

/// Runs `f` `loop_count` times, the CPU half of the timing comparison.
pub fn repeat_cpu(loop_count: u32, mut f: impl FnMut()) {
    for _ in 0..loop_count {
        f();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_of_squares() {
        let mut out = [0.0; 4];
        cpu_sqrt(&[1.0, 4.0, 9.0, 16.0], &mut out);
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn sqrt_of_zero_is_zero() {
        let mut out = [1.0];
        cpu_sqrt(&[0.0], &mut out);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn sqrt_of_negative_is_nan() {
        let mut out = [0.0];
        cpu_sqrt(&[-4.0], &mut out);
        assert!(out[0].is_nan());
    }

    #[test]
    fn vector_add_doubles() {
        let a: Vec<f32> = (0..8).map(|i| 2.0 * i as f32).collect();
        let mut res = vec![0.0; 8];
        cpu_vector_add(&a, &a, &mut res);
        assert_eq!(res[7], 28.0);
    }

    #[test]
    fn repeat_runs_n_times() {
        let mut n = 0;
        repeat_cpu(7, || n += 1);
        assert_eq!(n, 7);
    }
}

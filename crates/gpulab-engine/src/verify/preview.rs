/// How many leading elements the demos print: all of them for small
/// textures (side < 32), otherwise `default_len`.
pub fn preview_len(tex_size: u32, total: usize, default_len: usize) -> usize {
    if tex_size < 32 {
        total
    } else {
        default_len.min(total)
    }
}

/// One `%f`-style line per element.
pub fn preview(data: &[f32], len: usize) -> String {
    let mut out = String::new();
    for v in data.iter().take(len) {
        out.push_str(&format!("{v:.6}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_textures_print_everything() {
        assert_eq!(preview_len(4, 64, 16), 64);
        assert_eq!(preview_len(256, 262_144, 16), 16);
    }

    #[test]
    fn preview_formats_six_decimals() {
        assert_eq!(preview(&[1.0, 2.5, 9.0], 2), "1.000000\n2.500000\n");
    }
}

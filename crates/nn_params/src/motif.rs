use crate::ParamError;

/// Column-major index of a rank-`axes.len()` motif class, 4 base values per
/// axis: `axes[0]` is fastest-varying.
pub fn motif_index(axes: &[usize]) -> usize {
    let mut idx = 0;
    let mut stride = 1;
    for &a in axes {
        idx += a * stride;
        stride *= 4;
    }
    idx
}

pub fn motif_len(rank: usize) -> usize {
    4usize.pow(rank as u32)
}

fn base_value(ch: char) -> Option<usize> {
    match ch.to_ascii_uppercase() {
        'A' => Some(0),
        'C' => Some(1),
        'G' => Some(2),
        'U' => Some(3),
        _ => None,
    }
}

/// Parse a sparse-map key ("ACGU"-style) into column-major axis indices.
pub fn parse_key(field: &'static str, rank: usize, key: &str) -> Result<usize, ParamError> {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() != rank {
        return Err(ParamError::WrongArity { field, rank, key: key.to_string() });
    }
    let mut axes = Vec::with_capacity(rank);
    for &ch in &chars {
        let v = base_value(ch).ok_or(ParamError::UnknownBase { field, key: key.to_string(), ch })?;
        axes.push(v);
    }
    Ok(motif_index(&axes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motif_len() {
        assert_eq!(motif_len(4), 256);
        assert_eq!(motif_len(6), 4096);
        assert_eq!(motif_len(8), 65536);
    }

    #[test]
    fn test_motif_index_column_major() {
        assert_eq!(motif_index(&[0, 0]), 0);
        assert_eq!(motif_index(&[1, 0]), 1);
        assert_eq!(motif_index(&[0, 1]), 4);
        assert_eq!(motif_index(&[3, 3]), 15);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("stack", 2, "CA").unwrap(), motif_index(&[1, 0]));
        assert!(parse_key("stack", 2, "CAG").is_err());
        assert!(parse_key("stack", 2, "CX").is_err());
    }
}

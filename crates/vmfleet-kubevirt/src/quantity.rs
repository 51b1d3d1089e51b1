//! Resource quantity validation.
//!
//! The group configuration carries guest memory as a Kubernetes-style
//! quantity string ("512Mi", "2Gi", plain bytes) and the CPU core count as
//! a decimal string. Both are validated before any create call is issued,
//! so a malformed value fails an increase with a configuration error
//! instead of a rejected API request.

use vmfleet_core::{ProviderError, ProviderResult};

/// Parse a memory quantity into bytes.
///
/// Accepts a non-negative decimal number with an optional binary (Ki, Mi,
/// Gi, Ti, Pi, Ei) or decimal (k, M, G, T, P, E) suffix.
pub fn parse_memory(s: &str) -> ProviderResult<u64> {
    let s = s.trim();
    let malformed =
        || ProviderError::Configuration(format!("could not parse RAM quantity '{s}'"));

    if s.is_empty() {
        return Err(malformed());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);

    let value: f64 = number.parse().map_err(|_| malformed())?;
    if !value.is_finite() || value < 0.0 {
        return Err(malformed());
    }

    let scale: u64 = match suffix {
        "" => 1,
        "Ki" => 1 << 10,
        "Mi" => 1 << 20,
        "Gi" => 1 << 30,
        "Ti" => 1 << 40,
        "Pi" => 1 << 50,
        "Ei" => 1 << 60,
        "k" => 1_000,
        "M" => 1_000_000,
        "G" => 1_000_000_000,
        "T" => 1_000_000_000_000,
        "P" => 1_000_000_000_000_000,
        "E" => 1_000_000_000_000_000_000,
        _ => return Err(malformed()),
    };

    Ok((value * scale as f64) as u64)
}

/// Parse the CPU core count.
pub fn parse_cores(s: &str) -> ProviderResult<u32> {
    s.trim().parse::<u32>().map_err(|_| {
        ProviderError::Configuration(format!("could not parse CPU core number '{s}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_binary_suffixes() {
        assert_eq!(parse_memory("512Mi").unwrap(), 512 << 20);
        assert_eq!(parse_memory("2Gi").unwrap(), 2 << 30);
        assert_eq!(parse_memory("1Ki").unwrap(), 1024);
    }

    #[test]
    fn memory_decimal_suffixes() {
        assert_eq!(parse_memory("2G").unwrap(), 2_000_000_000);
        assert_eq!(parse_memory("500k").unwrap(), 500_000);
    }

    #[test]
    fn memory_plain_bytes() {
        assert_eq!(parse_memory("1048576").unwrap(), 1 << 20);
    }

    #[test]
    fn memory_fractional() {
        assert_eq!(parse_memory("1.5Gi").unwrap(), 3 << 29);
    }

    #[test]
    fn memory_rejects_garbage() {
        for bad in ["", "lots", "2Gib", "-1Gi", "Gi", "1..5Gi"] {
            let err = parse_memory(bad).unwrap_err();
            assert!(err.is_configuration(), "input {bad:?}");
        }
    }

    #[test]
    fn cores_parse() {
        assert_eq!(parse_cores("4").unwrap(), 4);
        assert_eq!(parse_cores(" 2 ").unwrap(), 2);
    }

    #[test]
    fn cores_reject_garbage() {
        for bad in ["", "two", "-1", "1.5"] {
            assert!(parse_cores(bad).unwrap_err().is_configuration(), "input {bad:?}");
        }
    }
}

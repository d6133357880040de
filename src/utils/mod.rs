//! Small formatting helpers shared by the listing commands.

/// Format a byte count with binary (1024-based) units.
///
/// # Arguments
///
/// * `bytes` - Size in bytes
///
/// # Returns
///
/// A right-padded human-readable string such as `"   1.50 KiB"`.
pub fn format_bytes(bytes: f64) -> String {
    if bytes < 1024.0 {
        return format!("{bytes:7.0}   B");
    }
    let kib = bytes / 1024.0;
    if kib < 1024.0 {
        return format!("{kib:7.2} KiB");
    }
    let mib = bytes / f64::powi(1024.0, 2);
    if mib < 1024.0 {
        return format!("{mib:7.2} MiB");
    }
    let gib = bytes / f64::powi(1024.0, 3);
    if gib < 1024.0 {
        return format!("{gib:7.2} GiB");
    }
    format!("{:7.2} TiB", bytes / f64::powi(1024.0, 4))
}

/// Format a quantity with decimal (1000-based) SI suffixes.
pub fn format_si(qty: f64) -> String {
    if qty < 1000.0 {
        return format!("{qty:7.0}  ");
    }
    let k = qty / 1000.0;
    if k < 1000.0 {
        return format!("{k:7.2} K");
    }
    let m = qty / f64::powi(1000.0, 2);
    if m < 1000.0 {
        return format!("{m:7.2} M");
    }
    let g = qty / f64::powi(1000.0, 3);
    if g < 1000.0 {
        return format!("{g:7.2} G");
    }
    format!("{:7.2} T", qty / f64::powi(1000.0, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(0.0), "      0   B");
        assert!(format_bytes(512.0).ends_with("  B"));
        assert!(format_bytes(2048.0).ends_with("KiB"));
        assert!(format_bytes(3.0 * 1024.0 * 1024.0).ends_with("MiB"));
        assert!(format_bytes(5.0 * 1024.0 * 1024.0 * 1024.0).ends_with("GiB"));
        assert!(format_bytes(2.0_f64 * 1024.0 * 1024.0 * 1024.0 * 1024.0).ends_with("TiB"));
    }

    #[test]
    fn test_format_bytes_values() {
        assert_eq!(format_bytes(1536.0), "   1.50 KiB");
        assert_eq!(format_bytes(100.0), "    100   B");
    }

    #[test]
    fn test_format_si_units() {
        assert!(format_si(999.0).ends_with("  "));
        assert_eq!(format_si(1500.0), "   1.50 K");
        assert!(format_si(2_000_000.0).ends_with("M"));
        assert!(format_si(3_000_000_000.0).ends_with("G"));
        assert!(format_si(4_000_000_000_000.0).ends_with("T"));
    }
}

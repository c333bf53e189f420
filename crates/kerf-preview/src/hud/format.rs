/// Coordinate cell: right-aligned, width 10, three decimals.
pub fn format_coord(v: f64) -> String {
    format!("{:>10.3}", v)
}

/// Feed or speed: up to two decimals without trailing zeros, right-aligned, width 6.
pub fn format_feed_speed(v: f32) -> String {
    let mut s = format!("{:.2}", v);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_owned();
    }
    format!("{s:>6}")
}

/// Vertex count with K/M/B suffixes at 10^3, 10^6 and 10^9.
pub fn format_vertex_count(n: usize) -> String {
    let v = n as f64;
    if v >= 1e9 {
        format!("{:.1} B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1} M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1} K", v / 1e3)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_suffixes() {
        assert_eq!(format_vertex_count(500), "500");
        assert_eq!(format_vertex_count(12_345), "12.3 K");
        assert_eq!(format_vertex_count(2_500_000), "2.5 M");
        assert_eq!(format_vertex_count(1_200_000_000), "1.2 B");
        assert_eq!(format_vertex_count(0), "0");
    }

    #[test]
    fn coords_are_fixed_width() {
        assert_eq!(format_coord(1.5), "     1.500");
        assert_eq!(format_coord(-1234.56789), " -1234.568");
    }

    #[test]
    fn feed_speed_trims_zeros() {
        assert_eq!(format_feed_speed(1200.0), "  1200");
        assert_eq!(format_feed_speed(12.5), "  12.5");
        assert_eq!(format_feed_speed(0.126), "  0.13");
        assert_eq!(format_feed_speed(0.0), "     0");
    }
}

//! Skin sensor identity
//!
//! Eight named sites around the socket, location-major: each of the four
//! locations carries a top and a bottom sensor. The order is positional and
//! load-bearing: sensor axis index i of every force series belongs to
//! `SENSOR_SITES[i]`, and the per-sensor panel grid flattens row-major to
//! the same order. Recordings with more sensors than names are truncated to
//! this list, never the other way around.

/// Ordered skin sensor site names
pub const SENSOR_SITES: [&str; 8] = [
    "posterior top",
    "posterior bottom",
    "medial top",
    "medial bottom",
    "anterior top",
    "anterior bottom",
    "lateral top",
    "lateral bottom",
];

/// Columns of the per-sensor panel grid (top | bottom per location row)
pub const SENSOR_GRID_COLS: usize = 2;

/// Default site list as owned strings, for configuration
pub fn default_sites() -> Vec<String> {
    SENSOR_SITES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_list_is_location_major() {
        assert_eq!(SENSOR_SITES.len(), 8);
        // Each location row holds its top sensor, then its bottom sensor
        for row in SENSOR_SITES.chunks(SENSOR_GRID_COLS) {
            assert!(row[0].ends_with("top"));
            assert!(row[1].ends_with("bottom"));
        }
    }
}

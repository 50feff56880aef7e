/// Location catalog for the Athus rain gauge network in Kota Semarang.
///
/// Defines the fixed list of gauge sites a reading can be filed against.
/// This is the single source of truth for location values; the form stores
/// the coordinate string of the chosen entry, and the store keeps that string
/// as-is. No other module should hardcode coordinates.

// ---------------------------------------------------------------------------
// Location metadata
// ---------------------------------------------------------------------------

/// One selectable gauge site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// "latitude,longitude" in WGS84, exactly as stored in the table.
    pub value: &'static str,
    /// Display name shown in the selector.
    pub label: &'static str,
}

/// All gauge sites, in selector order.
pub static LOCATION_CATALOG: &[Location] = &[
    Location { value: "-6.9586756,110.2278471", label: "Kantor DLH Kota Semarang" },
    Location { value: "-7.0019305,110.3358617", label: "SD Negeri Bringin 02" },
    Location { value: "-6.9803227,110.3871209", label: "SD Negeri Karangayu 02" },
    Location { value: "-7.0071388,110.4034657", label: "Kantor Kecamatan Gajah Mungkur" },
    Location { value: "-6.9649253,110.4578284", label: "SD Negeri Gebangsari 02" },
    Location { value: "-7.0112112,110.4602599", label: "Kantor Kecamatan Pedurungan" },
    Location { value: "-7.0410422,110.2901878", label: "SD Wonoplembon 01" },
    Location { value: "-7.0409499,110.2515631", label: "Balai Penyuluh Pertanian - Mijen" },
    Location { value: "-7.0395878,110.3629892", label: "SD Negeri Sadeng 02" },
    Location { value: "-7.0637616,110.3466957", label: "SD Negeri Jatirejo" },
    Location { value: "-7.0671702,110.3605648", label: "Kelurahan Nongkosawit" },
    Location { value: "-7.106038,110.3866514", label: "SD Negeri Sumurejo 01" },
];

/// Returns `true` if `candidate` is exactly one of the catalog values.
///
/// No trimming, case folding, or partial matching.
pub fn is_known_location(candidate: &str) -> bool {
    find_location(candidate).is_some()
}

/// Looks up a location by its coordinate value. Returns `None` if not found.
pub fn find_location(value: &str) -> Option<&'static Location> {
    LOCATION_CATALOG.iter().find(|l| l.value == value)
}

/// Display label for a coordinate value, if it is in the catalog.
pub fn label_for(value: &str) -> Option<&'static str> {
    find_location(value).map(|l| l.label)
}

/// Looks up a location by its 1-based position in the selector.
pub fn location_by_index(index: usize) -> Option<&'static Location> {
    index.checked_sub(1).and_then(|i| LOCATION_CATALOG.get(i))
}

/// Returns the coordinate values of all locations, in catalog order.
pub fn all_location_values() -> Vec<&'static str> {
    LOCATION_CATALOG.iter().map(|l| l.value).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_values_are_lat_lon_pairs_inside_semarang() {
        // Membership is exact string match, so a typo here would be accepted.
        for location in LOCATION_CATALOG {
            let parts: Vec<&str> = location.value.split(',').collect();
            assert_eq!(parts.len(), 2, "value for '{}' should be 'lat,lon'", location.label);

            let lat: f64 = parts[0].parse().expect("latitude should parse");
            let lon: f64 = parts[1].parse().expect("longitude should parse");
            assert!(
                (-7.2..=-6.8).contains(&lat),
                "latitude {} for '{}' is outside Semarang",
                lat,
                location.label
            );
            assert!(
                (110.1..=110.6).contains(&lon),
                "longitude {} for '{}' is outside Semarang",
                lon,
                location.label
            );
        }
    }

    #[test]
    fn test_no_duplicate_values_or_labels() {
        let mut values = std::collections::HashSet::new();
        let mut labels = std::collections::HashSet::new();
        for location in LOCATION_CATALOG {
            assert!(values.insert(location.value), "duplicate value '{}'", location.value);
            assert!(labels.insert(location.label), "duplicate label '{}'", location.label);
        }
    }

    #[test]
    fn test_catalog_has_twelve_sites_in_order() {
        assert_eq!(LOCATION_CATALOG.len(), 12);
        assert_eq!(LOCATION_CATALOG[0].label, "Kantor DLH Kota Semarang");
        assert_eq!(LOCATION_CATALOG[11].label, "SD Negeri Sumurejo 01");
    }

    #[test]
    fn test_membership_is_exact_match_only() {
        assert!(is_known_location("-6.9586756,110.2278471"));
        assert!(!is_known_location(""));
        assert!(!is_known_location(" -6.9586756,110.2278471"));
        assert!(!is_known_location("-6.9586756, 110.2278471"));
        assert!(!is_known_location("-6.9586756"));
        assert!(!is_known_location("Kantor DLH Kota Semarang"));
    }

    #[test]
    fn test_find_and_label_lookup() {
        let location = find_location("-7.0112112,110.4602599").expect("Pedurungan should be in catalog");
        assert_eq!(location.label, "Kantor Kecamatan Pedurungan");
        assert_eq!(label_for("-7.106038,110.3866514"), Some("SD Negeri Sumurejo 01"));
        assert_eq!(label_for("0,0"), None);
    }

    #[test]
    fn test_location_by_index_is_one_based() {
        assert_eq!(location_by_index(0), None);
        assert_eq!(location_by_index(1).map(|l| l.label), Some("Kantor DLH Kota Semarang"));
        assert_eq!(location_by_index(12).map(|l| l.label), Some("SD Negeri Sumurejo 01"));
        assert_eq!(location_by_index(13), None);
    }

    #[test]
    fn test_all_location_values_matches_catalog_length() {
        assert_eq!(all_location_values().len(), LOCATION_CATALOG.len());
    }
}

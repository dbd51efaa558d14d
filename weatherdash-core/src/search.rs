//! City autocomplete over a fixed list of Indian cities.

use crate::dashboard::MIN_CITY_LEN;

pub const MAX_SUGGESTIONS: usize = 8;

pub const CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Ahmedabad",
    "Chennai", "Kolkata", "Surat", "Pune", "Jaipur",
    "Lucknow", "Kanpur", "Nagpur", "Indore", "Thane",
    "Bhopal", "Visakhapatnam", "Pimpri-Chinchwad", "Patna", "Vadodara",
    "Ghaziabad", "Ludhiana", "Agra", "Nashik", "Faridabad",
    "Meerut", "Rajkot", "Kalyan-Dombivali", "Vasai-Virar", "Varanasi",
    "Srinagar", "Aurangabad", "Dhanbad", "Amritsar", "Navi Mumbai",
    "Allahabad", "Ranchi", "Howrah", "Coimbatore", "Jabalpur",
    "Gwalior", "Vijayawada", "Jodhpur", "Madurai", "Raipur",
    "Kota", "Guwahati", "Chandigarh", "Solapur", "Hubballi-Dharwad",
    "Tiruchirappalli", "Bareilly", "Mysore", "Tiruppur", "Gurgaon",
    "Aligarh", "Jalandhar", "Bhubaneswar", "Salem", "Warangal",
    "Guntur", "Bhiwandi", "Saharanpur", "Gorakhpur", "Bikaner",
    "Amravati", "Noida", "Jamshedpur", "Bhilai", "Cuttack",
    "Firozabad", "Kochi", "Nellore", "Bhavnagar", "Dehradun",
    "Durgapur", "Asansol", "Rourkela", "Nanded", "Kolhapur",
    "Ajmer", "Akola", "Gulbarga", "Jamnagar", "Ujjain",
];

pub const POPULAR_CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai",
    "Kolkata", "Pune", "Jaipur", "Ahmedabad", "Surat",
];

/// Case-insensitive substring matches, in list order, at most [`MAX_SUGGESTIONS`].
pub fn suggest(query: &str) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    CITIES
        .iter()
        .copied()
        .filter(|city| city.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// The city a search box would submit: the picked suggestion, else the typed text.
pub fn selection(picked: Option<&str>, typed: &str) -> Option<String> {
    let city = picked.map(str::trim).unwrap_or_else(|| typed.trim());
    (city.chars().count() >= MIN_CITY_LEN).then(|| city.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_suggestions() {
        assert!(suggest("").is_empty());
        assert!(suggest("   ").is_empty());
    }

    #[test]
    fn matches_substrings_case_insensitively() {
        assert_eq!(suggest("MUM"), ["Mumbai", "Navi Mumbai"]);
        assert_eq!(suggest("dharwad"), ["Hubballi-Dharwad"]);
    }

    #[test]
    fn caps_at_eight_in_list_order() {
        let hits = suggest("a");

        assert_eq!(hits.len(), MAX_SUGGESTIONS);
        assert_eq!(hits[0], "Mumbai");
        assert_eq!(hits[1], "Bangalore");
        assert!(!hits.contains(&"Delhi"));
    }

    #[test]
    fn unknown_city_has_no_suggestions() {
        assert!(suggest("Zzqx").is_empty());
    }

    #[test]
    fn popular_cities_are_in_the_full_list() {
        assert_eq!(CITIES.len(), 85);
        for city in POPULAR_CITIES {
            assert!(CITIES.contains(city), "{city}");
        }
    }

    #[test]
    fn selection_prefers_pick_and_enforces_length() {
        assert_eq!(selection(Some("Pune"), "pu"), Some("Pune".to_string()));
        assert_eq!(selection(None, "  Goa "), Some("Goa".to_string()));
        assert_eq!(selection(None, "x"), None);
    }
}

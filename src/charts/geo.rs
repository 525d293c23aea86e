/// Approximate (longitude, latitude) centroid for a country name.
///
/// Matching ignores case and surrounding whitespace; common short forms
/// such as "USA" and "UK" are accepted.
pub fn centroid(country: &str) -> Option<(f64, f64)> {
    let name = country.trim().to_ascii_lowercase();
    let name = match name.as_str() {
        "usa" | "us" | "united states of america" | "america" => "united states",
        "uk" | "great britain" | "britain" | "england" => "united kingdom",
        "russian federation" => "russia",
        "south korea" | "republic of korea" => "korea",
        "uae" => "united arab emirates",
        "czechia" => "czech republic",
        other => other,
    };
    CENTROIDS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, lon, lat)| (lon, lat))
}

const CENTROIDS: &[(&str, f64, f64)] = &[
    ("argentina", -64.0, -34.0),
    ("australia", 133.0, -25.0),
    ("austria", 14.5, 47.5),
    ("belgium", 4.5, 50.8),
    ("brazil", -51.9, -14.2),
    ("canada", -106.3, 56.1),
    ("chile", -71.5, -35.7),
    ("china", 104.2, 35.9),
    ("colombia", -74.3, 4.6),
    ("czech republic", 15.5, 49.8),
    ("denmark", 9.5, 56.3),
    ("egypt", 30.8, 26.8),
    ("finland", 25.7, 61.9),
    ("france", 2.2, 46.2),
    ("germany", 10.5, 51.2),
    ("greece", 21.8, 39.1),
    ("hong kong", 114.2, 22.3),
    ("hungary", 19.5, 47.2),
    ("india", 78.9, 20.6),
    ("indonesia", 113.9, -0.8),
    ("ireland", -8.2, 53.4),
    ("israel", 34.9, 31.0),
    ("italy", 12.6, 41.9),
    ("japan", 138.3, 36.2),
    ("kenya", 37.9, 0.02),
    ("korea", 127.8, 35.9),
    ("malaysia", 101.98, 4.2),
    ("mexico", -102.6, 23.6),
    ("netherlands", 5.3, 52.1),
    ("new zealand", 174.9, -40.9),
    ("nigeria", 8.7, 9.1),
    ("norway", 8.5, 60.5),
    ("pakistan", 69.3, 30.4),
    ("peru", -75.0, -9.2),
    ("philippines", 121.8, 12.9),
    ("poland", 19.1, 51.9),
    ("portugal", -8.2, 39.4),
    ("romania", 24.97, 45.9),
    ("russia", 105.3, 61.5),
    ("saudi arabia", 45.1, 23.9),
    ("singapore", 103.8, 1.35),
    ("south africa", 22.9, -30.6),
    ("spain", -3.7, 40.5),
    ("sweden", 18.6, 60.1),
    ("switzerland", 8.2, 46.8),
    ("thailand", 100.99, 15.9),
    ("turkey", 35.2, 38.96),
    ("ukraine", 31.2, 48.4),
    ("united arab emirates", 53.8, 23.4),
    ("united kingdom", -3.4, 55.4),
    ("united states", -95.7, 37.1),
    ("vietnam", 108.3, 14.1),
];

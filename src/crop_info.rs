//! Crop Information Lookup Table
//!
//! Short growing-condition notes for each crop the recommendation model can
//! predict. Keys are lowercase model labels; lookup ignores case.

/// Returned for labels not present in the table.
pub const FALLBACK_INFO: &str = "Information not available for this crop.";

// ============================================================================
// EMBEDDED CROP NOTES
// ============================================================================

static CROP_INFO: &[(&str, &str)] = &[
    ("rice", "Rice requires plenty of water and warm conditions. Best suited for humid regions with temperatures between 20-40°C."),
    ("wheat", "Wheat grows well in moderately cool climates with about 30-100 cm of annual rainfall."),
    ("maize", "Maize (corn) needs lots of sunlight and warm soil. Requires moderate rainfall and well-drained soil."),
    ("chickpea", "Chickpeas thrive in cool, dry climates and can tolerate drought conditions."),
    ("kidney beans", "Kidney beans prefer warm temperatures and moderate rainfall, with well-drained soil."),
    ("pigeonpeas", "Pigeon peas are drought-resistant and grow well in semi-arid regions."),
    ("mothbeans", "Moth beans are extremely drought-resistant and suitable for arid regions."),
    ("mungbean", "Mung beans grow best in warm climates with moderate rainfall."),
    ("blackgram", "Black gram requires warm, humid conditions and moderate rainfall."),
    ("lentil", "Lentils prefer cool growing seasons and moderate rainfall."),
    ("pomegranate", "Pomegranate trees thrive in semi-arid to arid climates with hot summers."),
    ("banana", "Bananas need tropical conditions with high humidity and rainfall."),
    ("mango", "Mangoes grow best in tropical climates with a distinct dry season."),
    ("grapes", "Grapes prefer temperate climates with warm, dry summers and mild winters."),
    ("watermelon", "Watermelons need lots of sun and warm soil, with moderate water."),
    ("muskmelon", "Muskmelons require warm temperatures and well-drained soil."),
    ("apple", "Apples grow best in temperate climates with cold winters and moderate summers."),
    ("orange", "Oranges thrive in subtropical climates with mild winters."),
    ("papaya", "Papayas need tropical or subtropical conditions with no frost."),
    ("coconut", "Coconuts require tropical climates with high humidity and rainfall."),
    ("cotton", "Cotton grows best in warm climates with moderate rainfall."),
    ("jute", "Jute requires high rainfall and humid conditions."),
    ("coffee", "Coffee grows best in tropical highlands with moderate temperatures."),
];

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// Get the growing-condition note for a crop label.
///
/// Total over all strings: unknown labels get [`FALLBACK_INFO`].
///
/// # Examples
/// ```
/// use crop_advisor::crop_info::{lookup, FALLBACK_INFO};
///
/// assert_eq!(lookup("Rice"), lookup("RICE"));
/// assert_eq!(lookup("dragonfruit"), FALLBACK_INFO);
/// ```
pub fn lookup(crop_label: &str) -> &'static str {
    let key = crop_label.trim().to_lowercase();

    CROP_INFO
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, info)| *info)
        .unwrap_or(FALLBACK_INFO)
}

/// All crop names with a dedicated note, in table order.
pub fn known_crops() -> impl Iterator<Item = &'static str> {
    CROP_INFO.iter().map(|(name, _)| *name)
}

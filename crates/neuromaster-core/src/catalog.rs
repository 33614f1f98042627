//! Reference catalog of the twelve cranial nerves.
//!
//! Every game mode and the reference view read from this table; nothing
//! else defines nerve data.

use crate::error::CatalogError;
use crate::model::{FunctionType, NerveRecord};

/// Number of cranial nerves.
pub const NERVE_COUNT: usize = 12;

static CRANIAL_NERVES: [NerveRecord; NERVE_COUNT] = [
    NerveRecord {
        id: 1,
        roman: "I",
        name: "Olfactory",
        function_type: FunctionType::Sensory,
        description: "Carries the sense of smell.",
        key_function: "Smell",
    },
    NerveRecord {
        id: 2,
        roman: "II",
        name: "Optic",
        function_type: FunctionType::Sensory,
        description: "Transmits visual impulses from the retina.",
        key_function: "Vision",
    },
    NerveRecord {
        id: 3,
        roman: "III",
        name: "Oculomotor",
        function_type: FunctionType::Motor,
        description: "Controls most eye movements, eyelid elevation and pupillary constriction.",
        key_function: "Eye movement",
    },
    NerveRecord {
        id: 4,
        roman: "IV",
        name: "Trochlear",
        function_type: FunctionType::Motor,
        description: "Supplies the superior oblique muscle of the eye.",
        key_function: "Eye movement (down and in)",
    },
    NerveRecord {
        id: 5,
        roman: "V",
        name: "Trigeminal",
        function_type: FunctionType::Mixed,
        description: "Sensation of the face and the muscles of mastication.",
        key_function: "Facial sensation / Chewing",
    },
    NerveRecord {
        id: 6,
        roman: "VI",
        name: "Abducens",
        function_type: FunctionType::Motor,
        description: "Supplies the lateral rectus muscle (abduction of the eye).",
        key_function: "Eye movement (lateral)",
    },
    NerveRecord {
        id: 7,
        roman: "VII",
        name: "Facial",
        function_type: FunctionType::Mixed,
        description: "Facial expression and taste from the anterior two thirds of the tongue.",
        key_function: "Facial expression",
    },
    NerveRecord {
        id: 8,
        roman: "VIII",
        name: "Vestibulocochlear",
        function_type: FunctionType::Sensory,
        description: "Hearing and balance.",
        key_function: "Hearing and balance",
    },
    NerveRecord {
        id: 9,
        roman: "IX",
        name: "Glossopharyngeal",
        function_type: FunctionType::Mixed,
        description: "Swallowing, taste from the posterior third of the tongue, gag reflex.",
        key_function: "Swallowing / Taste",
    },
    NerveRecord {
        id: 10,
        roman: "X",
        name: "Vagus",
        function_type: FunctionType::Mixed,
        description: "Parasympathetic control of the viscera and phonation.",
        key_function: "Viscera / Voice",
    },
    NerveRecord {
        id: 11,
        roman: "XI",
        name: "Accessory",
        function_type: FunctionType::Motor,
        description: "Moves the neck and shoulders (sternocleidomastoid and trapezius).",
        key_function: "Shoulder and neck movement",
    },
    NerveRecord {
        id: 12,
        roman: "XII",
        name: "Hypoglossal",
        function_type: FunctionType::Motor,
        description: "Movements of the tongue.",
        key_function: "Tongue movement",
    },
];

/// All twelve nerves in anatomical order.
pub fn all() -> &'static [NerveRecord] {
    &CRANIAL_NERVES
}

/// Look up a nerve by its ordinal.
pub fn by_id(id: u8) -> Result<&'static NerveRecord, CatalogError> {
    CRANIAL_NERVES
        .iter()
        .find(|n| n.id == id)
        .ok_or(CatalogError::NotFound(id))
}

/// Resolve free-form user input to a nerve.
///
/// Accepts a numeric id, a roman numeral, or a case-insensitive name. Names
/// also match on a unique prefix of at least three letters.
pub fn find(query: &str) -> Option<&'static NerveRecord> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Ok(id) = query.parse::<u8>() {
        return by_id(id).ok();
    }

    let upper = query.to_uppercase();
    if let Some(nerve) = CRANIAL_NERVES.iter().find(|n| n.roman == upper) {
        return Some(nerve);
    }

    let lower = query.to_lowercase();
    if let Some(nerve) = CRANIAL_NERVES
        .iter()
        .find(|n| n.name.to_lowercase() == lower)
    {
        return Some(nerve);
    }

    if lower.len() < 3 {
        return None;
    }
    let mut matches = CRANIAL_NERVES
        .iter()
        .filter(|n| n.name.to_lowercase().starts_with(&lower));
    match (matches.next(), matches.next()) {
        (Some(nerve), None) => Some(nerve),
        _ => None,
    }
}

//! Profile-match scoring for one (doctor, patient, message-history) triple.
//!
//! Additive point system; the weights are design constants. The keyword
//! bonus accumulates per (message, keyword) pair and has no upper bound,
//! so long chat histories can push scores well past the structural maximum.

use crate::models::{ChatMessageSnippet, Doctor, Patient};

/// Fixed vocabulary matched against both message text and specialization.
pub const MATCH_KEYWORDS: [&str; 6] = [
    "stress",
    "depression",
    "anxiety",
    "relationship",
    "trauma",
    "insomnia",
];

pub const LANGUAGE_POINTS: f64 = 5.0;
pub const RELIGION_POINTS: f64 = 2.0;
pub const ADDRESS_POINTS: f64 = 4.0;
pub const KEYWORD_POINTS: f64 = 5.0;

/// Mean of the raw 1-5 rating values; `None` when there are none.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64)
}

/// Compute the match score. Deterministic, side-effect free, rounded to two
/// decimal places. The rating mean is added unweighted.
pub fn score_doctor(
    doctor: &Doctor,
    patient: &Patient,
    history: &[ChatMessageSnippet],
    ratings: &[i32],
) -> f64 {
    let mut score = 0.0;

    if doctor.language == patient.language {
        score += LANGUAGE_POINTS;
    }
    if doctor.religion == patient.religion {
        score += RELIGION_POINTS;
    }
    if let (Some(doctor_address), Some(patient_address)) = (&doctor.address, &patient.address) {
        if !doctor_address.is_empty()
            && !patient_address.is_empty()
            && doctor_address.to_lowercase() == patient_address.to_lowercase()
        {
            score += ADDRESS_POINTS;
        }
    }

    let specialization = doctor.specialization.to_lowercase();
    for message in history {
        let text = message.message_text.to_lowercase();
        for keyword in MATCH_KEYWORDS {
            if text.contains(keyword) && specialization.contains(keyword) {
                score += KEYWORD_POINTS;
            }
        }
    }

    if let Some(avg) = average_rating(ratings) {
        score += avg;
    }

    (score * 100.0).round() / 100.0
}

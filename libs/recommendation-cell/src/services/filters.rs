//! Structured filtering of the active doctor pool.
//!
//! All supplied criteria apply conjunctively; absent criteria bind nothing,
//! so an empty filter passes the pool through unchanged. The busy set is
//! resolved by the engine (only when the caller pinned an exact date and
//! start time) and arrives here as plain identifiers.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{AvailabilityFilter, Doctor, RecommendationFilter};

pub fn apply_filters(
    pool: &[Doctor],
    filter: Option<&RecommendationFilter>,
    busy: &HashSet<Uuid>,
) -> Vec<Doctor> {
    match filter {
        Some(filter) => pool
            .iter()
            .filter(|doctor| matches_filter(doctor, filter, busy))
            .cloned()
            .collect(),
        None => pool.to_vec(),
    }
}

fn matches_filter(doctor: &Doctor, filter: &RecommendationFilter, busy: &HashSet<Uuid>) -> bool {
    if let Some(language) = &filter.language {
        if doctor.language.as_deref() != Some(language.as_str()) {
            return false;
        }
    }

    if let Some(region) = &filter.region {
        let matches_region = doctor
            .address
            .as_deref()
            .is_some_and(|address| address.to_lowercase().contains(&region.to_lowercase()));
        if !matches_region {
            return false;
        }
    }

    if let Some(gender) = filter.gender {
        if doctor.gender != gender {
            return false;
        }
    }

    if let Some(specialization) = &filter.specialization {
        if !doctor
            .specialization
            .to_lowercase()
            .contains(&specialization.to_lowercase())
        {
            return false;
        }
    }

    if let Some(max_fee) = filter.max_consultation_fee {
        if doctor.consultation_fee > max_fee {
            return false;
        }
    }

    if let Some(availability) = &filter.availability {
        if !matches_availability(doctor, availability) {
            return false;
        }
        if busy.contains(&doctor.doctor_id) {
            return false;
        }
    }

    true
}

fn matches_availability(doctor: &Doctor, filter: &AvailabilityFilter) -> bool {
    let interval = match (filter.start_time, filter.end_time) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };

    // When both a day and a time interval are requested, one window has to
    // satisfy both; a window on another day covering the interval does not
    // qualify.
    match (&filter.day, interval) {
        (Some(day), Some((start, end))) => doctor
            .availability
            .iter()
            .any(|window| window.is_on_day(day) && window.covers(start, end)),
        (Some(day), None) => doctor
            .availability
            .iter()
            .any(|window| window.is_on_day(day)),
        (None, Some((start, end))) => doctor
            .availability
            .iter()
            .any(|window| window.covers(start, end)),
        (None, None) => true,
    }
}

//! Location input checks and normalisation

/// Longest city name accepted
pub const MAX_CITY_LEN: usize = 100;

/// Longest run of consecutive digits tolerated in a city name
pub const MAX_DIGIT_RUN: usize = 2;

/// Basic well-formedness check applied before any outbound call
///
/// Non-empty, alphabetic first character, no long digit runs, and only
/// letters, digits, whitespace, hyphens, apostrophes and periods.
pub fn is_well_formed_city(city: &str) -> bool {
    let city = city.trim();
    if city.is_empty() || city.chars().count() > MAX_CITY_LEN {
        return false;
    }

    if !city.chars().next().is_some_and(char::is_alphabetic) {
        return false;
    }

    let mut digit_run = 0;
    for ch in city.chars() {
        if ch.is_ascii_digit() {
            digit_run += 1;
            if digit_run > MAX_DIGIT_RUN {
                return false;
            }
            continue;
        }
        digit_run = 0;

        let allowed = ch.is_alphabetic() || ch.is_whitespace() || matches!(ch, '-' | '\'' | '.');
        if !allowed {
            return false;
        }
    }

    true
}

/// Two ASCII letters, any case
pub fn is_state_code(state: &str) -> bool {
    let state = state.trim();
    state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic())
}

/// Trimmed, whitespace-collapsed city and upper-cased state
pub fn normalize_location(city: &str, state: &str) -> (String, String) {
    let city = city.split_whitespace().collect::<Vec<_>>().join(" ");
    let state = state.trim().to_ascii_uppercase();
    (city, state)
}

/// "<city>, <state>"
pub fn location_label(city: &str, state: &str) -> String {
    format!("{}, {}", city, state)
}

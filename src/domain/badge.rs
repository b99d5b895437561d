//! Stable badge colours for free-text categories.

const PALETTE: [&str; 8] = [
    "#2563eb", "#16a34a", "#d97706", "#dc2626", "#7c3aed", "#0891b2", "#db2777", "#4b5563",
];

/// Pick a palette colour for `label`. The same label always maps to the same colour.
pub fn badge_color(label: &str) -> &'static str {
    let hash = label
        .chars()
        .fold(0u32, |acc, ch| acc.wrapping_mul(31).wrapping_add(ch as u32));
    PALETTE[(hash as usize) % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_is_stable_per_label() {
        assert_eq!(badge_color("Kuliner"), badge_color("Kuliner"));
        assert!(PALETTE.contains(&badge_color("Fashion")));
    }

    #[test]
    fn empty_label_maps_to_first_colour() {
        assert_eq!(badge_color(""), PALETTE[0]);
    }
}

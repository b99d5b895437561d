//! Date-suffixed slugs for user-facing records.
//!
//! A slug is the slugified title followed by the calendar date of creation, for
//! example `hello-world-2024-05-01`. Generation is pure and does not consult
//! storage; two records titled alike on the same day collide and the unique
//! index in storage rejects the second one.

use slug::slugify;
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive the slug for `title` created on `date`.
pub fn generate_slug(title: &str, date: Date) -> Result<String, SlugError> {
    if title.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let base = slugify(title);
    if base.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: title.to_string(),
        });
    }

    Ok(format!("{base}-{}", iso_date(date)))
}

/// [`generate_slug`] using today's UTC date.
pub fn generate_slug_today(title: &str) -> Result<String, SlugError> {
    generate_slug(title, OffsetDateTime::now_utc().date())
}

fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn lowercases_hyphenates_and_appends_date() {
        let slug = generate_slug("Hello World", date!(2024 - 05 - 01)).expect("slug");
        assert_eq!(slug, "hello-world-2024-05-01");
    }

    #[test]
    fn same_title_same_day_is_deterministic() {
        let day = date!(2025 - 01 - 09);
        let first = generate_slug("Festival Kopi Magelang", day).expect("slug");
        let second = generate_slug("Festival Kopi Magelang", day).expect("slug");
        assert_eq!(first, second);
        assert_eq!(first, "festival-kopi-magelang-2025-01-09");
    }

    #[test]
    fn different_days_produce_different_slugs() {
        let a = generate_slug("Hello", date!(2024 - 12 - 31)).expect("slug");
        let b = generate_slug("Hello", date!(2025 - 01 - 01)).expect("slug");
        assert_ne!(a, b);
    }

    #[test]
    fn punctuation_is_dropped() {
        let slug = generate_slug("  Batik & Craft!  ", date!(2024 - 02 - 03)).expect("slug");
        assert_eq!(slug, "batik-craft-2024-02-03");
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert_eq!(
            generate_slug("   ", date!(2024 - 02 - 03)),
            Err(SlugError::EmptyInput)
        );
        assert!(matches!(
            generate_slug("!!!", date!(2024 - 02 - 03)),
            Err(SlugError::Unrepresentable { .. })
        ));
    }
}

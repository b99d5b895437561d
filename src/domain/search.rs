//! Weighted token matching used by the public search endpoint.
//!
//! The query is lower-cased and split on whitespace. Every token that occurs in
//! a field adds that field's weight to the item's score. Items scoring zero are
//! discarded and the rest are ordered by score, then by label.

use std::cmp::Ordering;

/// A searchable field and its weight.
#[derive(Debug, Clone, Copy)]
pub struct WeightedField<'a> {
    pub text: &'a str,
    pub weight: u32,
}

impl<'a> WeightedField<'a> {
    pub fn new(text: &'a str, weight: u32) -> Self {
        Self { text, weight }
    }
}

/// Normalised search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| !token.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn score(&self, fields: &[WeightedField<'_>]) -> u32 {
        let lowered: Vec<(String, u32)> = fields
            .iter()
            .map(|field| (field.text.to_lowercase(), field.weight))
            .collect();

        self.tokens
            .iter()
            .map(|token| {
                lowered
                    .iter()
                    .filter(|(text, _)| text.contains(token.as_str()))
                    .map(|(_, weight)| *weight)
                    .sum::<u32>()
            })
            .sum()
    }
}

/// A scored search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub score: u32,
    pub item: T,
}

/// Score `items`, drop misses, and sort best first.
pub fn rank<T, F, L>(query: &SearchQuery, items: Vec<T>, fields: F, label: L) -> Vec<Scored<T>>
where
    F: Fn(&T) -> Vec<WeightedField<'_>>,
    L: Fn(&T) -> &str,
{
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<Scored<T>> = items
        .into_iter()
        .filter_map(|item| {
            let score = query.score(&fields(&item));
            (score > 0).then_some(Scored { score, item })
        })
        .collect();

    scored.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => label(&a.item).cmp(label(&b.item)),
        other => other,
    });
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        title: &'static str,
        body: &'static str,
    }

    fn fields(doc: &Doc) -> Vec<WeightedField<'_>> {
        vec![WeightedField::new(doc.title, 3), WeightedField::new(doc.body, 1)]
    }

    #[test]
    fn title_hits_outrank_body_hits() {
        let docs = vec![
            Doc {
                title: "Kopi lokal",
                body: "tentang batik",
            },
            Doc {
                title: "Batik Magelang",
                body: "motif",
            },
        ];
        let query = SearchQuery::parse("BATIK");
        let ranked = rank(&query, docs, fields, |doc| doc.title);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.title, "Batik Magelang");
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn misses_are_dropped_and_ties_sort_by_label() {
        let docs = vec![
            Doc {
                title: "Zeta kopi",
                body: "",
            },
            Doc {
                title: "Alpha kopi",
                body: "",
            },
            Doc {
                title: "Unrelated",
                body: "",
            },
        ];
        let ranked = rank(&SearchQuery::parse("kopi"), docs, fields, |doc| doc.title);
        let titles: Vec<_> = ranked.iter().map(|s| s.item.title).collect();
        assert_eq!(titles, vec!["Alpha kopi", "Zeta kopi"]);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let docs = vec![Doc {
            title: "Anything",
            body: "",
        }];
        assert!(rank(&SearchQuery::parse("   "), docs, fields, |doc| doc.title).is_empty());
    }
}

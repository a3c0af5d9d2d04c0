//! Read-only views over the collection: category filter and random draw.

use crate::models::Quote;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Value stored for "no filter"
pub const ALL_CATEGORIES: &str = "all";

/// Category filter applied to the quote list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(String),
}

impl Filter {
    /// Parse a persisted or user-typed filter; blank and `all` mean no filter
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == ALL_CATEGORIES {
            Filter::All
        } else {
            Filter::Category(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Filter::All => ALL_CATEGORIES,
            Filter::Category(name) => name,
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(name) => quote.category == *name,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quotes matching the filter, in collection order
pub fn filter_quotes<'a>(quotes: &'a [Quote], filter: &Filter) -> Vec<&'a Quote> {
    quotes.iter().filter(|q| filter.matches(q)).collect()
}

/// Uniform draw among the quotes of one category
pub fn random_quote<'a, R: Rng + ?Sized>(
    quotes: &'a [Quote],
    category: &str,
    rng: &mut R,
) -> Option<&'a Quote> {
    let candidates: Vec<&Quote> = quotes.iter().filter(|q| q.category == category).collect();
    candidates.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Origin;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quotes() -> Vec<Quote> {
        vec![
            Quote::new(1, "A", "X", Origin::LocalSynced),
            Quote::new(2, "B", "Y", Origin::LocalSynced),
            Quote::new(1000, "C", "X", Origin::LocalUnsynced),
        ]
    }

    #[test]
    fn category_filter_keeps_relative_order() {
        let quotes = quotes();
        let shown = filter_quotes(&quotes, &Filter::Category("X".into()));
        let ids: Vec<u64> = shown.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 1000]);
    }

    #[test]
    fn all_shows_everything() {
        let quotes = quotes();
        assert_eq!(filter_quotes(&quotes, &Filter::All).len(), 3);
        assert_eq!(filter_quotes(&quotes, &Filter::parse("all")).len(), 3);
    }

    #[test]
    fn unknown_category_shows_nothing() {
        let quotes = quotes();
        assert!(filter_quotes(&quotes, &Filter::Category("Z".into())).is_empty());
    }

    #[test]
    fn parse_round_trips_through_as_str() {
        assert_eq!(Filter::parse(""), Filter::All);
        assert_eq!(Filter::parse("  Life "), Filter::Category("Life".into()));
        assert_eq!(Filter::Category("Life".into()).as_str(), "Life");
        assert_eq!(Filter::All.to_string(), "all");
    }

    #[test]
    fn random_draw_stays_in_category() {
        let quotes = quotes();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let quote = random_quote(&quotes, "X", &mut rng).unwrap();
            assert_eq!(quote.category, "X");
        }
        assert!(random_quote(&quotes, "Nope", &mut rng).is_none());
    }
}

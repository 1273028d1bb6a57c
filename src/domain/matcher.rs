//! Cross-venue market matching.
//!
//! Pairs each venue-A quote with the most similar unused venue-B quote
//! by question text. Greedy and order-dependent: A quotes are processed
//! in input order and the first accepted pairing claims its B quote for
//! the rest of the pass. A missed pairing costs an opportunity; a wrong
//! one reports a spread that does not exist.

use super::quote::MarketQuote;
use super::similarity;

/// Default minimum similarity for a pairing.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.55;

/// Matcher tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Minimum similarity (inclusive) for a pairing to be accepted.
    pub similarity_threshold: f64,
    /// Score at most this many B quotes per A quote, chosen by a cheap
    /// character-overlap prefilter. `None` scores every unused B quote.
    pub max_candidates: Option<usize>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_candidates: None,
        }
    }
}

/// A cross-venue pairing. Borrows both quotes from the cycle's quote sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedMarket<'a> {
    pub quote_a: &'a MarketQuote,
    pub quote_b: &'a MarketQuote,
    /// Score that produced the pairing; always >= the threshold.
    pub similarity: f64,
}

/// Greedy question-text matcher.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub const fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Pair quotes across venues.
    ///
    /// Output follows the order of `venue_a`. Either side empty yields
    /// no pairings.
    ///
    /// Same inputs always give the same pairings in the same order.
    pub fn match_quotes<'a>(
        &self,
        venue_a: &'a [MarketQuote],
        venue_b: &'a [MarketQuote],
    ) -> Vec<MatchedMarket<'a>> {
        let b_keys: Vec<Vec<char>> = venue_b.iter().map(match_key).collect();
        let mut claimed = vec![false; venue_b.len()];
        let mut matches = Vec::new();

        for quote_a in venue_a {
            let a_key = match_key(quote_a);
            let candidates = self.candidates(&a_key, &b_keys, &claimed);

            let best = candidates
                .into_iter()
                .map(|j| (j, similarity::ratio_chars(&a_key, &b_keys[j])))
                .fold(None, |best: Option<(usize, f64)>, (j, score)| match best {
                    Some((bj, bs)) if bs > score || (bs == score && bj < j) => best,
                    _ => Some((j, score)),
                });

            if let Some((j, score)) = best {
                if score >= self.config.similarity_threshold {
                    claimed[j] = true;
                    matches.push(MatchedMarket {
                        quote_a,
                        quote_b: &venue_b[j],
                        similarity: score,
                    });
                }
            }
        }

        matches
    }

    /// Indices of the unclaimed B quotes worth scoring against `a_key`.
    fn candidates(
        &self,
        a_key: &[char],
        b_keys: &[Vec<char>],
        claimed: &[bool],
    ) -> Vec<usize> {
        let open: Vec<usize> = (0..b_keys.len())
            .filter(|&j| !claimed[j])
            .collect();

        match self.config.max_candidates {
            Some(cap) if open.len() > cap => {
                let mut ranked: Vec<(usize, f64)> = open
                    .into_iter()
                    .map(|j| (j, similarity::quick_ratio_chars(a_key, &b_keys[j])))
                    .collect();
                ranked.sort_by(|(ja, qa), (jb, qb)| qb.total_cmp(qa).then(ja.cmp(jb)));
                ranked.into_iter().take(cap).map(|(j, _)| j).collect()
            }
            _ => open,
        }
    }
}

/// Normalized question characters.
fn match_key(quote: &MarketQuote) -> Vec<char> {
    similarity::normalize(quote.question()).chars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::Venue;

    fn quote(venue: Venue, id: &str, question: &str) -> MarketQuote {
        MarketQuote::new(venue, id, question, Some(0.5), Some(0.5)).unwrap()
    }

    fn matcher() -> Matcher {
        Matcher::new(MatcherConfig::default())
    }

    #[test]
    fn test_matches_similar_titles() {
        let a = vec![quote(Venue::Kalshi, "K1", "Will it rain tomorrow?")];
        let b = vec![
            quote(Venue::Polymarket, "P1", "Election outcome X"),
            quote(Venue::Polymarket, "P2", "Will it rain tomorrow in the city?"),
        ];

        let matches = matcher().match_quotes(&a, &b);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].quote_b.market_id(), "P2");
        assert!((matches[0].similarity - 44.0 / 56.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_below_threshold() {
        let a = vec![quote(Venue::Kalshi, "K1", "Election outcome X")];
        let b = vec![quote(Venue::Polymarket, "P1", "Weather forecast Y")];
        assert!(matcher().match_quotes(&a, &b).is_empty());
    }

    #[test]
    fn test_empty_sides() {
        let a = vec![quote(Venue::Kalshi, "K1", "Will it rain tomorrow?")];
        assert!(matcher().match_quotes(&a, &[]).is_empty());
        assert!(matcher().match_quotes(&[], &a).is_empty());
    }

    #[test]
    fn test_b_quote_claimed_once() {
        let a = vec![
            quote(Venue::Kalshi, "K1", "Will it rain tomorrow?"),
            quote(Venue::Kalshi, "K2", "Will it rain tomorrow?"),
        ];
        let b = vec![quote(Venue::Polymarket, "P1", "Will it rain tomorrow?")];

        let matches = matcher().match_quotes(&a, &b);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].quote_a.market_id(), "K1");
    }

    #[test]
    fn test_second_a_falls_back_to_next_best_b() {
        let a = vec![
            quote(Venue::Kalshi, "K1", "Will it rain tomorrow?"),
            quote(Venue::Kalshi, "K2", "Will it rain tomorrow?"),
        ];
        let b = vec![
            quote(Venue::Polymarket, "P1", "Will it rain tomorrow?"),
            quote(Venue::Polymarket, "P2", "Will it rain tomorrow in the city?"),
        ];

        let matches = matcher().match_quotes(&a, &b);
        let ids: Vec<_> = matches
            .iter()
            .map(|m| (m.quote_a.market_id(), m.quote_b.market_id()))
            .collect();
        assert_eq!(ids, vec![("K1", "P1"), ("K2", "P2")]);
    }

    #[test]
    fn test_ties_go_to_earliest_b() {
        let a = vec![quote(Venue::Kalshi, "K1", "Will it rain tomorrow?")];
        let b = vec![
            quote(Venue::Polymarket, "P1", "will it rain tomorrow?"),
            quote(Venue::Polymarket, "P2", "Will it rain tomorrow?"),
        ];

        let matches = matcher().match_quotes(&a, &b);
        assert_eq!(matches[0].quote_b.market_id(), "P1");
    }

    #[test]
    fn test_repeat_runs_agree() {
        let a = vec![
            quote(Venue::Kalshi, "K1", "Will it rain tomorrow?"),
            quote(Venue::Kalshi, "K2", "Will it rain tomorrow?"),
            quote(Venue::Kalshi, "K3", "Election outcome X"),
        ];
        let b = vec![
            quote(Venue::Polymarket, "P1", "Will it rain tomorrow in the city?"),
            quote(Venue::Polymarket, "P2", "will it rain tomorrow?"),
        ];

        let first = matcher().match_quotes(&a, &b);
        let second = matcher().match_quotes(&a, &b);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_candidate_cap_keeps_best_overlap() {
        let config = MatcherConfig {
            max_candidates: Some(1),
            ..MatcherConfig::default()
        };
        let a = vec![quote(Venue::Kalshi, "K1", "Will it rain tomorrow?")];
        let b = vec![
            quote(Venue::Polymarket, "P1", "Weather forecast Y"),
            quote(Venue::Polymarket, "P2", "Will it rain tomorrow?"),
        ];

        let matches = Matcher::new(config).match_quotes(&a, &b);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].quote_b.market_id(), "P2");
    }

    #[test]
    fn test_zero_candidate_cap_matches_nothing() {
        let config = MatcherConfig {
            max_candidates: Some(0),
            ..MatcherConfig::default()
        };
        let a = vec![quote(Venue::Kalshi, "K1", "Will it rain tomorrow?")];
        let b = vec![quote(Venue::Polymarket, "P1", "Will it rain tomorrow?")];
        assert!(Matcher::new(config).match_quotes(&a, &b).is_empty());
    }
}

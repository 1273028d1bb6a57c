//! Matching Benchmarks — Per-cycle Hot Path
//!
//! Matching is quadratic in the quote counts and dominates cycle CPU
//! time; these benches track the similarity kernel, a full 300x300
//! match (three pages per venue) and the effect of the candidate cap.
//!
//! Run with: cargo bench --bench matching_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use venue_arb_scanner::domain::detector::ArbitrageDetector;
use venue_arb_scanner::domain::matcher::{Matcher, MatcherConfig};
use venue_arb_scanner::domain::quote::{MarketQuote, Venue};
use venue_arb_scanner::domain::similarity;

const SUBJECTS: &[&str] = &[
    "the Fed cut rates",
    "Bitcoin close above $100k",
    "it rain in New York",
    "the Lakers win the title",
    "CPI come in above 3%",
    "turnout exceed 60%",
];

const WHENS: &[&str] = &["in March", "by June", "this week", "in 2025", "before the election"];

/// Deterministic synthetic quote set with varied wording per venue.
fn quotes(venue: Venue, n: usize, phrasing: &str) -> Vec<MarketQuote> {
    (0..n)
        .map(|i| {
            let subject = SUBJECTS[i % SUBJECTS.len()];
            let when = WHENS[(i / SUBJECTS.len()) % WHENS.len()];
            let question = format!("{phrasing} {subject} {when}? (#{i})");
            let yes = 0.05 + (i % 90) as f64 / 100.0;
            MarketQuote::new(venue, format!("{venue}-{i}"), question, Some(yes), Some(1.0 - yes))
                .expect("synthetic quote is valid")
        })
        .collect()
}

/// Benchmark the similarity kernel on a typical title pair.
fn bench_ratio(c: &mut Criterion) {
    let a = "will the fed cut rates in march?";
    let b = "fed rate cut in march 2025?";

    c.bench_function("similarity_ratio_title_pair", |bench| {
        bench.iter(|| similarity::ratio(black_box(a), black_box(b)));
    });
}

/// Benchmark a full uncapped match at three pages per venue.
fn bench_match_full(c: &mut Criterion) {
    let a = quotes(Venue::Kalshi, 300, "Will");
    let b = quotes(Venue::Polymarket, 300, "Does");
    let matcher = Matcher::new(MatcherConfig::default());

    c.bench_function("match_300x300_uncapped", |bench| {
        bench.iter(|| matcher.match_quotes(black_box(&a), black_box(&b)).len());
    });
}

/// Benchmark the same match with a candidate cap.
fn bench_match_capped(c: &mut Criterion) {
    let a = quotes(Venue::Kalshi, 300, "Will");
    let b = quotes(Venue::Polymarket, 300, "Does");
    let matcher = Matcher::new(MatcherConfig {
        max_candidates: Some(25),
        ..MatcherConfig::default()
    });

    c.bench_function("match_300x300_cap_25", |bench| {
        bench.iter(|| matcher.match_quotes(black_box(&a), black_box(&b)).len());
    });
}

/// Benchmark detection over a realistic match set.
fn bench_detect(c: &mut Criterion) {
    let a = quotes(Venue::Kalshi, 300, "Will");
    let b = quotes(Venue::Polymarket, 300, "Will");
    let matches = Matcher::new(MatcherConfig::default()).match_quotes(&a, &b);
    let detector = ArbitrageDetector::default();

    c.bench_function("detect_300_pairs", |bench| {
        bench.iter(|| detector.detect(black_box(&matches)).len());
    });
}

criterion_group!(
    benches,
    bench_ratio,
    bench_match_full,
    bench_match_capped,
    bench_detect
);
criterion_main!(benches);

// Property-based tests for scoring and matching.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use fund_linker::matching::alignment::align;
use fund_linker::{
    BatchMatcher, CandidatePool, CandidateRecord, ExecutionMode, FunnelOptions, MatchingConfig,
    Query, SimilarityScorer, TopN,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn config_64() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Short names over a small alphabet so that strings overlap often
fn name() -> impl Strategy<Value = String> {
    "[abc12 ]{0,12}"
}

fn multiplier() -> impl Strategy<Value = f64> {
    prop_oneof![Just(1.0), Just(3.0), 1.0f64..10.0]
}

fn pool() -> impl Strategy<Value = CandidatePool> {
    prop::collection::vec((name(), name()), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (p, s))| CandidateRecord::new(p, s, i as u64))
            .collect()
    })
}

fn queries() -> impl Strategy<Value = Vec<Query>> {
    prop::collection::vec((name(), name()), 0..8)
        .prop_map(|pairs| pairs.into_iter().map(|(p, s)| Query::new(p, s)).collect())
}

fn matching_config() -> impl Strategy<Value = MatchingConfig> {
    (
        0u32..=100,
        multiplier(),
        prop_oneof![Just(TopN::Unbounded), (1usize..4).prop_map(TopN::Limit)],
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(threshold, digit_multiplier, top_n, quick_comparison, order_irrelevance)| {
                MatchingConfig {
                    valid_threshold: threshold,
                    digit_multiplier,
                    top_n,
                    options: FunnelOptions {
                        quick_comparison,
                        order_irrelevance,
                    },
                }
            },
        )
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn self_score_is_100(a in name(), m in multiplier()) {
        let scorer = SimilarityScorer::new(m).unwrap();
        prop_assert_eq!(scorer.compute_score(&a, &a), 100);
        prop_assert_eq!(scorer.compute_token_sorted_score(&a, &a), 100);
    }

    #[test]
    fn score_is_symmetric(a in name(), b in name(), m in multiplier()) {
        let scorer = SimilarityScorer::new(m).unwrap();
        prop_assert_eq!(scorer.compute_score(&a, &b), scorer.compute_score(&b, &a));
        prop_assert_eq!(
            scorer.compute_token_sorted_score(&a, &b),
            scorer.compute_token_sorted_score(&b, &a)
        );
    }

    #[test]
    fn quick_ratio_bounds_score(a in name(), b in name(), m in multiplier()) {
        let scorer = SimilarityScorer::new(m).unwrap();
        let score = scorer.compute_score(&a, &b);
        prop_assert!(score <= 100);
        prop_assert!(scorer.real_quick_ratio(&a, &b) >= score);
    }

    #[test]
    fn one_empty_side_scores_0(a in "[abc12]{1,12}", m in multiplier()) {
        let scorer = SimilarityScorer::new(m).unwrap();
        prop_assert_eq!(scorer.compute_score(&a, ""), 0);
        prop_assert_eq!(scorer.compute_score("", &a), 0);
    }

    #[test]
    fn word_order_is_ignored_by_token_sorted_score(
        words in prop::collection::vec("[a-z]{1,6}", 1..5),
        m in multiplier(),
    ) {
        let scorer = SimilarityScorer::new(m).unwrap();
        let forward = words.join(" ");
        let backward = words.iter().rev().cloned().collect::<Vec<_>>().join(" ");
        prop_assert_eq!(scorer.compute_token_sorted_score(&forward, &backward), 100);
    }

    #[test]
    fn alignment_blocks_are_ordered_and_equal(a in name(), b in name()) {
        let blocks = align(&a, &b);
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        for block in &blocks {
            prop_assert!(block.len > 0);
            prop_assert_eq!(
                &a_chars[block.a_start..block.a_end()],
                &b_chars[block.b_start..block.b_end()]
            );
        }
        for pair in blocks.windows(2) {
            prop_assert!(pair[0].a_end() <= pair[1].a_start);
            prop_assert!(pair[0].b_end() <= pair[1].b_start);
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_64())]

    #[test]
    fn results_respect_threshold_order_and_top_n(
        pool in pool(),
        queries in queries(),
        config in matching_config(),
    ) {
        let matcher = BatchMatcher::new(config.clone(), ExecutionMode::Sequential).unwrap();
        let results = matcher.map(&queries, &pool).unwrap();
        prop_assert_eq!(results.len(), queries.len());

        for result in results.iter().flatten() {
            prop_assert!(!result.is_empty());
            if let TopN::Limit(n) = config.top_n {
                prop_assert!(result.len() <= n);
            }
            for m in result {
                prop_assert!(u32::from(m.score) >= config.valid_threshold);
                prop_assert!(pool.iter().any(|r| r.id == m.id));
            }
            prop_assert!(result.matches().windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn parallel_matches_sequential(
        pool in pool(),
        queries in queries(),
        config in matching_config(),
        workers in 1usize..4,
    ) {
        let sequential = BatchMatcher::new(config.clone(), ExecutionMode::Sequential).unwrap();
        let parallel = BatchMatcher::new(
            config,
            ExecutionMode::Parallel { workers: Some(workers) },
        )
        .unwrap();

        prop_assert_eq!(
            sequential.map(&queries, &pool).unwrap(),
            parallel.map(&queries, &pool).unwrap()
        );
    }

    // Word sorting collapses runs of whitespace, which the length bound does
    // not account for, so only plain scoring is compared here.
    #[test]
    fn quick_comparison_never_changes_results(
        pool in pool(),
        queries in queries(),
        config in matching_config(),
    ) {
        let with_filter = MatchingConfig {
            options: FunnelOptions { quick_comparison: true, order_irrelevance: false },
            ..config.clone()
        };
        let without_filter = MatchingConfig {
            options: FunnelOptions { quick_comparison: false, order_irrelevance: false },
            ..config
        };

        let a = BatchMatcher::new(with_filter, ExecutionMode::Sequential).unwrap();
        let b = BatchMatcher::new(without_filter, ExecutionMode::Sequential).unwrap();
        prop_assert_eq!(a.map(&queries, &pool).unwrap(), b.map(&queries, &pool).unwrap());
    }
}

//! End-to-end matching tests
//!
//! Exercises the public API the way a caller would: build a pool, configure a
//! matcher, run queries, and check the ranked results.

use fund_linker::orchestration::{Linker, MatchingHorizon};
use fund_linker::parsing::records::{read_candidates, read_queries, ColumnSpec};
use fund_linker::preprocessing::{PreprocessConfig, Preprocessor};
use fund_linker::{
    BatchMatcher, CandidateFunnel, CandidatePool, CandidateRecord, ExecutionMode, FunnelOptions,
    MatchFlag, MatchingConfig, Query, RecordId, SimilarityScorer, TopN,
};

fn config(threshold: u32, order_irrelevance: bool) -> MatchingConfig {
    MatchingConfig {
        valid_threshold: threshold,
        digit_multiplier: 1.0,
        top_n: TopN::Unbounded,
        options: FunnelOptions {
            quick_comparison: true,
            order_irrelevance,
        },
    }
}

#[test]
fn test_identical_record_scores_100() {
    let pool: CandidatePool = vec![CandidateRecord::new("abc fund", "growth", 1u64)]
        .into_iter()
        .collect();
    let funnel = CandidateFunnel::new(&pool, &config(90, false)).unwrap();

    let result = funnel
        .find_matches(&Query::new("abc fund", "growth"))
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.best().unwrap().score, 100);
    assert_eq!(result.best().unwrap().id, RecordId::new("1"));
    assert_eq!(result.best().unwrap().flag.as_str(), "");
}

#[test]
fn test_digit_mismatch_is_penalized() {
    let plain = SimilarityScorer::new(1.0).unwrap();
    let weighted = SimilarityScorer::new(3.0).unwrap();
    assert!(weighted.compute_score("fund 123", "fund 124") < plain.compute_score("fund 123", "fund 124"));

    // Letters are not affected by the multiplier
    assert_eq!(
        weighted.compute_score("fund abc", "fund abd"),
        plain.compute_score("fund abc", "fund abd")
    );
}

#[test]
fn test_word_order_match_is_flagged() {
    let scorer = SimilarityScorer::new(1.0).unwrap();
    assert!(scorer.compute_score("growth high", "high growth") < 90);
    assert_eq!(scorer.compute_token_sorted_score("growth high", "high growth"), 100);

    let pool: CandidatePool = vec![CandidateRecord::new("high growth", "x", 5u64)]
        .into_iter()
        .collect();
    let funnel = CandidateFunnel::new(&pool, &config(90, true)).unwrap();
    let result = funnel.find_matches(&Query::new("growth high", "x")).unwrap();
    assert_eq!(result.best().unwrap().flag, MatchFlag::OrderIrrelevant);
    assert_eq!(result.best().unwrap().flag.to_string(), "OR");
}

#[test]
fn test_empty_pool_yields_no_match_for_every_query() {
    let pool = CandidatePool::default();
    let queries = vec![
        Query::new("abc", "growth"),
        Query::new("", ""),
        Query::new("xyz", "value"),
    ];

    for mode in [
        ExecutionMode::Sequential,
        ExecutionMode::Parallel { workers: Some(2) },
    ] {
        let matcher = BatchMatcher::new(MatchingConfig::default(), mode).unwrap();
        let results = matcher.map(&queries, &pool).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(Option::is_none));
    }
}

#[test]
fn test_quick_comparison_does_not_change_results() {
    let pool: CandidatePool = [
        ("abc", "growth", 1u64),
        ("abc", "growth fund", 2),
        ("abcd", "growth", 3),
        ("abc corp", "income", 4),
    ]
    .into_iter()
    .map(|(p, s, id)| CandidateRecord::new(p, s, id))
    .collect();
    let query = Query::new("abc", "growth");

    let with_filter = config(70, true);
    let without_filter = MatchingConfig {
        options: FunnelOptions {
            quick_comparison: false,
            order_irrelevance: true,
        },
        ..with_filter.clone()
    };

    let a = CandidateFunnel::new(&pool, &with_filter).unwrap().find_matches(&query);
    let b = CandidateFunnel::new(&pool, &without_filter).unwrap().find_matches(&query);
    assert_eq!(a, b);
    assert_eq!(a.unwrap().best().unwrap().id, RecordId::new("1"));
}

#[test]
fn test_results_are_ranked_and_truncated() {
    let pool: CandidatePool = [
        ("abc", "growth 1", 1u64),
        ("abc", "growth", 2),
        ("abc", "growths", 3),
        ("abc", "growth", 4),
    ]
    .into_iter()
    .map(|(p, s, id)| CandidateRecord::new(p, s, id))
    .collect();

    let cfg = MatchingConfig {
        top_n: TopN::Limit(2),
        ..config(80, false)
    };
    let funnel = CandidateFunnel::new(&pool, &cfg).unwrap();
    let result = funnel.find_matches(&Query::new("abc", "growth")).unwrap();

    let ids: Vec<&str> = result.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "4"]);
    assert!(result.iter().all(|m| m.score == 100));
}

#[test]
fn test_link_from_csv() {
    let queries = "id,name\n\
                   q1,Acme Trust : Growth Fund\n\
                   q2,\n\
                   q3,Zeta Capital : Omega\n";
    let candidates = "id,name\n\
                      100,ACME TRUST : GROWTH FUND\n\
                      101,Acme Trust : Income Fund\n";

    let queries = read_queries(queries.as_bytes(), &ColumnSpec::default(), "queries").unwrap();
    let candidates =
        read_candidates(candidates.as_bytes(), &ColumnSpec::default(), "candidates").unwrap();

    let preprocessor = Preprocessor::new(&PreprocessConfig::load_embedded().unwrap()).unwrap();
    let matcher = BatchMatcher::new(
        MatchingConfig::default(),
        ExecutionMode::Parallel { workers: Some(2) },
    )
    .unwrap();
    let linker = Linker::new(preprocessor, matcher, None).unwrap();

    let linked = linker.link(&queries, &candidates).unwrap();
    assert_eq!(linked.len(), 3);
    assert_eq!(linked[0].matches.len(), 1);
    assert_eq!(linked[0].matches[0].id, RecordId::new("100"));
    assert_eq!(linked[0].matches[0].score, 100);
    assert!(!linked[1].is_matched());
    assert!(!linked[2].is_matched());
}

#[test]
fn test_link_with_matching_horizon() {
    let queries = "id,name,date\n\
                   q1,Acme : Growth,2004-06-30\n\
                   q2,Acme : Growth,2006-01-31\n";
    let candidates = "id,name,date\n\
                      1,Acme : Growth,20031031\n\
                      2,Acme : Growth,20050430\n";
    let columns = ColumnSpec {
        date: Some("date".to_string()),
        ..ColumnSpec::default()
    };

    let queries = read_queries(queries.as_bytes(), &columns, "queries").unwrap();
    let candidates = read_candidates(candidates.as_bytes(), &columns, "candidates").unwrap();

    let preprocessor = Preprocessor::new(&PreprocessConfig::default()).unwrap();
    let matcher = BatchMatcher::new(MatchingConfig::default(), ExecutionMode::Sequential).unwrap();
    let linker = Linker::new(preprocessor, matcher, Some(MatchingHorizon::default())).unwrap();

    let linked = linker.link(&queries, &candidates).unwrap();
    let ids = |i: usize| -> Vec<String> {
        linked[i].matches.iter().map(|m| m.id.to_string()).collect()
    };
    // 2003/10 is eight months before 2004/06
    assert_eq!(ids(0), vec!["1"]);
    // 2005/04 is nine months before 2006/01
    assert!(ids(1).is_empty());
}

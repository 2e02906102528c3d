mod common;

use std::sync::atomic::Ordering::SeqCst;
use std::sync::Arc;
use std::time::Duration;

use common::{scheduler, url_for, MockGenerator, MockSearch};
use research_core::{ResearchError, ResearchFrontierResult};
use research_engine::{ResearchEvent, ResearchScheduler, SchedulerConfig};

fn prior() -> ResearchFrontierResult {
    let mut prior = ResearchFrontierResult::default();
    prior.learnings.insert("prior learning".to_string());
    prior.visited_urls.insert("https://prior.example.org".to_string());
    prior
}

#[tokio::test]
async fn test_depth_one_runs_one_search_per_query() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::new());

    let result = scheduler(&generator, &search, 4)
        .research("solid state batteries", 3, 1)
        .await
        .unwrap();

    assert_eq!(search.calls(), 3);
    assert_eq!(generator.expansion_calls.load(SeqCst), 1);
    assert_eq!(
        result.learnings_vec(),
        vec!["fact about q0-0", "fact about q0-1", "fact about q0-2"]
    );
    assert_eq!(
        result.visited_urls_vec(),
        vec![url_for("q0-0"), url_for("q0-1"), url_for("q0-2")]
    );
}

#[tokio::test]
async fn test_inherited_results_are_kept() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::new());

    let result = scheduler(&generator, &search, 4)
        .research_from("topic", 2, 1, prior())
        .await
        .unwrap();

    assert!(result.learnings.contains("prior learning"));
    assert!(result.visited_urls.contains("https://prior.example.org"));
    assert_eq!(result.learnings.len(), 3);
    assert_eq!(result.visited_urls.len(), 3);
}

#[tokio::test]
async fn test_merged_results_have_no_duplicates() {
    let generator = Arc::new(MockGenerator {
        shared_learning: Some("common knowledge".to_string()),
        ..Default::default()
    });
    let search = Arc::new(MockSearch {
        shared_url: Some("https://example.com/shared"),
        ..MockSearch::new()
    });

    let result = scheduler(&generator, &search, 4)
        .research("topic", 4, 2)
        .await
        .unwrap();

    // 4 first-level branches, each recursing with breadth 2
    assert_eq!(search.calls(), 4 + 4 * 2);
    assert_eq!(
        result.learnings.iter().filter(|l| *l == "common knowledge").count(),
        1
    );
    assert_eq!(
        result
            .visited_urls
            .iter()
            .filter(|u| *u == "https://example.com/shared")
            .count(),
        1
    );
    // one unique learning and URL per search, plus the shared one
    assert_eq!(result.learnings.len(), 12 + 1);
    assert_eq!(result.visited_urls.len(), 12 + 1);
}

#[tokio::test]
async fn test_recursion_halves_breadth_and_carries_context() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::new());

    let result = scheduler(&generator, &search, 4)
        .research("topic", 2, 2)
        .await
        .unwrap();

    // 2 branches at depth 2, each recursing with breadth ceil(2 / 2) = 1
    assert_eq!(search.calls(), 4);
    assert_eq!(generator.expansion_calls.load(SeqCst), 3);
    assert_eq!(generator.extraction_calls.load(SeqCst), 4);
    assert_eq!(result.learnings.len(), 4);
    assert_eq!(result.visited_urls.len(), 4);

    let nested: Vec<String> = generator
        .expansion_prompts()
        .into_iter()
        .filter(|p| p.contains("Previous research goal:"))
        .collect();
    assert_eq!(nested.len(), 2);
    for prompt in &nested {
        assert!(prompt.contains("Follow-up research directions:"));
        assert!(prompt.contains("what next after q0-"));
        assert!(prompt.contains("learnings from previous research"));
    }
}

#[tokio::test]
async fn test_branch_without_content_contributes_only_inherited() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        empty_on: Some("q0-1"),
        ..MockSearch::new()
    });

    let result = scheduler(&generator, &search, 4)
        .research_from("topic", 3, 2, prior())
        .await
        .unwrap();

    // the empty branch neither extracts nor recurses
    assert_eq!(generator.expansion_calls.load(SeqCst), 1 + 2);
    assert!(!result.visited_urls.contains(&url_for("q0-1")));
    assert!(!result.learnings.contains("fact about q0-1"));
    assert!(result.learnings.contains("fact about q0-0"));
    assert!(result.learnings.contains("fact about q0-2"));
    assert!(result.learnings.contains("prior learning"));
    assert!(result.visited_urls.contains("https://prior.example.org"));
}

#[tokio::test]
async fn test_failing_branch_is_isolated() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        fail_on: Some("q0-1"),
        ..MockSearch::new()
    });
    let scheduler = scheduler(&generator, &search, 4);
    let mut events = scheduler.subscribe();

    let result = scheduler.research("topic", 3, 1).await.unwrap();

    assert_eq!(
        result.learnings_vec(),
        vec!["fact about q0-0", "fact about q0-2"]
    );
    assert!(!result.visited_urls.contains(&url_for("q0-1")));

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(received.len(), 4);
    assert!(matches!(
        &received[0],
        ResearchEvent::QueriesPlanned { depth: 1, breadth: 3, queries } if queries.len() == 3
    ));
    assert!(matches!(
        &received[1],
        ResearchEvent::BranchCompleted { query, learnings: 1, visited_urls: 1, .. } if query == "q0-0"
    ));
    assert!(matches!(
        &received[2],
        ResearchEvent::BranchFailed { query, error, .. }
            if query == "q0-1" && error.contains("connection reset")
    ));
    assert!(matches!(
        &received[3],
        ResearchEvent::BranchCompleted { query, .. } if query == "q0-2"
    ));
}

#[tokio::test]
async fn test_sibling_branches_respect_concurrency_limit() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        delay: Duration::from_millis(20),
        ..MockSearch::new()
    });

    let result = scheduler(&generator, &search, 2)
        .research("topic", 8, 1)
        .await
        .unwrap();

    assert_eq!(search.calls(), 8);
    assert_eq!(search.max_in_flight(), 2);
    assert_eq!(result.learnings.len(), 8);
}

#[tokio::test]
async fn test_budgets_are_scoped_per_level() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        delay: Duration::from_millis(50),
        ..MockSearch::new()
    });

    scheduler(&generator, &search, 2)
        .research("topic", 4, 2)
        .await
        .unwrap();

    // Two running first-level branches each open a fresh budget of 2 below them
    assert_eq!(search.calls(), 4 + 4 * 2);
    assert!(search.max_in_flight() > 2);
    assert!(search.max_in_flight() <= 4);
}

#[tokio::test]
async fn test_unconfigured_search_returns_inherited() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        configured: false,
        ..MockSearch::new()
    });

    let result = scheduler(&generator, &search, 4)
        .research_from("topic", 3, 2, prior())
        .await
        .unwrap();

    assert_eq!(result, prior());
    assert_eq!(generator.total_calls(), 0);
    assert_eq!(search.calls(), 0);
}

#[tokio::test]
async fn test_expansion_failure_returns_inherited() {
    let generator = Arc::new(MockGenerator {
        fail_expansion: true,
        ..Default::default()
    });
    let search = Arc::new(MockSearch::new());

    let result = scheduler(&generator, &search, 4)
        .research_from("topic", 3, 2, prior())
        .await
        .unwrap();

    assert_eq!(result, prior());
    assert_eq!(search.calls(), 0);
}

#[tokio::test]
async fn test_zero_breadth_or_depth_is_rejected() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::new());
    let scheduler = scheduler(&generator, &search, 4);

    assert!(matches!(
        scheduler.research("topic", 0, 2).await,
        Err(ResearchError::InvalidInput(_))
    ));
    assert!(matches!(
        scheduler.research("topic", 2, 0).await,
        Err(ResearchError::InvalidInput(_))
    ));
    assert_eq!(generator.total_calls(), 0);
}

#[tokio::test]
async fn test_requested_depth_is_clamped() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::new());
    let config = SchedulerConfig {
        max_depth: 1,
        ..SchedulerConfig::default()
    };
    let scheduler = ResearchScheduler::new(generator.clone(), search.clone(), config);

    assert_eq!(scheduler.config().max_depth, 1);
    scheduler.research("topic", 2, 5).await.unwrap();

    assert_eq!(search.calls(), 2);
}

#[tokio::test]
async fn test_object_learnings_are_flattened() {
    let generator = Arc::new(MockGenerator {
        object_learnings: true,
        ..Default::default()
    });
    let search = Arc::new(MockSearch::new());

    let result = scheduler(&generator, &search, 4)
        .research("topic", 1, 1)
        .await
        .unwrap();

    assert_eq!(result.learnings_vec(), vec!["q0-0: detail"]);
}

#[tokio::test]
async fn test_drifted_nested_expansion_keeps_branch_results() {
    let generator = Arc::new(MockGenerator {
        drift_nested_expansion: true,
        ..Default::default()
    });
    let search = Arc::new(MockSearch::new());

    let result = scheduler(&generator, &search, 4)
        .research("topic", 2, 2)
        .await
        .unwrap();

    // no second-level searches, but first-level results survive
    assert_eq!(search.calls(), 2);
    assert_eq!(
        result.learnings_vec(),
        vec!["fact about q0-0", "fact about q0-1"]
    );
    assert_eq!(
        result.visited_urls_vec(),
        vec![url_for("q0-0"), url_for("q0-1")]
    );
}

#[tokio::test]
async fn test_panicking_branch_is_isolated() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        panic_on: Some("q0-1"),
        ..MockSearch::new()
    });
    let scheduler = scheduler(&generator, &search, 4);
    let mut events = scheduler.subscribe();

    let result = scheduler.research("topic", 3, 1).await.unwrap();

    assert_eq!(
        result.learnings_vec(),
        vec!["fact about q0-0", "fact about q0-2"]
    );

    let mut failed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ResearchEvent::BranchFailed { query, error, .. } = event {
            failed.push((query, error));
        }
    }
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "q0-1");
    assert!(failed[0].1.contains("branch task aborted"));
}

#[tokio::test]
async fn test_extraction_failure_is_isolated() {
    let generator = Arc::new(MockGenerator {
        fail_extraction_on: Some("q0-1"),
        ..Default::default()
    });
    let search = Arc::new(MockSearch::new());
    let scheduler = scheduler(&generator, &search, 4);
    let mut events = scheduler.subscribe();

    let result = scheduler.research_from("topic", 3, 1, prior()).await.unwrap();

    assert_eq!(search.calls(), 3);
    assert!(!result.learnings.contains("fact about q0-1"));
    assert!(!result.visited_urls.contains(&url_for("q0-1")));
    assert!(result.learnings.contains("fact about q0-0"));
    assert!(result.learnings.contains("fact about q0-2"));
    assert!(result.learnings.contains("prior learning"));

    let failed: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event, ResearchEvent::BranchFailed { query, .. } if query == "q0-1"))
        .collect();
    assert_eq!(failed.len(), 1);
}

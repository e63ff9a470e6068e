use std::collections::HashSet;

use serde_json::json;

use jobsift_core::{CompensationInterval, DispatchOutcome, Dispatcher, ErrorKind, JobType, Site};

use crate::common::{BoardScraper, postings, registry_with};

fn board_dispatcher() -> Dispatcher {
    Dispatcher::new(registry_with(vec![BoardScraper::new(
        Site::JsJobbs,
        postings(),
    )]))
}

fn report(outcome: DispatchOutcome) -> jobsift_core::dispatch::ScrapeReport {
    match outcome {
        DispatchOutcome::Success(report) => report,
        DispatchOutcome::Failure(failure) => panic!("unexpected failure: {failure:?}"),
    }
}

#[tokio::test]
async fn duplicate_apply_urls_are_collapsed() {
    let report = report(board_dispatcher().run(&json!({"source": "jsjobbs"})).await);

    assert_eq!(report.total_count, 4);
    let urls: HashSet<_> = report.listings.iter().map(|l| l.job_url.as_str()).collect();
    assert_eq!(urls.len(), report.listings.len());
    assert_eq!(report.listings[0].title, "Rust Engineer");
}

#[tokio::test]
async fn search_filter_runs_before_windowing() {
    let report = report(
        board_dispatcher()
            .run(&json!({
                "source": "jsjobbs",
                "search_term": "  FERRIC ",
                "offset": 1,
                "results_wanted": 5,
            }))
            .await,
    );

    assert_eq!(report.total_count, 1);
    assert_eq!(report.listings[0].title, "Data Engineer");
    assert_eq!(report.config_used.search_term.as_deref(), Some("FERRIC"));
}

#[tokio::test]
async fn results_wanted_bounds_the_output() {
    let report = report(
        board_dispatcher()
            .run(&json!({"source": ["jsjobbs"], "results_wanted": "2"}))
            .await,
    );
    assert_eq!(report.total_count, 2);
    assert_eq!(report.listings[1].title, "Frontend Developer");
}

#[tokio::test]
async fn job_type_and_remote_filters_apply() {
    let dispatcher = board_dispatcher();

    let contract = report(
        dispatcher
            .run(&json!({"source": "jsjobbs", "job_type": "contract"}))
            .await,
    );
    assert_eq!(contract.total_count, 1);
    assert_eq!(contract.listings[0].job_types, vec![JobType::Contract]);

    let remote = report(
        dispatcher
            .run(&json!({"source": "jsjobbs", "is_remote": "yes"}))
            .await,
    );
    assert_eq!(remote.total_count, 1);
    assert!(remote.listings[0].is_remote);
    assert_eq!(
        remote.listings[0].emails.as_deref(),
        Some(&["jobs@board.test".to_string()][..])
    );
}

#[tokio::test]
async fn sequential_runs_do_not_share_dedup_state() {
    let dispatcher = board_dispatcher();
    let config = json!({"source": "jsjobbs", "results_wanted": 1});

    let first = report(dispatcher.run(&config).await);
    let second = report(dispatcher.run(&config).await);

    assert_eq!(first.listings.len(), 1);
    assert_eq!(second.listings.len(), 1);
    assert_eq!(first.listings[0].job_url, second.listings[0].job_url);
}

#[tokio::test]
async fn salary_units_follow_the_annual_toggle() {
    let dispatcher = board_dispatcher();

    let raw = report(
        dispatcher
            .run(&json!({"source": "jsjobbs", "search_term": "gopher"}))
            .await,
    );
    let comp = raw.listings[0].compensation.clone().unwrap();
    assert_eq!(comp.interval, CompensationInterval::Hourly);
    assert_eq!(comp.min_amount, Some(40.0));

    let annual = report(
        dispatcher
            .run(&json!({
                "source": "jsjobbs",
                "search_term": "gopher",
                "enforce_annual_salary": true,
            }))
            .await,
    );
    let comp = annual.listings[0].compensation.clone().unwrap();
    assert_eq!(comp.interval, CompensationInterval::Yearly);
    assert_eq!(comp.min_amount, Some(83_200.0));
    assert_eq!(comp.max_amount, Some(124_800.0));
}

#[tokio::test]
async fn empty_result_from_block_prone_site_is_flagged() {
    let dispatcher = Dispatcher::new(registry_with(vec![
        BoardScraper::new(Site::JsJobbs, postings()).block_prone(),
        BoardScraper::new(Site::ProductHunt, postings()),
    ]));

    let blocked = dispatcher
        .run(&json!({"source": "jsjobbs", "search_term": "cobol"}))
        .await;
    assert_eq!(blocked.error_kind(), Some(ErrorKind::SiteBlocking));
    assert_eq!(blocked.http_status(), 503);

    let no_matches = dispatcher
        .run(&json!({"source": "producthunt", "search_term": "cobol"}))
        .await;
    assert!(no_matches.is_success());
    assert_eq!(no_matches.http_status(), 200);
}

#[tokio::test]
async fn invalid_config_never_reaches_adapters() {
    let scraper = BoardScraper::new(Site::JsJobbs, postings());
    let calls = scraper.calls.clone();
    let dispatcher = Dispatcher::new(registry_with(vec![scraper]));

    let outcome = dispatcher
        .run(&json!({"source": ["jsjobbs", "monster"], "distance": 500}))
        .await;
    let DispatchOutcome::Failure(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.error_kind, ErrorKind::ValidationError);
    assert_eq!(failure.validation_errors.len(), 2);
    assert!(failure.validation_errors[0].contains("monster"));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn outcome_serializes_for_the_boundary() {
    let outcome = board_dispatcher()
        .run(&json!({"source": "jsjobbs", "results_wanted": 1, "description_format": "plain"}))
        .await;
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["total_count"], json!(1));
    assert_eq!(value["listings"][0]["site"], json!("jsjobbs"));
    assert_eq!(value["config_used"]["description_format"], json!("plain"));
    assert!(
        !value["listings"][0]["description"]
            .as_str()
            .unwrap()
            .contains("<p>")
    );
}

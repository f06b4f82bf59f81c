//! Stage-level behaviour of PipelineService.

mod common;

use std::sync::Arc;

use rstest::rstest;

use common::{RecordingSink, RecordingSleeper};
use oncodemo::application::services::PipelineService;
use oncodemo::config::DelayConfig;
use oncodemo::domain::catalog::{self, EXAMPLE_DATASET_ID};
use oncodemo::domain::validation::parse_dataset_ref;
use oncodemo::domain::{Criterion, DatasetRef, MaxDepth, PipelineState, TrainConfig};
use oncodemo::util::testing;

fn service() -> (PipelineService, Arc<RecordingSleeper>, Arc<RecordingSink>) {
    testing::init_test_setup();
    let sleeper = Arc::new(RecordingSleeper::default());
    let sink = Arc::new(RecordingSink::default());
    let svc = PipelineService::new(sleeper.clone(), sink.clone(), DelayConfig { scale: 0.0 });
    (svc, sleeper, sink)
}

fn config(dataset: &str, train_size: u32) -> TrainConfig {
    TrainConfig {
        dataset_url: parse_dataset_ref(dataset).unwrap(),
        train_size,
        criterion: Criterion::Gini,
        max_depth: MaxDepth(None),
        min_samples_split: 2,
        min_samples_leaf: 1,
    }
}

#[rstest]
#[case(EXAMPLE_DATASET_ID, 60)]
#[case(EXAMPLE_DATASET_ID, 75)]
#[case(EXAMPLE_DATASET_ID, 90)]
#[case("https://example.org/data.csv", 67)]
#[case("https://example.org/data.csv", 83)]
fn given_split_percent_when_running_then_train_and_test_add_up_to_samples(
    #[case] dataset: &str,
    #[case] train_size: u32,
) {
    let (svc, _, _) = service();

    let output = svc.run(&config(dataset, train_size)).unwrap();

    assert_eq!(
        output.data.train_samples + output.data.test_samples,
        output.dataset.samples
    );
    assert_eq!(output.data.features, output.dataset.features);
}

#[test]
fn given_same_dataset_when_invoking_stages_twice_then_results_match() {
    let (svc, _, _) = service();
    let dataset_ref = DatasetRef::Catalog(EXAMPLE_DATASET_ID.into());
    let cfg = config(EXAMPLE_DATASET_ID, 80);

    let first = svc.load_dataset(&dataset_ref).unwrap();
    let second = svc.load_dataset(&dataset_ref).unwrap();
    assert_eq!(first, second);

    assert_eq!(
        svc.prepare_data(&first, 80).unwrap(),
        svc.prepare_data(&second, 80).unwrap()
    );

    let model_a = svc.train_model(&cfg).unwrap();
    let model_b = svc.train_model(&cfg).unwrap();
    assert_eq!(model_a, model_b);

    let mut eval_a = svc.evaluate_model(&model_a).unwrap();
    let mut eval_b = svc.evaluate_model(&model_b).unwrap();
    eval_a.timestamp.clear();
    eval_b.timestamp.clear();
    assert_eq!(eval_a, eval_b);
}

#[test]
fn given_example_dataset_when_evaluating_then_reference_confusion_matrix() {
    let (svc, _, _) = service();

    let output = svc.run(&config(EXAMPLE_DATASET_ID, 80)).unwrap();

    assert_eq!(output.results.confusion_matrix, [[72, 0], [5, 37]]);
    assert_eq!(output.results.feature_importance, catalog::reference_feature_importance());
    assert_eq!(output.results.evaluation_time, "1.2s");
    assert!(chrono::DateTime::parse_from_rfc3339(&output.results.timestamp).is_ok());
}

#[test]
fn given_run_when_finished_then_logs_each_stage_in_order() {
    let (svc, sleeper, sink) = service();

    svc.run(&config(EXAMPLE_DATASET_ID, 80)).unwrap();

    assert_eq!(
        sink.messages(),
        vec![
            "Loading dataset...",
            "Dataset loaded",
            "Preparing data for training...",
            "Data prepared",
            "Training model...",
            "Optimizing hyperparameters...",
            "Running cross-validation...",
            "Model trained",
            "Evaluating model performance...",
            "Evaluation complete",
        ]
    );
    assert_eq!(sleeper.count(), 7);
}

#[test]
fn given_unbounded_depth_when_training_then_parameters_report_none() {
    let (svc, _, _) = service();

    let model = svc.train_model(&config(EXAMPLE_DATASET_ID, 80)).unwrap();

    assert_eq!(model.parameters.max_depth, None);
    assert_eq!(model.cross_validation_score, Some(94.7));
    let json = serde_json::to_value(&model).unwrap();
    assert!(json["parameters"]["maxDepth"].is_null());
}

#[test]
fn given_failed_run_when_reset_then_idle_again() {
    let (svc, _, _) = service();

    assert!(svc.run(&config("404", 80)).is_err());
    assert_eq!(svc.state(), PipelineState::Error);

    svc.reset().unwrap();
    assert_eq!(svc.state(), PipelineState::Idle);
}

#[test]
fn given_custom_url_when_loading_then_custom_descriptor() {
    let (svc, sleeper, _) = service();

    let dataset = svc
        .load_dataset(&parse_dataset_ref("https://example.org/data.csv").unwrap())
        .unwrap();

    assert_eq!(dataset, catalog::custom_dataset());
    assert_eq!(sleeper.count(), 2);
}

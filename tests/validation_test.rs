//! Form validation rules, field by field.

use rstest::rstest;

use oncodemo::domain::form::{
    FIELD_CRITERION, FIELD_DATASET_URL, FIELD_MAX_DEPTH, FIELD_MIN_SAMPLES_LEAF,
    FIELD_MIN_SAMPLES_SPLIT, FIELD_TRAIN_SIZE,
};
use oncodemo::domain::validation::{to_train_config, validate_field, validate_form};
use oncodemo::domain::{DatasetRef, DomainError, FieldStatus, FormInput, FormOverrides, MaxDepth};

fn form_with(field: &str, value: &str) -> FormInput {
    let mut form = FormInput::preset();
    match field {
        FIELD_DATASET_URL => form.dataset_url = value.into(),
        FIELD_TRAIN_SIZE => form.train_size = value.into(),
        FIELD_CRITERION => form.criterion = value.into(),
        FIELD_MAX_DEPTH => form.max_depth = value.into(),
        FIELD_MIN_SAMPLES_SPLIT => form.min_samples_split = value.into(),
        FIELD_MIN_SAMPLES_LEAF => form.min_samples_leaf = value.into(),
        other => panic!("unknown field {other}"),
    }
    form
}

#[rstest]
#[case(FIELD_DATASET_URL, "17", true)]
#[case(FIELD_DATASET_URL, "https://archive.ics.uci.edu/dataset/17", true)]
#[case(FIELD_DATASET_URL, "abc", false)]
#[case(FIELD_DATASET_URL, "", false)]
#[case(FIELD_DATASET_URL, "   ", false)]
#[case(FIELD_TRAIN_SIZE, "59", false)]
#[case(FIELD_TRAIN_SIZE, "60", true)]
#[case(FIELD_TRAIN_SIZE, "90", true)]
#[case(FIELD_TRAIN_SIZE, "91", false)]
#[case(FIELD_TRAIN_SIZE, "abc", false)]
#[case(FIELD_TRAIN_SIZE, "75.5", false)]
#[case(FIELD_CRITERION, "gini", true)]
#[case(FIELD_CRITERION, "entropy", true)]
#[case(FIELD_CRITERION, "log_loss", false)]
#[case(FIELD_MAX_DEPTH, "None", true)]
#[case(FIELD_MAX_DEPTH, "0", false)]
#[case(FIELD_MAX_DEPTH, "3", true)]
#[case(FIELD_MAX_DEPTH, "-1", false)]
#[case(FIELD_MIN_SAMPLES_SPLIT, "0", false)]
#[case(FIELD_MIN_SAMPLES_SPLIT, "1", true)]
#[case(FIELD_MIN_SAMPLES_SPLIT, "1.5", false)]
#[case(FIELD_MIN_SAMPLES_LEAF, "0", false)]
#[case(FIELD_MIN_SAMPLES_LEAF, "2", true)]
#[case(FIELD_MIN_SAMPLES_LEAF, "x", false)]
fn given_field_value_when_validating_then_expected_outcome(
    #[case] field: &str,
    #[case] value: &str,
    #[case] valid: bool,
) {
    let status = validate_field(&form_with(field, value), field);

    assert_eq!(status == FieldStatus::Success, valid, "{field}={value:?}: {status:?}");
}

#[test]
fn given_all_digit_id_outside_catalog_when_validating_then_passes() {
    let config = to_train_config(&form_with(FIELD_DATASET_URL, "999")).unwrap();

    assert_eq!(config.dataset_url, DatasetRef::Catalog("999".into()));
}

#[test]
fn given_several_bad_fields_when_converting_then_reports_all_of_them() {
    let form = FormInput::preset().overlay(FormOverrides {
        train_size: Some("95".into()),
        criterion: Some("log_loss".into()),
        max_depth: Some("0".into()),
        ..FormOverrides::default()
    });

    let err = to_train_config(&form).unwrap_err();

    let DomainError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, [FIELD_TRAIN_SIZE, FIELD_CRITERION, FIELD_MAX_DEPTH]);
    assert_eq!(errors[0].message, "value must be between 60% and 90%");
}

#[test]
fn given_unbounded_depth_when_converting_then_max_depth_is_none() {
    let config = to_train_config(&form_with(FIELD_MAX_DEPTH, "None")).unwrap();

    assert_eq!(config.max_depth, MaxDepth(None));
}

#[test]
fn given_preset_when_validating_then_report_lists_every_field_in_order() {
    let report = validate_form(&FormInput::preset());

    let names: Vec<_> = report.fields.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        [
            FIELD_DATASET_URL,
            FIELD_TRAIN_SIZE,
            FIELD_CRITERION,
            FIELD_MAX_DEPTH,
            FIELD_MIN_SAMPLES_SPLIT,
            FIELD_MIN_SAMPLES_LEAF,
        ]
    );
    assert!(report.is_valid());
}

// ============================================================
// preview
// ============================================================

#[rstest]
#[case("17", "Breast Cancer Wisconsin")]
#[case("https://example.org/breast-cancer.csv", "Breast Cancer Wisconsin")]
#[case("https://example.org/iris.csv", "Custom dataset")]
#[case("", "Not configured")]
fn given_dataset_when_previewing_then_dataset_label(#[case] dataset: &str, #[case] expected: &str) {
    let preview = form_with(FIELD_DATASET_URL, dataset).preview();

    assert_eq!(preview.dataset, expected);
}

#[rstest]
#[case("80", "80% / 20%")]
#[case("65", "65% / 35%")]
#[case("abc", "-")]
fn given_train_size_when_previewing_then_split_label(#[case] size: &str, #[case] expected: &str) {
    let preview = form_with(FIELD_TRAIN_SIZE, size).preview();

    assert_eq!(preview.split, expected);
}

#[test]
fn given_criterion_when_previewing_then_capitalized() {
    assert_eq!(form_with(FIELD_CRITERION, "gini").preview().criterion, "Gini");
    assert_eq!(form_with(FIELD_CRITERION, "").preview().criterion, "Entropy");
}

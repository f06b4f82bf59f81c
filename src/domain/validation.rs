//! Regex-based validation of the configuration form.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::form::{
    FormInput, FIELDS, FIELD_CRITERION, FIELD_DATASET_URL, FIELD_MAX_DEPTH,
    FIELD_MIN_SAMPLES_LEAF, FIELD_MIN_SAMPLES_SPLIT, FIELD_TRAIN_SIZE,
};
use crate::domain::{Criterion, DatasetRef, DomainError, DomainResult, MaxDepth, TrainConfig};

pub const MIN_TRAIN_SIZE: u32 = 60;
pub const MAX_TRAIN_SIZE: u32 = 90;

const MSG_DATASET_REQUIRED: &str = "dataset identifier is required";
const MSG_DATASET_FORMAT: &str = "enter a UCI id (e.g. 17) or a valid URL";
const MSG_TRAIN_SIZE: &str = "value must be between 60% and 90%";
const MSG_POSITIVE: &str = "enter a valid number greater than 0";
const MSG_MAX_DEPTH: &str = "enter a depth greater than 0 or None";
const MSG_CRITERION: &str = "criterion must be gini or entropy";

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"^[0-9]+$").expect("static regex"))
}

/// Inline error attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome for one field: success styling or an inline error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum FieldStatus {
    Success,
    Error(String),
}

/// Per-field validation outcome of a whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub fields: Vec<(String, FieldStatus)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.fields
            .iter()
            .all(|(_, status)| *status == FieldStatus::Success)
    }

    pub fn status(&self, field: &str) -> Option<&FieldStatus> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, status)| status)
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.fields
            .iter()
            .filter_map(|(field, status)| match status {
                FieldStatus::Error(message) => Some(FieldError {
                    field: field.clone(),
                    message: message.clone(),
                }),
                FieldStatus::Success => None,
            })
            .collect()
    }
}

/// Parse a dataset identifier: all digits is a catalog id, otherwise it must be a URL.
pub fn parse_dataset_ref(raw: &str) -> Result<DatasetRef, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(MSG_DATASET_REQUIRED.into());
    }
    if digits().is_match(value) {
        return Ok(DatasetRef::Catalog(value.into()));
    }
    url::Url::parse(value)
        .map(DatasetRef::Url)
        .map_err(|_| MSG_DATASET_FORMAT.into())
}

pub fn parse_train_size(raw: &str) -> Result<u32, String> {
    let value = raw.trim();
    if !digits().is_match(value) {
        return Err(MSG_TRAIN_SIZE.into());
    }
    match value.parse::<u32>() {
        Ok(n) if (MIN_TRAIN_SIZE..=MAX_TRAIN_SIZE).contains(&n) => Ok(n),
        _ => Err(MSG_TRAIN_SIZE.into()),
    }
}

pub fn parse_positive(raw: &str) -> Result<u32, String> {
    let value = raw.trim();
    if !digits().is_match(value) {
        return Err(MSG_POSITIVE.into());
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(MSG_POSITIVE.into()),
    }
}

pub fn parse_max_depth(raw: &str) -> Result<MaxDepth, String> {
    let value = raw.trim();
    if value == "None" {
        return Ok(MaxDepth(None));
    }
    parse_positive(value)
        .map(|n| MaxDepth(Some(n)))
        .map_err(|_| MSG_MAX_DEPTH.into())
}

pub fn parse_criterion(raw: &str) -> Result<Criterion, String> {
    raw.parse::<Criterion>().map_err(|_| MSG_CRITERION.into())
}

fn status_of<T>(result: &Result<T, String>) -> FieldStatus {
    match result {
        Ok(_) => FieldStatus::Success,
        Err(message) => FieldStatus::Error(message.clone()),
    }
}

/// Validate a single field by name.
pub fn validate_field(form: &FormInput, field: &str) -> FieldStatus {
    match field {
        FIELD_DATASET_URL => status_of(&parse_dataset_ref(&form.dataset_url)),
        FIELD_TRAIN_SIZE => status_of(&parse_train_size(&form.train_size)),
        FIELD_CRITERION => status_of(&parse_criterion(&form.criterion)),
        FIELD_MAX_DEPTH => status_of(&parse_max_depth(&form.max_depth)),
        FIELD_MIN_SAMPLES_SPLIT => status_of(&parse_positive(&form.min_samples_split)),
        FIELD_MIN_SAMPLES_LEAF => status_of(&parse_positive(&form.min_samples_leaf)),
        other => FieldStatus::Error(format!("unknown field: {other}")),
    }
}

/// Validate every field of the form.
pub fn validate_form(form: &FormInput) -> ValidationReport {
    ValidationReport {
        fields: FIELDS
            .iter()
            .map(|field| (field.to_string(), validate_field(form, field)))
            .collect(),
    }
}

/// Validate the form and build the training request.
///
/// All field errors are reported together; no partial config is returned.
pub fn to_train_config(form: &FormInput) -> DomainResult<TrainConfig> {
    let report = validate_form(form);
    if !report.is_valid() {
        return Err(DomainError::Validation(report.errors()));
    }

    let invalid = |field: &str, value: &str| DomainError::InvalidValue {
        field: field.into(),
        value: value.into(),
    };

    Ok(TrainConfig {
        dataset_url: parse_dataset_ref(&form.dataset_url)
            .map_err(|_| invalid(FIELD_DATASET_URL, &form.dataset_url))?,
        train_size: parse_train_size(&form.train_size)
            .map_err(|_| invalid(FIELD_TRAIN_SIZE, &form.train_size))?,
        criterion: parse_criterion(&form.criterion)
            .map_err(|_| invalid(FIELD_CRITERION, &form.criterion))?,
        max_depth: parse_max_depth(&form.max_depth)
            .map_err(|_| invalid(FIELD_MAX_DEPTH, &form.max_depth))?,
        min_samples_split: parse_positive(&form.min_samples_split)
            .map_err(|_| invalid(FIELD_MIN_SAMPLES_SPLIT, &form.min_samples_split))?,
        min_samples_leaf: parse_positive(&form.min_samples_leaf)
            .map_err(|_| invalid(FIELD_MIN_SAMPLES_LEAF, &form.min_samples_leaf))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_preset_when_validating_then_all_fields_succeed() {
        let report = validate_form(&FormInput::preset());
        assert!(report.is_valid(), "{:?}", report.errors());
        assert_eq!(report.fields.len(), FIELDS.len());
    }

    #[test]
    fn given_preset_when_converting_then_builds_config() {
        let config = to_train_config(&FormInput::preset()).unwrap();
        assert_eq!(config.dataset_url, DatasetRef::Catalog("17".into()));
        assert_eq!(config.train_size, 80);
        assert_eq!(config.max_depth, MaxDepth(Some(7)));
        assert_eq!(config.criterion, Criterion::Entropy);
    }

    #[test]
    fn given_two_bad_fields_when_converting_then_reports_both() {
        let form = FormInput {
            dataset_url: "not a dataset".into(),
            train_size: "95".into(),
            ..FormInput::preset()
        };
        match to_train_config(&form) {
            Err(DomainError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec![FIELD_DATASET_URL, FIELD_TRAIN_SIZE]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

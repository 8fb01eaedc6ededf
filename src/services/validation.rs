//! Draft validation ahead of submission.
//!
//! A single pass over the draft that accumulates every violation instead of
//! failing on the first, so the form can render the complete list at once.
//! Messages are the pt-BR strings the UI shows verbatim.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::ScheduleDraft;

pub const MAX_TITLE_CHARS: usize = 200;

/// One violation, keyed by the form field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftValidation {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validate a draft for submission.
///
/// Pure and total: no I/O, no mutation, and any malformed state comes back as
/// an error entry rather than a panic. The check order below only fixes the
/// message ordering.
pub fn validate_draft(draft: &ScheduleDraft) -> DraftValidation {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push(ValidationError::new("title", "O título é obrigatório"));
    }

    if draft.title.chars().count() > MAX_TITLE_CHARS {
        errors.push(ValidationError::new(
            "title",
            "O título deve ter no máximo 200 caracteres",
        ));
    }

    if draft.start_date.is_none() {
        errors.push(ValidationError::new(
            "startDate",
            "A data de início é obrigatória",
        ));
    }

    if draft.end_date.is_none() {
        errors.push(ValidationError::new(
            "endDate",
            "A data de término é obrigatória",
        ));
    }

    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
        if start >= end {
            errors.push(ValidationError::new(
                "endDate",
                "A data de término deve ser posterior à data de início",
            ));
        }
    }

    if !(1..=7).contains(&draft.study_days_per_week) {
        errors.push(ValidationError::new(
            "studyDaysPerWeek",
            "Dias de estudo por semana deve ser entre 1 e 7",
        ));
    }

    if !(1..=24).contains(&draft.hours_per_day) {
        errors.push(ValidationError::new(
            "hoursPerDay",
            "Horas por dia deve ser entre 1 e 24",
        ));
    }

    if draft.selected_lessons.is_empty() {
        errors.push(ValidationError::new(
            "selectedLessons",
            "Selecione pelo menos uma aula",
        ));
    }

    let unallocated_count = draft.unallocated_lessons().len();
    if unallocated_count > 0 {
        errors.push(ValidationError::new(
            "allocations",
            format!(
                "{unallocated_count} aula(s) não alocada(s). \
                 Todas as aulas selecionadas devem ser alocadas no calendário."
            ),
        ));
    }

    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
        let mut out_of_range: Vec<_> = draft
            .allocations
            .iter()
            .filter(|(_, allocation)| {
                allocation.scheduled_date < start || allocation.scheduled_date > end
            })
            .map(|(lesson_id, _)| {
                let name = draft
                    .selected_lessons
                    .get(lesson_id)
                    .map(|lesson| lesson.title.clone())
                    .unwrap_or_else(|| lesson_id.to_string());
                (*lesson_id, name)
            })
            .collect();
        out_of_range.sort_by_key(|(lesson_id, _)| *lesson_id);

        for (_, name) in out_of_range {
            errors.push(ValidationError::new(
                "allocations",
                format!("A aula \"{name}\" está alocada fora do período do cronograma"),
            ));
        }
    }

    DraftValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Messages attached to one form field, in report order.
pub fn field_errors<'a>(errors: &'a [ValidationError], field: &str) -> Vec<&'a str> {
    errors
        .iter()
        .filter(|error| error.field == field)
        .map(|error| error.message.as_str())
        .collect()
}

pub fn first_field_error<'a>(errors: &'a [ValidationError], field: &str) -> Option<&'a str> {
    field_errors(errors, field).first().copied()
}

pub fn group_errors_by_field(errors: &[ValidationError]) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for error in errors {
        grouped
            .entry(error.field.clone())
            .or_default()
            .push(error.message.clone());
    }
    grouped
}

// ABOUTME: Parsing and validation of the portal's HTML form submissions
// ABOUTME: Authoring forms carry a bounded number of item rows; blank-named rows are dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Form payloads
//!
//! Authoring forms post their item rows as indexed fields
//! (`ex_name_0`, `ex_sets_0`, ...), so they are read from the raw ordered
//! pairs. The fixed-shape forms deserialize directly.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Exercise, Meal, Role};

/// Shown when a login, sign-up or assignment form has an empty field
pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
/// Shown when a workout has no title or no named exercise
pub const WORKOUT_INCOMPLETE: &str = "Please provide a title and at least one exercise";
/// Shown when a meal plan has no title or no named meal
pub const MEAL_PLAN_INCOMPLETE: &str = "Please provide a title and at least one meal";

/// Allowed exercise row counts
pub const EXERCISE_ROWS: RangeInclusive<usize> = 1..=20;
/// Allowed meal row counts
pub const MEAL_ROWS: RangeInclusive<usize> = 1..=10;
/// Rows shown when none are requested
pub const DEFAULT_ROWS: usize = 3;

/// Clamp a requested row count into `bounds`, defaulting when absent
#[must_use]
pub fn row_count(requested: Option<usize>, bounds: &RangeInclusive<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_ROWS)
        .clamp(*bounds.start(), *bounds.end())
}

fn field<'a>(pairs: &'a [(String, String)], key: &str) -> &'a str {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map_or("", |(_, v)| v.trim())
}

fn rows_field(pairs: &[(String, String)], key: &str, bounds: &RangeInclusive<usize>) -> usize {
    row_count(field(pairs, key).parse().ok(), bounds)
}

/// Workout authoring form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutForm {
    /// Title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Rows the form displayed
    pub rows: usize,
    /// Exercises from rows with a name, in row order
    pub exercises: Vec<Exercise>,
}

impl WorkoutForm {
    /// Read `title`, `description`, `num_exercises` and the exercise rows
    #[must_use]
    pub fn parse(pairs: &[(String, String)]) -> Self {
        let rows = rows_field(pairs, "num_exercises", &EXERCISE_ROWS);
        let exercises = (0..rows)
            .filter_map(|i| {
                let name = field(pairs, &format!("ex_name_{i}"));
                (!name.is_empty()).then(|| {
                    Exercise::new(
                        name,
                        field(pairs, &format!("ex_sets_{i}")),
                        field(pairs, &format!("ex_reps_{i}")),
                    )
                })
            })
            .collect();
        Self {
            title: field(pairs, "title").to_owned(),
            description: field(pairs, "description").to_owned(),
            rows,
            exercises,
        }
    }

    /// Require a title and at least one exercise
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error with the form message.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.is_empty() || self.exercises.is_empty() {
            return Err(AppError::invalid_input(WORKOUT_INCOMPLETE));
        }
        Ok(())
    }
}

/// Meal plan authoring form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealPlanForm {
    /// Title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Rows the form displayed
    pub rows: usize,
    /// Meals from rows with a name, in row order
    pub meals: Vec<Meal>,
}

impl MealPlanForm {
    /// Read `title`, `description`, `num_meals` and the meal rows
    #[must_use]
    pub fn parse(pairs: &[(String, String)]) -> Self {
        let rows = rows_field(pairs, "num_meals", &MEAL_ROWS);
        let meals = (0..rows)
            .filter_map(|i| {
                let name = field(pairs, &format!("meal_name_{i}"));
                (!name.is_empty()).then(|| {
                    Meal::new(
                        name,
                        field(pairs, &format!("meal_time_{i}")),
                        field(pairs, &format!("meal_items_{i}")),
                    )
                })
            })
            .collect();
        Self {
            title: field(pairs, "title").to_owned(),
            description: field(pairs, "description").to_owned(),
            rows,
            meals,
        }
    }

    /// Require a title and at least one meal
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error with the form message.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.is_empty() || self.meals.is_empty() {
            return Err(AppError::invalid_input(MEAL_PLAN_INCOMPLETE));
        }
        Ok(())
    }
}

/// Login form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    /// Email
    #[serde(default)]
    pub email: String,
    /// Password
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Require both fields
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when either field is blank.
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::invalid_input(FILL_ALL_FIELDS));
        }
        Ok(())
    }
}

/// Sign-up form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    /// Email
    #[serde(default)]
    pub email: String,
    /// Password
    #[serde(default)]
    pub password: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
    /// `client` or `trainer`
    #[serde(default)]
    pub role: String,
}

impl SignupForm {
    /// Require every field and a known role
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when a field is blank or the role is
    /// not offered by the form.
    pub fn validate(&self) -> AppResult<Role> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.full_name.trim().is_empty()
        {
            return Err(AppError::invalid_input(FILL_ALL_FIELDS));
        }
        let role = if self.role.trim().is_empty() {
            Role::Client
        } else {
            Role::parse(self.role.trim())
                .ok_or_else(|| AppError::invalid_input("Invalid user role"))?
        };
        Ok(role)
    }
}

/// Assignment form shared by workouts and meal plans
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentForm {
    /// Selected client profile id
    #[serde(default)]
    pub client_id: String,
    /// Selected workout or meal plan id
    #[serde(default)]
    pub plan_id: String,
    /// ISO date; blank means today
    #[serde(default)]
    pub assigned_date: String,
}

/// Validated assignment request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Workout or meal plan id
    pub plan_id: Uuid,
    /// Client profile id
    pub client_id: Uuid,
    /// Due date
    pub date: NaiveDate,
}

impl AssignmentForm {
    /// Parse ids and the date, defaulting the date to `today`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a missing selection, a malformed
    /// id or a malformed date.
    pub fn validate(&self, today: NaiveDate) -> AppResult<Assignment> {
        let client = self.client_id.trim();
        let plan = self.plan_id.trim();
        if client.is_empty() || plan.is_empty() {
            return Err(AppError::invalid_input(FILL_ALL_FIELDS));
        }
        let parse_id = |raw: &str| {
            Uuid::parse_str(raw).map_err(|_| AppError::invalid_input(format!("Invalid selection: {raw}")))
        };
        let date = match self.assigned_date.trim() {
            "" => today,
            raw => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::invalid_input(format!("Invalid date: {raw}")))?,
        };
        Ok(Assignment {
            plan_id: parse_id(plan)?,
            client_id: parse_id(client)?,
            date,
        })
    }
}

/// Completion checkbox
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionForm {
    /// Present and truthy when the box is ticked
    #[serde(default)]
    pub completed: Option<String>,
}

impl CompletionForm {
    /// Checkbox state
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(
            self.completed.as_deref().map(str::trim),
            Some("on" | "true" | "1")
        )
    }
}

/// `?rows=N` on authoring pages
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RowsQuery {
    /// Requested row count
    pub rows: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn workout_form_drops_blank_rows_and_keeps_order() {
        let form = WorkoutForm::parse(&pairs(&[
            ("title", " Leg Day "),
            ("description", "Lower body"),
            ("num_exercises", "3"),
            ("ex_name_0", "Squat"),
            ("ex_sets_0", "3"),
            ("ex_reps_0", "10"),
            ("ex_name_1", "  "),
            ("ex_sets_1", "5"),
            ("ex_name_2", "Lunge"),
            ("ex_sets_2", "2"),
            ("ex_reps_2", "12 each"),
        ]));
        assert_eq!(form.title, "Leg Day");
        assert_eq!(
            form.exercises,
            vec![
                Exercise::new("Squat", "3", "10"),
                Exercise::new("Lunge", "2", "12 each")
            ]
        );
        form.validate().unwrap();
    }

    #[test]
    fn rows_beyond_count_are_ignored() {
        let form = WorkoutForm::parse(&pairs(&[
            ("title", "Pull"),
            ("num_exercises", "1"),
            ("ex_name_0", "Row"),
            ("ex_name_1", "Curl"),
        ]));
        assert_eq!(form.exercises.len(), 1);
    }

    #[test]
    fn row_counts_are_clamped() {
        assert_eq!(row_count(None, &EXERCISE_ROWS), 3);
        assert_eq!(row_count(Some(0), &EXERCISE_ROWS), 1);
        assert_eq!(row_count(Some(50), &EXERCISE_ROWS), 20);
        assert_eq!(row_count(Some(50), &MEAL_ROWS), 10);
        let form = MealPlanForm::parse(&pairs(&[("num_meals", "abc")]));
        assert_eq!(form.rows, 3);
    }

    #[test]
    fn incomplete_forms_report_original_messages() {
        let workout = WorkoutForm::parse(&pairs(&[("title", "Empty")]));
        assert_eq!(workout.validate().unwrap_err().message, WORKOUT_INCOMPLETE);

        let meals = MealPlanForm::parse(&pairs(&[("meal_name_0", "Breakfast")]));
        assert_eq!(meals.validate().unwrap_err().message, MEAL_PLAN_INCOMPLETE);
    }

    #[test]
    fn signup_requires_all_fields_and_known_role() {
        let mut form = SignupForm {
            email: "a@example.com".to_owned(),
            password: "secret123".to_owned(),
            full_name: String::new(),
            role: "trainer".to_owned(),
        };
        assert_eq!(form.validate().unwrap_err().message, FILL_ALL_FIELDS);
        form.full_name = "Ana".to_owned();
        assert_eq!(form.validate().unwrap(), Role::Trainer);
        form.role = "admin".to_owned();
        assert!(form.validate().is_err());
        form.role = String::new();
        assert_eq!(form.validate().unwrap(), Role::Client);
    }

    #[test]
    fn assignment_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let form = AssignmentForm {
            client_id: Uuid::new_v4().to_string(),
            plan_id: Uuid::new_v4().to_string(),
            assigned_date: String::new(),
        };
        assert_eq!(form.validate(today).unwrap().date, today);

        let form = AssignmentForm {
            assigned_date: "2025-13-01".to_owned(),
            ..form
        };
        assert!(form.validate(today).unwrap_err().message.contains("Invalid date"));
    }

    #[test]
    fn completion_checkbox_values() {
        assert!(CompletionForm { completed: Some("on".to_owned()) }.is_completed());
        assert!(!CompletionForm { completed: Some("false".to_owned()) }.is_completed());
        assert!(!CompletionForm::default().is_completed());
    }
}

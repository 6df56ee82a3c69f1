// ABOUTME: Workout and meal assignment rows linking a plan to a client for one date
// ABOUTME: CompletionUpdate keeps completed_at set exactly when completed is true
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MealPlan, Workout};

/// Row of `workout_assignments`, optionally joined with its workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutAssignment {
    /// Row id
    pub id: Uuid,
    /// Assigned workout
    pub workout_id: Uuid,
    /// Client profile the workout is assigned to
    pub client_id: Uuid,
    /// Day the workout is due
    pub assigned_date: NaiveDate,
    /// Checked off by the client
    #[serde(default)]
    pub completed: bool,
    /// When it was last checked off
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Parent workout from the relational fetch
    #[serde(rename = "workouts", default, skip_serializing_if = "Option::is_none")]
    pub workout: Option<Workout>,
}

/// Row of `meal_assignments`, optionally joined with its meal plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealAssignment {
    /// Row id
    pub id: Uuid,
    /// Assigned meal plan
    pub meal_plan_id: Uuid,
    /// Client profile the plan is assigned to
    pub client_id: Uuid,
    /// Day the plan is due
    pub assigned_date: NaiveDate,
    /// Checked off by the client
    #[serde(default)]
    pub completed: bool,
    /// When it was last checked off
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Parent meal plan from the relational fetch
    #[serde(rename = "meal_plans", default, skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<MealPlan>,
}

/// Insert payload shared by both assignment tables
///
/// `plan_column` is `workout_id` or `meal_plan_id`; the store defaults
/// `completed` to false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Workout or meal plan id
    pub plan_id: Uuid,
    /// Client profile id
    pub client_id: Uuid,
    /// Due date
    pub assigned_date: NaiveDate,
}

impl NewAssignment {
    /// Row payload using the given foreign-key column name
    #[must_use]
    pub fn to_row(&self, plan_column: &str) -> serde_json::Value {
        let mut row = serde_json::Map::new();
        row.insert(plan_column.to_owned(), serde_json::json!(self.plan_id));
        row.insert("client_id".to_owned(), serde_json::json!(self.client_id));
        row.insert(
            "assigned_date".to_owned(),
            serde_json::json!(self.assigned_date.to_string()),
        );
        serde_json::Value::Object(row)
    }
}

/// Patch applied when a client toggles an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUpdate {
    /// New completed flag
    pub completed: bool,
    /// `Some(now)` when completing, `None` when un-completing
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionUpdate {
    /// Build the patch for `completed` as of `now`
    ///
    /// Re-completing an already completed row moves the timestamp forward.
    #[must_use]
    pub const fn at(completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            completed,
            completed_at: if completed { Some(now) } else { None },
        }
    }
}

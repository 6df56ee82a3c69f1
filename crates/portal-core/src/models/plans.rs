// ABOUTME: Workout and meal plan rows with their embedded item lists
// ABOUTME: Exercises and meals have no identity of their own; they live inside the parent row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Accept any JSON scalar as text; rows edited outside the portal may store numbers
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// One exercise line inside a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise name
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: String,
    /// Sets or duration
    #[serde(default, deserialize_with = "scalar_text")]
    pub sets: String,
    /// Reps or notes
    #[serde(default, deserialize_with = "scalar_text")]
    pub reps: String,
}

impl Exercise {
    /// Build an exercise from its three form fields
    pub fn new(name: impl Into<String>, sets: impl Into<String>, reps: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: sets.into(),
            reps: reps.into(),
        }
    }
}

/// One meal inside a meal plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Meal name
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: String,
    /// Free-form time, e.g. "8:00 AM"
    #[serde(default, deserialize_with = "scalar_text")]
    pub time: String,
    /// Items or instructions
    #[serde(default, deserialize_with = "scalar_text")]
    pub items: String,
}

impl Meal {
    /// Build a meal from its three form fields
    pub fn new(name: impl Into<String>, time: impl Into<String>, items: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
            items: items.into(),
        }
    }
}

/// Row of the `workouts` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Row id
    pub id: Uuid,
    /// Owning trainer profile
    pub trainer_id: Uuid,
    /// Title shown in lists
    pub title: String,
    /// Optional free text
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered exercise list
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Set by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for `workouts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkout {
    /// Owning trainer profile
    pub trainer_id: Uuid,
    /// Title
    pub title: String,
    /// Description, stored as given
    pub description: String,
    /// Ordered exercise list
    pub exercises: Vec<Exercise>,
}

/// Row of the `meal_plans` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Row id
    pub id: Uuid,
    /// Owning trainer profile
    pub trainer_id: Uuid,
    /// Title shown in lists
    pub title: String,
    /// Optional free text
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered meal list
    #[serde(default)]
    pub meals: Vec<Meal>,
    /// Set by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for `meal_plans`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMealPlan {
    /// Owning trainer profile
    pub trainer_id: Uuid,
    /// Title
    pub title: String,
    /// Description, stored as given
    pub description: String,
    /// Ordered meal list
    pub meals: Vec<Meal>,
}

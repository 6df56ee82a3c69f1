// ABOUTME: Row types mirroring the hosted store's five tables
// ABOUTME: Profiles, workouts, meal plans and their per-date assignments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

mod assignments;
mod plans;
mod profile;

pub use assignments::{CompletionUpdate, MealAssignment, NewAssignment, WorkoutAssignment};
pub use plans::{Exercise, Meal, MealPlan, NewMealPlan, NewWorkout, Workout};
pub use profile::{Profile, Role};

// ABOUTME: Workout and meal plan create / list / delete for the signed-in trainer
// ABOUTME: Ownership is enforced by the store's row policies, not here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use tracing::{instrument, warn};
use uuid::Uuid;

use super::{ActionOutcome, Listing, Services};
use crate::models::{Exercise, Meal, MealPlan, NewMealPlan, NewWorkout, Workout};
use crate::session::SessionContext;
use crate::store::{fetch_rows, Filter, Query, Table};

/// Workout insert succeeded
pub const WORKOUT_CREATED: &str = "Workout created successfully!";
/// Workout delete succeeded
pub const WORKOUT_DELETED: &str = "Workout deleted successfully!";
/// Meal plan insert succeeded
pub const MEAL_PLAN_CREATED: &str = "Meal plan created successfully!";
/// Meal plan delete succeeded
pub const MEAL_PLAN_DELETED: &str = "Meal plan deleted successfully!";

impl Services {
    /// Insert a workout owned by the caller
    ///
    /// The payload is stored as given; form validation happens in the view.
    #[instrument(skip(self, context, description, exercises), fields(user_id = %context.user_id(), exercises = exercises.len()))]
    pub async fn create_workout(
        &self,
        context: &SessionContext,
        title: &str,
        description: &str,
        exercises: Vec<Exercise>,
    ) -> ActionOutcome {
        let row = NewWorkout {
            trainer_id: context.user_id(),
            title: title.to_owned(),
            description: description.to_owned(),
            exercises,
        };
        let result = match serde_json::to_value(&row) {
            Ok(row) => {
                self.store
                    .insert(&context.access_token, Table::Workouts, row)
                    .await
            }
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => ActionOutcome::ok(WORKOUT_CREATED),
            Err(e) => ActionOutcome::failed(e.message),
        }
    }

    /// Workouts owned by the caller
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn get_workouts(&self, context: &SessionContext) -> Listing<Workout> {
        let query = Query::table(Table::Workouts).eq("trainer_id", context.user_id());
        match fetch_rows(self.store.as_ref(), &context.access_token, &query).await {
            Ok(rows) => Listing::ok(rows),
            Err(e) => {
                warn!(error = %e, "Workout fetch failed");
                Listing::degraded(format!("Error fetching workouts: {e}"))
            }
        }
    }

    /// Delete a workout by id
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn delete_workout(&self, context: &SessionContext, workout_id: Uuid) -> ActionOutcome {
        match self
            .store
            .delete(
                &context.access_token,
                Table::Workouts,
                &[Filter::eq("id", workout_id)],
            )
            .await
        {
            Ok(()) => ActionOutcome::ok(WORKOUT_DELETED),
            Err(e) => ActionOutcome::failed(e.message),
        }
    }

    /// Insert a meal plan owned by the caller
    #[instrument(skip(self, context, description, meals), fields(user_id = %context.user_id(), meals = meals.len()))]
    pub async fn create_meal_plan(
        &self,
        context: &SessionContext,
        title: &str,
        description: &str,
        meals: Vec<Meal>,
    ) -> ActionOutcome {
        let row = NewMealPlan {
            trainer_id: context.user_id(),
            title: title.to_owned(),
            description: description.to_owned(),
            meals,
        };
        let result = match serde_json::to_value(&row) {
            Ok(row) => {
                self.store
                    .insert(&context.access_token, Table::MealPlans, row)
                    .await
            }
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => ActionOutcome::ok(MEAL_PLAN_CREATED),
            Err(e) => ActionOutcome::failed(e.message),
        }
    }

    /// Meal plans owned by the caller
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn get_meal_plans(&self, context: &SessionContext) -> Listing<MealPlan> {
        let query = Query::table(Table::MealPlans).eq("trainer_id", context.user_id());
        match fetch_rows(self.store.as_ref(), &context.access_token, &query).await {
            Ok(rows) => Listing::ok(rows),
            Err(e) => {
                warn!(error = %e, "Meal plan fetch failed");
                Listing::degraded(format!("Error fetching meal plans: {e}"))
            }
        }
    }

    /// Delete a meal plan by id
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn delete_meal_plan(
        &self,
        context: &SessionContext,
        meal_plan_id: Uuid,
    ) -> ActionOutcome {
        match self
            .store
            .delete(
                &context.access_token,
                Table::MealPlans,
                &[Filter::eq("id", meal_plan_id)],
            )
            .await
        {
            Ok(()) => ActionOutcome::ok(MEAL_PLAN_DELETED),
            Err(e) => ActionOutcome::failed(e.message),
        }
    }
}

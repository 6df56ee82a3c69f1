// ABOUTME: Assigning workouts and meal plans to clients, today's checklist, completion toggles
// ABOUTME: completed_at is stamped on every completion and cleared on un-completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use chrono::NaiveDate;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{ActionOutcome, CompletionToggle, Services, TodayAssignments};
use crate::errors::AppResult;
use crate::models::{CompletionUpdate, MealAssignment, NewAssignment, WorkoutAssignment};
use crate::session::SessionContext;
use crate::store::{fetch_rows, Filter, Query, Table};

/// Workout assignment insert succeeded
pub const WORKOUT_ASSIGNED: &str = "Workout assigned successfully!";
/// Meal plan assignment insert succeeded
pub const MEAL_PLAN_ASSIGNED: &str = "Meal plan assigned successfully!";

impl Services {
    /// Assign a workout to a client for `date`
    ///
    /// Repeating the same assignment creates another row.
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn assign_workout(
        &self,
        context: &SessionContext,
        workout_id: Uuid,
        client_id: Uuid,
        date: NaiveDate,
    ) -> ActionOutcome {
        let row = NewAssignment {
            plan_id: workout_id,
            client_id,
            assigned_date: date,
        }
        .to_row("workout_id");
        match self
            .store
            .insert(&context.access_token, Table::WorkoutAssignments, row)
            .await
        {
            Ok(()) => ActionOutcome::ok(WORKOUT_ASSIGNED),
            Err(e) => ActionOutcome::failed(e.message),
        }
    }

    /// Assign a meal plan to a client for `date`
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn assign_meal_plan(
        &self,
        context: &SessionContext,
        meal_plan_id: Uuid,
        client_id: Uuid,
        date: NaiveDate,
    ) -> ActionOutcome {
        let row = NewAssignment {
            plan_id: meal_plan_id,
            client_id,
            assigned_date: date,
        }
        .to_row("meal_plan_id");
        match self
            .store
            .insert(&context.access_token, Table::MealAssignments, row)
            .await
        {
            Ok(()) => ActionOutcome::ok(MEAL_PLAN_ASSIGNED),
            Err(e) => ActionOutcome::failed(e.message),
        }
    }

    /// The caller's workout and meal assignments dated today, with parents embedded
    ///
    /// Any failure empties both lists.
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn get_today_assignments(&self, context: &SessionContext) -> TodayAssignments {
        match self.fetch_today(context).await {
            Ok((workouts, meals)) => TodayAssignments {
                workouts,
                meals,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "Checklist fetch failed");
                TodayAssignments {
                    error: Some(format!("Error fetching today's assignments: {e}")),
                    ..TodayAssignments::default()
                }
            }
        }
    }

    async fn fetch_today(
        &self,
        context: &SessionContext,
    ) -> AppResult<(Vec<WorkoutAssignment>, Vec<MealAssignment>)> {
        let today = self.clock.today().to_string();
        let workouts = Query::table(Table::WorkoutAssignments)
            .eq("client_id", context.user_id())
            .eq("assigned_date", &today)
            .embed(Table::Workouts);
        let meals = Query::table(Table::MealAssignments)
            .eq("client_id", context.user_id())
            .eq("assigned_date", &today)
            .embed(Table::MealPlans);

        let workouts = fetch_rows(self.store.as_ref(), &context.access_token, &workouts).await?;
        let meals = fetch_rows(self.store.as_ref(), &context.access_token, &meals).await?;
        Ok((workouts, meals))
    }

    /// Set or clear completion on a workout assignment
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn mark_workout_complete(
        &self,
        context: &SessionContext,
        assignment_id: Uuid,
        completed: bool,
    ) -> CompletionToggle {
        self.toggle(context, Table::WorkoutAssignments, assignment_id, completed)
            .await
            .unwrap_or_else(|e| failed_toggle(format!("Error updating workout: {e}")))
    }

    /// Set or clear completion on a meal assignment
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn mark_meal_complete(
        &self,
        context: &SessionContext,
        assignment_id: Uuid,
        completed: bool,
    ) -> CompletionToggle {
        self.toggle(context, Table::MealAssignments, assignment_id, completed)
            .await
            .unwrap_or_else(|e| failed_toggle(format!("Error updating meal: {e}")))
    }

    async fn toggle(
        &self,
        context: &SessionContext,
        table: Table,
        assignment_id: Uuid,
        completed: bool,
    ) -> AppResult<CompletionToggle> {
        let patch = serde_json::to_value(CompletionUpdate::at(completed, self.clock.now()))?;
        self.store
            .update(
                &context.access_token,
                table,
                &[Filter::eq("id", assignment_id)],
                patch,
            )
            .await?;
        Ok(CompletionToggle {
            updated: true,
            error: None,
        })
    }
}

fn failed_toggle(message: String) -> CompletionToggle {
    warn!(error = %message, "Completion toggle failed");
    CompletionToggle {
        updated: false,
        error: Some(message),
    }
}

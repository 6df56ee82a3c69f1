// ABOUTME: Trainer dashboard routes: workout and meal plan authoring, client assignment
// ABOUTME: Every handler requires a trainer session and re-fetches lists on each render
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Trainer routes
//!
//! Authoring forms post their item rows as indexed fields; the number of
//! rows shown is chosen with `?rows=N`. Write handlers render the page again
//! with the outcome as a notice.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use uuid::Uuid;

use super::render::{
    attr, description, exercise_list, meal_list, text, Header, Notice, Page, TrainerTab,
};
use super::{require_role, status_of};
use crate::forms::{
    row_count, AssignmentForm, MealPlanForm, RowsQuery, WorkoutForm, EXERCISE_ROWS, MEAL_ROWS,
};
use crate::models::{MealPlan, Profile, Role, Workout};
use crate::resources::ServerResources;
use crate::services::Listing;
use crate::session::SessionContext;

/// Which plan kind an assignment form targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanKind {
    Workout,
    MealPlan,
}

/// Trainer dashboard routes handler
pub struct TrainerRoutes;

impl TrainerRoutes {
    /// Create all trainer routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/trainer/workouts", get(Self::handle_workouts))
            .route("/trainer/workouts", post(Self::handle_create_workout))
            .route(
                "/trainer/workouts/:id/delete",
                post(Self::handle_delete_workout),
            )
            .route("/trainer/meal-plans", get(Self::handle_meal_plans))
            .route("/trainer/meal-plans", post(Self::handle_create_meal_plan))
            .route(
                "/trainer/meal-plans/:id/delete",
                post(Self::handle_delete_meal_plan),
            )
            .route("/trainer/assign", get(Self::handle_assign_page))
            .route("/trainer/assign/workout", post(Self::handle_assign_workout))
            .route(
                "/trainer/assign/meal-plan",
                post(Self::handle_assign_meal_plan),
            )
            .with_state(resources)
    }

    fn header(context: &SessionContext, active: TrainerTab) -> Header {
        Header::Trainer {
            name: context.display_name().to_owned(),
            active,
        }
    }

    // ─── Workouts ───────────────────────────────────────────────

    /// Workout management page with `rows` exercise rows in the create form
    pub(crate) async fn workouts_page(
        resources: &ServerResources,
        context: &SessionContext,
        rows: usize,
        mut notices: Vec<Notice>,
    ) -> Page {
        let listing = resources.services.get_workouts(context).await;
        notices.extend(listing.error.iter().map(Notice::error));

        let mut body = String::from("<h2>💪 Workout Management</h2>");
        body.push_str(&workout_form(rows));
        body.push_str("<section><h3>Existing Workouts</h3>");
        if listing.is_empty() {
            body.push_str(
                &Notice::info("No workouts created yet. Create your first workout above!")
                    .render(),
            );
        }
        for workout in &listing.items {
            body.push_str(&format!(
                r#"<details><summary>📋 {title}</summary>{desc}{exercises}<form method="post" action="/trainer/workouts/{id}/delete"><button type="submit" class="danger">Delete</button></form></details>"#,
                title = text(&workout.title),
                desc = description(workout.description.as_deref()),
                exercises = exercise_list(&workout.exercises),
                id = workout.id
            ));
        }
        body.push_str("</section>");

        Page::new("Workouts", Self::header(context, TrainerTab::Workouts), body).notices(notices)
    }

    /// Handle GET /trainer/workouts
    async fn handle_workouts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<RowsQuery>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let rows = row_count(query.rows, &EXERCISE_ROWS);
        Self::workouts_page(&resources, &context, rows, Vec::new())
            .await
            .into_response()
    }

    /// Handle POST /trainer/workouts
    async fn handle_create_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Form(pairs): Form<Vec<(String, String)>>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let form = WorkoutForm::parse(&pairs);
        let (notice, status) = match form.validate() {
            Err(e) => (Notice::error(&e.message), status_of(&e)),
            Ok(()) => {
                let outcome = resources
                    .services
                    .create_workout(&context, &form.title, &form.description, form.exercises)
                    .await;
                (Notice::outcome(outcome.success, outcome.message), StatusCode::OK)
            }
        };
        Self::workouts_page(&resources, &context, form.rows, vec![notice])
            .await
            .status(status)
            .into_response()
    }

    /// Handle POST /trainer/workouts/:id/delete
    async fn handle_delete_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let outcome = resources.services.delete_workout(&context, id).await;
        let notice = Notice::outcome(outcome.success, outcome.message);
        Self::workouts_page(&resources, &context, row_count(None, &EXERCISE_ROWS), vec![notice])
            .await
            .into_response()
    }

    // ─── Meal plans ─────────────────────────────────────────────

    /// Meal plan management page with `rows` meal rows in the create form
    pub(crate) async fn meal_plans_page(
        resources: &ServerResources,
        context: &SessionContext,
        rows: usize,
        mut notices: Vec<Notice>,
    ) -> Page {
        let listing = resources.services.get_meal_plans(context).await;
        notices.extend(listing.error.iter().map(Notice::error));

        let mut body = String::from("<h2>🍽️ Meal Plan Management</h2>");
        body.push_str(&meal_plan_form(rows));
        body.push_str("<section><h3>Existing Meal Plans</h3>");
        if listing.is_empty() {
            body.push_str(
                &Notice::info("No meal plans created yet. Create your first meal plan above!")
                    .render(),
            );
        }
        for plan in &listing.items {
            body.push_str(&format!(
                r#"<details><summary>🍽️ {title}</summary>{desc}{meals}<form method="post" action="/trainer/meal-plans/{id}/delete"><button type="submit" class="danger">Delete</button></form></details>"#,
                title = text(&plan.title),
                desc = description(plan.description.as_deref()),
                meals = meal_list(&plan.meals),
                id = plan.id
            ));
        }
        body.push_str("</section>");

        Page::new("Meal Plans", Self::header(context, TrainerTab::MealPlans), body)
            .notices(notices)
    }

    /// Handle GET /trainer/meal-plans
    async fn handle_meal_plans(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<RowsQuery>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let rows = row_count(query.rows, &MEAL_ROWS);
        Self::meal_plans_page(&resources, &context, rows, Vec::new())
            .await
            .into_response()
    }

    /// Handle POST /trainer/meal-plans
    async fn handle_create_meal_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Form(pairs): Form<Vec<(String, String)>>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let form = MealPlanForm::parse(&pairs);
        let (notice, status) = match form.validate() {
            Err(e) => (Notice::error(&e.message), status_of(&e)),
            Ok(()) => {
                let outcome = resources
                    .services
                    .create_meal_plan(&context, &form.title, &form.description, form.meals)
                    .await;
                (Notice::outcome(outcome.success, outcome.message), StatusCode::OK)
            }
        };
        Self::meal_plans_page(&resources, &context, form.rows, vec![notice])
            .await
            .status(status)
            .into_response()
    }

    /// Handle POST /trainer/meal-plans/:id/delete
    async fn handle_delete_meal_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let outcome = resources.services.delete_meal_plan(&context, id).await;
        let notice = Notice::outcome(outcome.success, outcome.message);
        Self::meal_plans_page(&resources, &context, row_count(None, &MEAL_ROWS), vec![notice])
            .await
            .into_response()
    }

    // ─── Assignments ────────────────────────────────────────────

    /// Assignment page: client × plan × date forms for both plan kinds
    pub(crate) async fn assign_page(
        resources: &ServerResources,
        context: &SessionContext,
        mut notices: Vec<Notice>,
    ) -> Page {
        let clients = resources.services.get_clients(context).await;
        let workouts = resources.services.get_workouts(context).await;
        let meal_plans = resources.services.get_meal_plans(context).await;
        for error in [&clients.error, &workouts.error, &meal_plans.error]
            .into_iter()
            .flatten()
        {
            notices.push(Notice::error(error));
        }

        let header = Self::header(context, TrainerTab::Assign);
        let mut body = String::from("<h2>📅 Assign to Clients</h2>");
        if clients.is_empty() {
            body.push_str(&Notice::warning("No clients registered yet.").render());
            return Page::new("Assign", header, body).notices(notices);
        }

        let today = resources.services.clock().today();
        body.push_str(r#"<div class="tabs">"#);
        body.push_str(&assignment_section(
            PlanKind::Workout,
            &clients,
            &workouts,
            today,
        ));
        body.push_str(&assignment_section(
            PlanKind::MealPlan,
            &clients,
            &meal_plans,
            today,
        ));
        body.push_str("</div>");
        Page::new("Assign", header, body).notices(notices)
    }

    /// Handle GET /trainer/assign
    async fn handle_assign_page(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        Self::assign_page(&resources, &context, Vec::new())
            .await
            .into_response()
    }

    /// Handle POST /trainer/assign/workout
    async fn handle_assign_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Form(form): Form<AssignmentForm>,
    ) -> Response {
        Self::assign(&resources, &headers, &form, PlanKind::Workout).await
    }

    /// Handle POST /trainer/assign/meal-plan
    async fn handle_assign_meal_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Form(form): Form<AssignmentForm>,
    ) -> Response {
        Self::assign(&resources, &headers, &form, PlanKind::MealPlan).await
    }

    async fn assign(
        resources: &ServerResources,
        headers: &HeaderMap,
        form: &AssignmentForm,
        kind: PlanKind,
    ) -> Response {
        let context = match require_role(resources, headers, Role::Trainer).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let (notice, status) = match form.validate(resources.services.clock().today()) {
            Err(e) => (Notice::error(&e.message), status_of(&e)),
            Ok(request) => {
                let services = &resources.services;
                let outcome = match kind {
                    PlanKind::Workout => {
                        services
                            .assign_workout(&context, request.plan_id, request.client_id, request.date)
                            .await
                    }
                    PlanKind::MealPlan => {
                        services
                            .assign_meal_plan(
                                &context,
                                request.plan_id,
                                request.client_id,
                                request.date,
                            )
                            .await
                    }
                };
                (Notice::outcome(outcome.success, outcome.message), StatusCode::OK)
            }
        };
        Self::assign_page(resources, &context, vec![notice])
            .await
            .status(status)
            .into_response()
    }
}

/// Plan rows selectable in an assignment form
trait Selectable {
    fn id(&self) -> Uuid;
    fn title(&self) -> &str;
}

impl Selectable for Workout {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Selectable for MealPlan {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

fn assignment_section<T: Selectable>(
    kind: PlanKind,
    clients: &Listing<Profile>,
    plans: &Listing<T>,
    today: chrono::NaiveDate,
) -> String {
    let (heading, empty, action, select_label, button) = match kind {
        PlanKind::Workout => (
            "Assign Workout to Client",
            "No workouts available. Create workouts first!",
            "/trainer/assign/workout",
            "Select Workout",
            "Assign Workout",
        ),
        PlanKind::MealPlan => (
            "Assign Meal Plan to Client",
            "No meal plans available. Create meal plans first!",
            "/trainer/assign/meal-plan",
            "Select Meal Plan",
            "Assign Meal Plan",
        ),
    };
    let mut html = format!("<section><h3>{heading}</h3>");
    if plans.is_empty() {
        html.push_str(&Notice::info(empty).render());
        html.push_str("</section>");
        return html;
    }

    html.push_str(&format!(
        r#"<form method="post" action="{action}"><label>Select Client</label><select name="client_id">"#
    ));
    for client in &clients.items {
        html.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            client.id,
            text(&client.roster_label())
        ));
    }
    html.push_str(&format!(r#"</select><label>{select_label}</label><select name="plan_id">"#));
    for plan in &plans.items {
        html.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            plan.id(),
            text(plan.title())
        ));
    }
    html.push_str(&format!(
        r#"</select><label>Date</label><input type="date" name="assigned_date" value="{}"><button type="submit">{button}</button></form></section>"#,
        attr(&today.to_string())
    ));
    html
}

fn workout_form(rows: usize) -> String {
    let mut html = format!(
        r#"<details><summary>➕ Create New Workout</summary><form method="get" action="/trainer/workouts"><label>Number of exercises</label><input type="number" name="rows" min="{min}" max="{max}" value="{rows}"><button type="submit">Update</button></form><form method="post" action="/trainer/workouts"><input type="hidden" name="num_exercises" value="{rows}"><label>Workout Title</label><input type="text" name="title"><label>Description</label><textarea name="description"></textarea><h4>Exercises</h4>"#,
        min = EXERCISE_ROWS.start(),
        max = EXERCISE_ROWS.end(),
    );
    for i in 0..rows {
        html.push_str(&format!(
            r#"<p><strong>Exercise {n}</strong></p><div class="row"><input type="text" name="ex_name_{i}" placeholder="Exercise name"><input type="text" name="ex_sets_{i}" placeholder="Sets/Duration"><input type="text" name="ex_reps_{i}" placeholder="Reps/Notes"></div>"#,
            n = i + 1
        ));
    }
    html.push_str(r#"<button type="submit">Create Workout</button></form></details>"#);
    html
}

fn meal_plan_form(rows: usize) -> String {
    let mut html = format!(
        r#"<details><summary>➕ Create New Meal Plan</summary><form method="get" action="/trainer/meal-plans"><label>Number of meals</label><input type="number" name="rows" min="{min}" max="{max}" value="{rows}"><button type="submit">Update</button></form><form method="post" action="/trainer/meal-plans"><input type="hidden" name="num_meals" value="{rows}"><label>Meal Plan Title</label><input type="text" name="title"><label>Description</label><textarea name="description"></textarea><h4>Meals</h4>"#,
        min = MEAL_ROWS.start(),
        max = MEAL_ROWS.end(),
    );
    for i in 0..rows {
        html.push_str(&format!(
            r#"<p><strong>Meal {n}</strong></p><div class="row two"><input type="text" name="meal_name_{i}" placeholder="Meal name"><input type="text" name="meal_time_{i}" placeholder="e.g., 8:00 AM"></div><textarea name="meal_items_{i}" placeholder="Items/Instructions"></textarea>"#,
            n = i + 1
        ));
    }
    html.push_str(r#"<button type="submit">Create Meal Plan</button></form></details>"#);
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn workout(title: &str) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            title: title.to_owned(),
            description: None,
            exercises: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn create_forms_emit_one_indexed_row_each() {
        let html = workout_form(3);
        assert!(html.contains(r#"name="num_exercises" value="3""#));
        assert!(html.contains("ex_name_2"));
        assert!(!html.contains("ex_name_3"));
        assert_eq!(html.matches("<strong>Exercise ").count(), 3);

        let html = meal_plan_form(2);
        assert!(html.contains("meal_items_1"));
        assert!(!html.contains("meal_items_2"));
    }

    #[test]
    fn assignment_section_escapes_titles_and_labels() {
        let client = Profile {
            id: Uuid::new_v4(),
            full_name: Some("<Sam>".to_owned()),
            role: Some("client".to_owned()),
            email: None,
        };
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let html = assignment_section(
            PlanKind::Workout,
            &Listing::ok(vec![client]),
            &Listing::ok(vec![workout("Legs & Core")]),
            today,
        );
        assert!(html.contains("&lt;Sam&gt; (N/A)"));
        assert!(html.contains("Legs &amp; Core"));
        assert!(html.contains(r#"value="2025-06-02""#));
        assert!(html.ends_with("</form></section>"));
    }

    #[test]
    fn assignment_section_without_plans_shows_hint() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let html = assignment_section::<MealPlan>(
            PlanKind::MealPlan,
            &Listing::ok(Vec::new()),
            &Listing::ok(Vec::new()),
            today,
        );
        assert!(html.contains("No meal plans available. Create meal plans first!"));
        assert!(!html.contains("<form"));
    }
}

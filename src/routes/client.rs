// ABOUTME: Client dashboard routes: today's checklist and completion toggles
// ABOUTME: Toggle writes go through the caller's token so only own assignments change
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use uuid::Uuid;

use super::render::{description, exercise_list, long_date, meal_list, text, Header, Notice, Page};
use super::require_role;
use crate::forms::CompletionForm;
use crate::models::{MealAssignment, Role, WorkoutAssignment};
use crate::resources::ServerResources;
use crate::services::CompletionToggle;
use crate::session::SessionContext;

/// Client dashboard routes handler
pub struct ClientRoutes;

impl ClientRoutes {
    /// Create all client routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/client/today", get(Self::handle_today))
            .route(
                "/client/workouts/:id/complete",
                post(Self::handle_workout_complete),
            )
            .route(
                "/client/meals/:id/complete",
                post(Self::handle_meal_complete),
            )
            .with_state(resources)
    }

    /// Today's checklist for the signed-in client
    pub(crate) async fn checklist_page(
        resources: &ServerResources,
        context: &SessionContext,
        mut notices: Vec<Notice>,
    ) -> Page {
        let today = resources.services.get_today_assignments(context).await;
        notices.extend(today.error.iter().map(Notice::error));

        let mut body = format!(
            "<h2>📅 Today's Checklist</h2><p>Date: {}</p>",
            text(&long_date(resources.services.clock().today()))
        );

        body.push_str("<section><h3>💪 Today's Workouts</h3>");
        if today.workouts.is_empty() {
            body.push_str(&Notice::info("No workouts assigned for today.").render());
        }
        for assignment in &today.workouts {
            body.push_str(&workout_item(assignment));
        }
        body.push_str("</section>");

        body.push_str("<section><h3>🍽️ Today's Meals</h3>");
        if today.meals.is_empty() {
            body.push_str(&Notice::info("No meal plans assigned for today.").render());
        }
        for assignment in &today.meals {
            body.push_str(&meal_item(assignment));
        }
        body.push_str("</section>");

        let header = Header::Client {
            name: context.display_name().to_owned(),
        };
        Page::new("Today", header, body).notices(notices)
    }

    /// Handle GET /client/today
    async fn handle_today(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Client).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        Self::checklist_page(&resources, &context, Vec::new())
            .await
            .into_response()
    }

    /// Handle POST /client/workouts/:id/complete
    async fn handle_workout_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Form(form): Form<CompletionForm>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Client).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let toggle = resources
            .services
            .mark_workout_complete(&context, id, form.is_completed())
            .await;
        Self::after_toggle(&resources, &context, toggle).await
    }

    /// Handle POST /client/meals/:id/complete
    async fn handle_meal_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Form(form): Form<CompletionForm>,
    ) -> Response {
        let context = match require_role(&resources, &headers, Role::Client).await {
            Ok(context) => context,
            Err(redirect) => return redirect,
        };
        let toggle = resources
            .services
            .mark_meal_complete(&context, id, form.is_completed())
            .await;
        Self::after_toggle(&resources, &context, toggle).await
    }

    /// Redirect back to the checklist, or re-render it with the failure inline
    async fn after_toggle(
        resources: &ServerResources,
        context: &SessionContext,
        toggle: CompletionToggle,
    ) -> Response {
        match toggle.error {
            None => Redirect::to("/client/today").into_response(),
            Some(error) => Self::checklist_page(resources, context, vec![Notice::error(error)])
                .await
                .into_response(),
        }
    }
}

fn status_icon(completed: bool) -> &'static str {
    if completed {
        "✅"
    } else {
        "⬜"
    }
}

fn toggle_form(action: &str, completed: bool, label: &str) -> String {
    let checked = if completed { " checked" } else { "" };
    format!(
        r#"<form method="post" action="{action}"><label><input type="checkbox" name="completed" value="true"{checked} onchange="this.form.submit()"> {label}</label><noscript><button type="submit">Save</button></noscript></form>"#
    )
}

fn workout_item(assignment: &WorkoutAssignment) -> String {
    let title = assignment
        .workout
        .as_ref()
        .map_or("N/A", |w| w.title.as_str());
    let open = if assignment.completed { "" } else { " open" };
    let mut html = format!(
        "<details{open}><summary>{} {}</summary>",
        status_icon(assignment.completed),
        text(title)
    );
    if let Some(workout) = &assignment.workout {
        html.push_str(&description(workout.description.as_deref()));
        html.push_str(&exercise_list(&workout.exercises));
    }
    html.push_str(&format!(
        "{}</details>",
        toggle_form(
            &format!("/client/workouts/{}/complete", assignment.id),
            assignment.completed,
            "Mark as completed"
        )
    ));
    html
}

fn meal_item(assignment: &MealAssignment) -> String {
    let title = assignment
        .meal_plan
        .as_ref()
        .map_or("N/A", |p| p.title.as_str());
    let open = if assignment.completed { "" } else { " open" };
    let mut html = format!(
        "<details{open}><summary>{} {}</summary>",
        status_icon(assignment.completed),
        text(title)
    );
    if let Some(plan) = &assignment.meal_plan {
        html.push_str(&description(plan.description.as_deref()));
        html.push_str(&meal_list(&plan.meals));
    }
    html.push_str(&format!(
        "{}</details>",
        toggle_form(
            &format!("/client/meals/{}/complete", assignment.id),
            assignment.completed,
            "Mark as completed"
        )
    ));
    html
}

// ABOUTME: Server-side HTML rendering: the page shell, notices and shared plan fragments
// ABOUTME: Templates are embedded at compile time; every interpolated value is escaped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors


use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::NaiveDate;

use crate::models::{Exercise, Meal};

/// Page shell with `{{TITLE}}`, `{{HEADER}}`, `{{NOTICES}}` and `{{BODY}}` slots
/// Loaded with `include_str!()` to avoid filesystem IO at runtime
const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.html");
/// Login and sign-up forms
const LOGIN_TEMPLATE: &str = include_str!("../../templates/login.html");

/// Escape text content
#[must_use]
pub fn text(value: &str) -> String {
    html_escape::encode_text(value).into_owned()
}

/// Escape a double-quoted attribute value
#[must_use]
pub fn attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Green
    Success,
    /// Red
    Error,
    /// Blue
    Info,
    /// Yellow
    Warning,
}

impl NoticeKind {
    const fn class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// Inline message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Plain text
    pub text: String,
}

impl Notice {
    /// Success notice
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// Error notice
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Info notice
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    /// Warning notice
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    /// Success or error depending on `success`
    pub fn outcome(success: bool, text: impl Into<String>) -> Self {
        if success {
            Self::success(text)
        } else {
            Self::error(text)
        }
    }

    /// HTML fragment
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            r#"<div class="notice {}" role="status">{}</div>"#,
            self.kind.class(),
            text(&self.text)
        )
    }
}

/// Trainer navigation entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerTab {
    /// Workout management
    Workouts,
    /// Meal plan management
    MealPlans,
    /// Assignment forms
    Assign,
}

/// Top bar variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// No bar on the login page
    None,
    /// Greeting, navigation and logout
    Trainer {
        /// Greeting name
        name: String,
        /// Highlighted entry
        active: TrainerTab,
    },
    /// Greeting and logout
    Client {
        /// Greeting name
        name: String,
    },
}

const LOGOUT_FORM: &str = r#"<form method="post" action="/logout"><button type="submit" class="link">Logout</button></form>"#;

impl Header {
    fn render(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Trainer { name, active } => {
                let link = |tab: TrainerTab, href: &str, label: &str| {
                    let class = if tab == *active { r#" class="active""# } else { "" };
                    format!(r#"<a href="{href}"{class}>{label}</a>"#)
                };
                format!(
                    "<header><h1>👋 Welcome, {}</h1><nav>{}{}{}</nav>{LOGOUT_FORM}</header>",
                    text(name),
                    link(TrainerTab::Workouts, "/trainer/workouts", "Workouts"),
                    link(TrainerTab::MealPlans, "/trainer/meal-plans", "Meal Plans"),
                    link(TrainerTab::Assign, "/trainer/assign", "Assign to Clients"),
                )
            }
            Self::Client { name } => {
                format!(
                    "<header><h1>👋 Welcome, {}</h1>{LOGOUT_FORM}</header>",
                    text(name)
                )
            }
        }
    }
}

/// A full HTML page
#[derive(Debug, Clone)]
pub struct Page {
    /// Document title prefix
    pub title: &'static str,
    /// Top bar
    pub header: Header,
    /// Notices shown above the body
    pub notices: Vec<Notice>,
    /// Pre-escaped body HTML
    pub body: String,
    /// Response status
    pub status: StatusCode,
}

impl Page {
    /// 200 page with no notices
    #[must_use]
    pub const fn new(title: &'static str, header: Header, body: String) -> Self {
        Self {
            title,
            header,
            notices: Vec::new(),
            body,
            status: StatusCode::OK,
        }
    }

    /// Append a notice
    #[must_use]
    pub fn notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    /// Append notices
    #[must_use]
    pub fn notices(mut self, notices: impl IntoIterator<Item = Notice>) -> Self {
        self.notices.extend(notices);
        self
    }

    /// Override the status code
    #[must_use]
    pub const fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Complete document
    #[must_use]
    pub fn render(&self) -> String {
        let notices: String = self.notices.iter().map(Notice::render).collect();
        LAYOUT_TEMPLATE
            .replace("{{TITLE}}", &text(self.title))
            .replace("{{HEADER}}", &self.header.render())
            .replace("{{NOTICES}}", &notices)
            .replace("{{BODY}}", &self.body)
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Html(self.render())).into_response()
    }
}

/// Values echoed back into the login page forms
#[derive(Debug, Clone, Default)]
pub struct LoginPrefill<'a> {
    /// Login email
    pub login_email: &'a str,
    /// Sign-up email
    pub signup_email: &'a str,
    /// Sign-up full name
    pub signup_full_name: &'a str,
}

/// Login and sign-up page
#[must_use]
pub fn login_page(prefill: &LoginPrefill<'_>) -> Page {
    let body = LOGIN_TEMPLATE
        .replace("{{LOGIN_EMAIL}}", &attr(prefill.login_email))
        .replace("{{SIGNUP_EMAIL}}", &attr(prefill.signup_email))
        .replace("{{SIGNUP_FULL_NAME}}", &attr(prefill.signup_full_name));
    Page::new("Login", Header::None, body)
}

/// `Description:` line; a missing description shows N/A
#[must_use]
pub fn description(value: Option<&str>) -> String {
    format!(
        "<p><strong>Description:</strong> {}</p>",
        text(value.unwrap_or("N/A"))
    )
}

/// Numbered exercise list: `Squat - 3 sets x 10 reps`
#[must_use]
pub fn exercise_list(exercises: &[Exercise]) -> String {
    let mut html = String::from("<p><strong>Exercises:</strong></p><ol class=\"items\">");
    for ex in exercises {
        html.push_str(&format!(
            "<li>{} - {} sets x {} reps</li>",
            text(&ex.name),
            text(&ex.sets),
            text(&ex.reps)
        ));
    }
    html.push_str("</ol>");
    html
}

/// Numbered meal list: name in bold, time in parentheses, items below
#[must_use]
pub fn meal_list(meals: &[Meal]) -> String {
    let mut html = String::from("<p><strong>Meals:</strong></p><ol class=\"items\">");
    for meal in meals {
        html.push_str(&format!(
            "<li><strong>{}</strong> ({})<br>{}</li>",
            text(&meal.name),
            text(&meal.time),
            text(&meal.items)
        ));
    }
    html.push_str("</ol>");
    html
}

/// Long date, e.g. `Monday, June 02, 2025`
#[must_use]
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}

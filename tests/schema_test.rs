// ABOUTME: Static checks on the shipped Supabase schema
// ABOUTME: Every table the portal reads must exist and carry row level security
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use trainer_portal::store::Table;

const SCHEMA: &str = include_str!("../supabase/schema.sql");

#[test]
fn test_schema_creates_every_table() {
    for table in Table::ALL {
        assert!(
            SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
            "missing table {table}"
        );
    }
}

#[test]
fn test_every_table_has_row_level_security() {
    for table in Table::ALL {
        assert!(
            SCHEMA.contains(&format!("ALTER TABLE {table} ENABLE ROW LEVEL SECURITY;")),
            "RLS not enabled on {table}"
        );
        assert!(
            SCHEMA.contains(&format!(" ON {table}\n")),
            "no policy on {table}"
        );
    }
}

#[test]
fn test_profile_trigger_copies_sign_up_metadata() {
    assert!(SCHEMA.contains("CREATE TRIGGER on_auth_user_created"));
    assert!(SCHEMA.contains("raw_user_meta_data ->> 'full_name'"));
    assert!(SCHEMA.contains("raw_user_meta_data ->> 'role'"));
}

#[test]
fn test_assignments_cascade_with_their_plans() {
    assert!(SCHEMA.contains("workout_id UUID NOT NULL REFERENCES workouts (id) ON DELETE CASCADE"));
    assert!(SCHEMA.contains("meal_plan_id UUID NOT NULL REFERENCES meal_plans (id) ON DELETE CASCADE"));
}

/// Target table and the tables named in `FROM` clauses, for every policy
fn policy_references() -> Vec<(String, Vec<String>)> {
    SCHEMA
        .split(';')
        .map(|statement| {
            statement
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|statement| statement.trim_start().starts_with("CREATE POLICY"))
        .map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            let target = tokens
                .iter()
                .position(|t| *t == "ON")
                .map(|i| tokens[i + 1].to_owned())
                .expect("policy without target table");
            let referenced = tokens
                .windows(2)
                .filter(|pair| pair[0].eq_ignore_ascii_case("FROM"))
                .map(|pair| pair[1].trim_start_matches("public.").to_owned())
                .collect();
            (target, referenced)
        })
        .collect()
}

#[test]
fn test_policies_never_reference_each_others_tables() {
    let references = policy_references();
    assert!(references.len() >= 10, "expected a policy per table and action");

    let reads = |from: &str, to: &str| {
        references
            .iter()
            .any(|(target, referenced)| target == from && referenced.iter().any(|r| r == to))
    };
    for (target, referenced) in &references {
        for other in referenced {
            assert!(
                !reads(other, target),
                "policies on {target} and {other} query each other and would recurse"
            );
        }
    }
    assert!(!reads("workouts", "workout_assignments"));
    assert!(!reads("workout_assignments", "workouts"));
    assert!(!reads("meal_plans", "meal_assignments"));
    assert!(!reads("meal_assignments", "meal_plans"));
}

#[test]
fn test_policy_helpers_run_as_definer() {
    for helper in [
        "owns_workout",
        "owns_meal_plan",
        "is_assigned_workout",
        "is_assigned_meal_plan",
        "is_trainer",
    ] {
        let start = SCHEMA
            .find(&format!("CREATE OR REPLACE FUNCTION public.{helper}("))
            .unwrap_or_else(|| panic!("missing helper {helper}"));
        let header = &SCHEMA[start..start + SCHEMA[start..].find("AS $$").unwrap()];
        assert!(
            header.contains("SECURITY DEFINER SET search_path = public"),
            "{helper} must run as definer"
        );
        assert!(
            SCHEMA.contains(&format!("public.{helper}(")) && SCHEMA.matches(helper).count() > 1,
            "{helper} is never used by a policy"
        );
    }
}

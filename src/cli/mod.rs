use serde_json::Value;

use crate::identity::{HydrateOutcome, UserRecord};

// Render the signed-in user the way the dashboard view shows it.
pub fn render_dashboard(user: &UserRecord) -> String {
    let rows = [("Email", user.email.as_str()), ("Role", user.role.as_str()), ("User ID", user.id.as_str())];
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::from("Dashboard\nWelcome!\n");
    for (k, v) in rows {
        out.push_str(&format!("  {:<width$}  {}\n", format!("{}:", k), v, width = width + 1));
    }
    out
}

pub fn describe_hydration(outcome: &HydrateOutcome) -> String {
    match outcome {
        HydrateOutcome::NoSession => "not logged in".to_string(),
        HydrateOutcome::Restored(u) => format!("logged in as {} ({})", u.email, u.role),
        HydrateOutcome::Rejected(e) => format!("stored session discarded: {}", e),
    }
}

/// Pretty JSON, or the compact form if pretty printing fails.
pub fn format_json(val: &Value) -> String {
    serde_json::to_string_pretty(val).unwrap_or_else(|_| val.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    #[test]
    fn dashboard_lists_identity_fields() {
        let u = UserRecord { id: "42".into(), profile_id: "p".into(), email: "root@example.com".into(), role: "ADMIN".into() };
        let s = render_dashboard(&u);
        assert!(s.contains("Email:"));
        assert!(s.contains("root@example.com"));
        assert!(s.contains("ADMIN"));
        assert!(s.lines().any(|l| l.trim_start().starts_with("User ID:") && l.ends_with("42")));
    }

    #[test]
    fn hydration_descriptions() {
        assert_eq!(describe_hydration(&HydrateOutcome::NoSession), "not logged in");
        let s = describe_hydration(&HydrateOutcome::Rejected(AuthError::ExpiredCredential { expires_at: 5 }));
        assert!(s.starts_with("stored session discarded"));
    }
}

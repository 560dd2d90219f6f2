//! Plain-text summary of a provisioning run

use crate::provision::{AdminProfile, Report};

/// Render the final account report printed after a successful run.
///
/// Account details come from the verified read-back; the credentials echo
/// what the operator configured, since the password is never readable from
/// either backend.
pub fn render(report: &Report, profile: &AdminProfile, login_url: &str) -> String {
    let banner = "=".repeat(65);
    let headline = if report.created {
        "Super Admin Account Created"
    } else {
        "Super Admin Account Updated"
    };

    let mut lines = Vec::new();
    lines.push(banner.clone());
    lines.push(format!("SUCCESS! {}", headline));
    lines.push(banner.clone());
    lines.push(String::new());
    lines.push("ACCOUNT DETAILS:".to_string());
    lines.push(format!("   UID:        {}", report.uid));
    lines.push(format!("   Name:       {}", report.full_name));
    lines.push(format!("   Email:      {}", report.email));
    lines.push(format!("   Roles:      {}", report.roles.join(", ")));
    lines.push(format!("   Department: {}", report.department));
    lines.push(format!("   Position:   {}", report.position));
    lines.push(String::new());
    lines.push("LOGIN CREDENTIALS:".to_string());
    lines.push(format!("   Email:    {}", profile.email));
    lines.push(format!("   Password: {}", profile.password));
    lines.push(String::new());
    lines.push(format!("Login URL: {}", login_url));
    lines.push(String::new());
    lines.push("IMPORTANT:".to_string());
    lines.push("   1. Refresh your browser".to_string());
    lines.push("   2. Log in with the credentials above".to_string());
    lines.push("   3. You should land on the Super Admin Dashboard".to_string());
    lines.push(banner);
    lines.join("\n")
}

//! Plain-text views of the session, health report and admin messages.

use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta, Utc};
use comfy_table::{ContentArrangement, Table};

use crate::client::{AdminMessage, HealthReport};
use crate::session::Session;

const ABOUT_TEXT: &str = "Sistem Pengurusan Identiti Membership FareezOnzz (SPIMF) adalah platform pengurusan keahlian profesional.";
const MEMBER_GREETING: &str =
    "Selamat kembali di Sistem Pengurusan Identiti Membership FareezOnzz (SPIMF)";

/// Renders the dashboard matching the session kind.
pub fn render_session(session: &Session, now: DateTime<Utc>) -> String {
    if session.is_guest {
        render_guest()
    } else {
        render_member(session, now)
    }
}

/// Guest view. Never lists member fields.
pub fn render_guest() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome, Guest!");
    let _ = writeln!(out, "You are in limited access mode");
    let _ = writeln!(out);
    let _ = writeln!(out, "About SPIMF");
    let _ = writeln!(out, "{ABOUT_TEXT}");
    out
}

pub fn render_member(session: &Session, now: DateTime<Utc>) -> String {
    let member = &session.member;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Welcome back, {}!",
        member.display_name().unwrap_or("Member")
    );
    let _ = writeln!(out, "{MEMBER_GREETING}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Status: {}", member.status().unwrap_or("unknown"));
    let _ = writeln!(
        out,
        "Session expires in {}",
        format_duration(session.remaining_at(now))
    );
    let _ = writeln!(out);

    if member.is_empty() {
        let _ = writeln!(out, "No member information available.");
        return out;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    for (field, value) in member.profile_fields() {
        table.add_row(vec![field, value]);
    }
    let _ = writeln!(out, "{table}");
    out
}

pub fn render_health(report: &HealthReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "System is {}", report.spreadsheet);
    let _ = writeln!(out, "{} rows, {} columns", report.rows, report.columns);
    let _ = writeln!(
        out,
        "Operational: {}",
        if report.operational_hours { "Yes" } else { "No" }
    );
    let _ = writeln!(out, "Checked at: {}", report.timestamp);
    out
}

pub fn render_messages(messages: &[AdminMessage]) -> String {
    if messages.is_empty() {
        return "No messages.\n".to_string();
    }

    let mut out = String::new();
    for msg in messages {
        let _ = writeln!(out, "[{}] {}", msg.timestamp, msg.message);
    }
    out
}

/// Formats a duration as `{h}h {m}m`.
pub fn format_duration(delta: TimeDelta) -> String {
    let minutes = delta.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

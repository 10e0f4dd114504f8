//! The single outbound message sent to the mail relay.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attachment::Attachment;
use crate::guest::GuestRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OutboundMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

/// Split a comma-delimited recipient list, dropping blank entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Subject line built from the unit and the named guests.
pub fn derive_subject(unit_id: &str, guests: &[GuestRecord]) -> String {
    let names: Vec<&str> = guests
        .iter()
        .map(|g| g.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .collect();

    match names.as_slice() {
        [] => format!("Guest Registration Form - Unit {}", unit_id),
        [only] => format!("Guest Submission - Unit {} - {}", unit_id, only),
        [first, second, rest @ ..] => format!(
            "Group Submission - Unit {} - {}, {}{}",
            unit_id,
            first,
            second,
            if rest.is_empty() { "" } else { " & others" }
        ),
    }
}

/// The operator's subject when one is set, otherwise the derived one.
pub fn resolve_subject(subject_override: &str, unit_id: &str, guests: &[GuestRecord]) -> String {
    if subject_override.trim().is_empty() {
        derive_subject(unit_id, guests)
    } else {
        subject_override.to_string()
    }
}

/// HTML summary of the registration for the message body.
pub fn render_html(unit_id: &str, guests: &[GuestRecord]) -> String {
    let mut html = format!(
        "<h2>Guest Registration Completed</h2>\
         <p><strong>Unit:</strong> {}</p>\
         <p><strong>Guests:</strong> {}</p>\
         <hr/>",
        escape_html(unit_id),
        guests.len()
    );

    for (i, guest) in guests.iter().enumerate() {
        html.push_str(&format!(
            "<div style=\"margin-bottom: 15px; padding: 10px; border-left: 3px solid #4f46e5;\">\
             <strong>Guest {}: {}</strong><br>\
             ID: {}<br>\
             Stay: {} to {}\
             </div>",
            i + 1,
            escape_html(&guest.name),
            escape_html(&guest.id_number),
            escape_html(guest.check_in()),
            escape_html(guest.check_out()),
        ));
    }

    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<GuestRecord> {
        names
            .iter()
            .map(|name| {
                let mut guest = GuestRecord::new();
                guest.name = name.to_string();
                guest
            })
            .collect()
    }

    #[test]
    fn test_subject_without_names() {
        assert_eq!(
            derive_subject("7A", &named(&["", "  "])),
            "Guest Registration Form - Unit 7A"
        );
        assert_eq!(derive_subject("7A", &[]), "Guest Registration Form - Unit 7A");
    }

    #[test]
    fn test_subject_single_guest() {
        assert_eq!(
            derive_subject("7A", &named(&["Alice", ""])),
            "Guest Submission - Unit 7A - Alice"
        );
    }

    #[test]
    fn test_subject_two_guests() {
        assert_eq!(
            derive_subject("7A", &named(&["Alice", "Bob"])),
            "Group Submission - Unit 7A - Alice, Bob"
        );
    }

    #[test]
    fn test_subject_group_with_others() {
        assert_eq!(
            derive_subject("7A", &named(&["Alice", "Bob", "Carol"])),
            "Group Submission - Unit 7A - Alice, Bob & others"
        );
    }

    #[test]
    fn test_override_wins_unless_blank() {
        let guests = named(&["Alice"]);
        assert_eq!(resolve_subject("Late arrival", "7A", &guests), "Late arrival");
        assert_eq!(
            resolve_subject("   ", "7A", &guests),
            "Guest Submission - Unit 7A - Alice"
        );
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients(" a@example.com, ,b@example.com,, "),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn test_html_lists_each_guest() {
        let mut guests = named(&["Alice", "Bob <b>"]);
        guests[0].id_number = "8001015009087".to_string();
        guests[0].set_check_in("2026-03-01");
        guests[0].set_check_out("2026-03-04");

        let html = render_html("7A", &guests);
        assert!(html.contains("<p><strong>Unit:</strong> 7A</p>"));
        assert!(html.contains("<p><strong>Guests:</strong> 2</p>"));
        assert!(html.contains("Guest 1: Alice"));
        assert!(html.contains("ID: 8001015009087"));
        assert!(html.contains("Stay: 2026-03-01 to 2026-03-04"));
        assert!(html.contains("Guest 2: Bob &lt;b&gt;"));
    }

    #[test]
    fn test_message_serialization_shape() {
        let message = OutboundMessage {
            to: vec!["a@example.com".to_string()],
            subject: "s".to_string(),
            html: "<p></p>".to_string(),
            attachments: vec![],
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["to"][0], "a@example.com");
        assert!(json["attachments"].as_array().unwrap().is_empty());
    }
}

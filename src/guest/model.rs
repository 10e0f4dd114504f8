use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::attachment::FileData;
use crate::validation::{validate_required, ValidationError, ValidationErrors};

/// Date format produced by HTML date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of stay derived from check-in and check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayDuration {
    Days(i64),
    /// Unparsable dates, or check-out not after check-in.
    Invalid,
}

impl fmt::Display for StayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StayDuration::Days(1) => write!(f, "1 day"),
            StayDuration::Days(n) => write!(f, "{} days", n),
            StayDuration::Invalid => write!(f, "Invalid dates"),
        }
    }
}

/// Derive the stay duration. `None` until both dates are filled in.
pub fn stay_duration(check_in: &str, check_out: &str) -> Option<StayDuration> {
    let (check_in, check_out) = (check_in.trim(), check_out.trim());
    if check_in.is_empty() || check_out.is_empty() {
        return None;
    }

    let parsed = (
        NaiveDate::parse_from_str(check_in, DATE_FORMAT),
        NaiveDate::parse_from_str(check_out, DATE_FORMAT),
    );
    let duration = match parsed {
        (Ok(start), Ok(end)) => {
            let days = (end - start).num_days();
            if days > 0 {
                StayDuration::Days(days)
            } else {
                StayDuration::Invalid
            }
        }
        _ => StayDuration::Invalid,
    };
    Some(duration)
}

/// One guest's registration details.
#[derive(Debug, Clone)]
pub struct GuestRecord {
    pub id: Uuid,
    pub name: String,
    pub id_number: String,
    pub contact_number: String,
    pub vehicle_make: String,
    pub vehicle_reg: String,
    pub parking_bay: String,
    check_in: String,
    check_out: String,
    duration: Option<StayDuration>,
    pub identity_document: Option<FileData>,
}

impl Default for GuestRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl GuestRecord {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            id_number: String::new(),
            contact_number: String::new(),
            vehicle_make: String::new(),
            vehicle_reg: String::new(),
            parking_bay: String::new(),
            check_in: String::new(),
            check_out: String::new(),
            duration: None,
            identity_document: None,
        }
    }

    pub fn check_in(&self) -> &str {
        &self.check_in
    }

    pub fn check_out(&self) -> &str {
        &self.check_out
    }

    pub fn duration(&self) -> Option<StayDuration> {
        self.duration
    }

    pub fn set_check_in(&mut self, value: impl Into<String>) {
        self.check_in = value.into();
        self.duration = stay_duration(&self.check_in, &self.check_out);
    }

    pub fn set_check_out(&mut self, value: impl Into<String>) {
        self.check_out = value.into();
        self.duration = stay_duration(&self.check_in, &self.check_out);
    }

    /// Vehicle make and registration as printed on the form.
    pub fn vehicle_description(&self) -> String {
        format!("{} {}", self.vehicle_make, self.vehicle_reg)
            .trim()
            .to_string()
    }

    pub fn apply(&mut self, update: GuestUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(id_number) = update.id_number {
            self.id_number = id_number;
        }
        if let Some(contact_number) = update.contact_number {
            self.contact_number = contact_number;
        }
        if let Some(vehicle_make) = update.vehicle_make {
            self.vehicle_make = vehicle_make;
        }
        if let Some(vehicle_reg) = update.vehicle_reg {
            self.vehicle_reg = vehicle_reg;
        }
        if let Some(parking_bay) = update.parking_bay {
            self.parking_bay = parking_bay;
        }
        if let Some(check_in) = update.check_in {
            self.set_check_in(check_in);
        }
        if let Some(check_out) = update.check_out {
            self.set_check_out(check_out);
        }
    }

    /// Everything that still blocks moving past this guest.
    pub fn missing_fields(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Full name", &mut errors);
        validate_required(&self.id_number, "id_number", "ID / passport number", &mut errors);
        validate_required(&self.contact_number, "contact_number", "Contact number", &mut errors);
        validate_required(&self.check_in, "check_in", "Check-in date", &mut errors);
        validate_required(&self.check_out, "check_out", "Check-out date", &mut errors);
        if self.identity_document.is_none() {
            errors.add(ValidationError::missing_document("identity_document", "ID document"));
        }
        errors
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Partial update of the guest being edited. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct GuestUpdate {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "8001015009087")]
    pub id_number: Option<String>,
    #[schema(example = "0821234567")]
    pub contact_number: Option<String>,
    #[schema(example = "Toyota")]
    pub vehicle_make: Option<String>,
    #[schema(example = "CA 123-456")]
    pub vehicle_reg: Option<String>,
    pub parking_bay: Option<String>,
    #[schema(example = "2026-03-01")]
    pub check_in: Option<String>,
    #[schema(example = "2026-03-04")]
    pub check_out: Option<String>,
}

/// Guest as returned by the API; the identity document is summarised by name.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GuestView {
    pub id: Uuid,
    pub name: String,
    pub id_number: String,
    pub contact_number: String,
    pub vehicle_make: String,
    pub vehicle_reg: String,
    pub parking_bay: String,
    pub check_in: String,
    pub check_out: String,
    #[schema(example = "3 days")]
    pub duration: Option<String>,
    pub identity_document: Option<String>,
    pub complete: bool,
}

impl From<&GuestRecord> for GuestView {
    fn from(guest: &GuestRecord) -> Self {
        Self {
            id: guest.id,
            name: guest.name.clone(),
            id_number: guest.id_number.clone(),
            contact_number: guest.contact_number.clone(),
            vehicle_make: guest.vehicle_make.clone(),
            vehicle_reg: guest.vehicle_reg.clone(),
            parking_bay: guest.parking_bay.clone(),
            check_in: guest.check_in.clone(),
            check_out: guest.check_out.clone(),
            duration: guest.duration.map(|d| d.to_string()),
            identity_document: guest
                .identity_document
                .as_ref()
                .map(|doc| doc.filename.clone()),
            complete: guest.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_scan() -> FileData {
        FileData::new("passport.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[test]
    fn test_duration_counts_nights() {
        assert_eq!(
            stay_duration("2026-03-01", "2026-03-04"),
            Some(StayDuration::Days(3))
        );
        assert_eq!(stay_duration("2026-03-01", "2026-03-04").unwrap().to_string(), "3 days");
    }

    #[test]
    fn test_duration_singular() {
        let duration = stay_duration("2026-02-28", "2026-03-01").unwrap();
        assert_eq!(duration, StayDuration::Days(1));
        assert_eq!(duration.to_string(), "1 day");
    }

    #[test]
    fn test_duration_invalid_when_not_after() {
        assert_eq!(stay_duration("2026-03-04", "2026-03-04"), Some(StayDuration::Invalid));
        assert_eq!(stay_duration("2026-03-04", "2026-03-01"), Some(StayDuration::Invalid));
        assert_eq!(stay_duration("yesterday", "2026-03-01"), Some(StayDuration::Invalid));
        assert_eq!(StayDuration::Invalid.to_string(), "Invalid dates");
    }

    #[test]
    fn test_duration_absent_until_both_dates() {
        assert_eq!(stay_duration("", "2026-03-01"), None);
        assert_eq!(stay_duration("2026-03-01", "  "), None);
    }

    #[test]
    fn test_date_edits_recompute_duration() {
        let mut guest = GuestRecord::new();
        guest.set_check_in("2026-03-01");
        assert_eq!(guest.duration(), None);

        guest.set_check_out("2026-03-08");
        assert_eq!(guest.duration(), Some(StayDuration::Days(7)));

        guest.set_check_in("2026-03-09");
        assert_eq!(guest.duration(), Some(StayDuration::Invalid));

        guest.set_check_out("");
        assert_eq!(guest.duration(), None);
    }

    #[test]
    fn test_apply_leaves_absent_fields() {
        let mut guest = GuestRecord::new();
        guest.name = "Jane Doe".to_string();
        guest.apply(GuestUpdate {
            contact_number: Some("0821234567".to_string()),
            check_in: Some("2026-03-01".to_string()),
            check_out: Some("2026-03-03".to_string()),
            ..Default::default()
        });

        assert_eq!(guest.name, "Jane Doe");
        assert_eq!(guest.contact_number, "0821234567");
        assert_eq!(guest.duration(), Some(StayDuration::Days(2)));
    }

    #[test]
    fn test_new_guest_is_incomplete() {
        let guest = GuestRecord::new();
        let missing = guest.missing_fields();
        assert_eq!(missing.len(), 6);
        assert!(missing.mentions("identity_document"));
        assert!(!guest.is_complete());
    }

    #[test]
    fn test_parking_and_vehicle_are_optional() {
        let mut guest = GuestRecord::new();
        guest.apply(GuestUpdate {
            name: Some("Jane Doe".to_string()),
            id_number: Some("8001015009087".to_string()),
            contact_number: Some("0821234567".to_string()),
            check_in: Some("2026-03-01".to_string()),
            check_out: Some("2026-03-02".to_string()),
            ..Default::default()
        });
        assert!(guest.missing_fields().mentions("identity_document"));

        guest.identity_document = Some(id_scan());
        assert!(guest.is_complete());
    }

    #[test]
    fn test_vehicle_description_trims() {
        let mut guest = GuestRecord::new();
        assert_eq!(guest.vehicle_description(), "");
        guest.vehicle_reg = "CA 123-456".to_string();
        assert_eq!(guest.vehicle_description(), "CA 123-456");
        guest.vehicle_make = "Toyota".to_string();
        assert_eq!(guest.vehicle_description(), "Toyota CA 123-456");
    }

    #[test]
    fn test_view_summarises_document() {
        let mut guest = GuestRecord::new();
        guest.identity_document = Some(id_scan());
        let view = GuestView::from(&guest);
        assert_eq!(view.identity_document.as_deref(), Some("passport.jpg"));
        assert_eq!(view.duration, None);
        assert!(!view.complete);
    }

    #[test]
    fn test_update_deserialization() {
        let json = r#"{ "name": "Jane Doe", "check_out": "2026-03-04" }"#;
        let update: GuestUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.name.as_deref(), Some("Jane Doe"));
        assert_eq!(update.check_in, None);
        assert_eq!(update.check_out.as_deref(), Some("2026-03-04"));
    }
}

//! Field positions on the registration form.
//!
//! Offsets are millimetres from the top-left corner of the page, as measured
//! on the printed form. PDF user space starts bottom-left in points.

use crate::guest::GuestRecord;

/// Millimetres to PDF points (1 mm ≈ 2.835 pt).
pub const MM_TO_PT: f32 = 2.835;

pub const DEFAULT_FONT_SIZE: f32 = 11.0;

/// Fraction of the font size the baseline is lowered by so text sits on the
/// form's ruled lines.
const BASELINE_DROP: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    UnitId,
    GuestName,
    IdNumber,
    ContactNumber,
    Vehicle,
    ParkingBay,
    CheckIn,
    CheckOut,
    Signature,
    SignatureDate,
}

impl FormField {
    /// Text drawn for this field. Missing values come back as empty strings.
    pub fn text_for(&self, guest: &GuestRecord, unit_id: &str, signed_on: &str) -> String {
        match self {
            FormField::UnitId => unit_id.to_string(),
            FormField::GuestName | FormField::Signature => guest.name.clone(),
            FormField::IdNumber => guest.id_number.clone(),
            FormField::ContactNumber => guest.contact_number.clone(),
            FormField::Vehicle => guest.vehicle_description(),
            FormField::ParkingBay => guest.parking_bay.clone(),
            FormField::CheckIn => guest.check_in().to_string(),
            FormField::CheckOut => guest.check_out().to_string(),
            FormField::SignatureDate => signed_on.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPlacement {
    pub field: FormField,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size: f32,
}

impl FieldPlacement {
    const fn new(field: FormField, x_mm: f32, y_mm: f32, size: f32) -> Self {
        Self {
            field,
            x_mm,
            y_mm,
            size,
        }
    }

    pub fn x_pt(&self) -> f32 {
        to_pt(self.x_mm)
    }

    /// Baseline in PDF user space for a page of the given height.
    pub fn y_pt(&self, page_height: f32) -> f32 {
        page_height - to_pt(self.y_mm) - self.size * BASELINE_DROP
    }
}

pub const FIELD_LAYOUT: [FieldPlacement; 10] = [
    FieldPlacement::new(FormField::UnitId, 79.15, 95.98, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::GuestName, 76.59, 106.0, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::IdNumber, 89.18, 115.81, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::ContactNumber, 98.14, 126.05, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::Vehicle, 114.05, 137.75, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::ParkingBay, 99.99, 146.9, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::CheckIn, 86.72, 157.13, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::CheckOut, 89.48, 167.06, DEFAULT_FONT_SIZE),
    FieldPlacement::new(FormField::Signature, 69.82, 236.53, 10.0),
    FieldPlacement::new(FormField::SignatureDate, 64.06, 247.04, DEFAULT_FONT_SIZE),
];

pub fn to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_conversion_flips_vertical_axis() {
        let unit = FIELD_LAYOUT[0];
        assert!(close(unit.x_pt(), 224.39));
        // A4 is 841.89pt tall: 841.89 - 95.98 * 2.835 - 11 * 0.15
        assert!(close(unit.y_pt(841.89), 568.13));
    }

    #[test]
    fn test_signature_uses_smaller_font() {
        let signature = FIELD_LAYOUT
            .iter()
            .find(|p| p.field == FormField::Signature)
            .unwrap();
        assert_eq!(signature.size, 10.0);
        assert!(FIELD_LAYOUT
            .iter()
            .filter(|p| p.field != FormField::Signature)
            .all(|p| p.size == DEFAULT_FONT_SIZE));
    }

    #[test]
    fn test_field_text() {
        let mut guest = GuestRecord::new();
        guest.name = "Jane Doe".to_string();
        guest.vehicle_make = "Toyota".to_string();
        guest.set_check_in("2026-03-01");

        assert_eq!(FormField::UnitId.text_for(&guest, "7A", "2026/03/01"), "7A");
        assert_eq!(FormField::Signature.text_for(&guest, "7A", "2026/03/01"), "Jane Doe");
        assert_eq!(FormField::Vehicle.text_for(&guest, "7A", "2026/03/01"), "Toyota");
        assert_eq!(FormField::ParkingBay.text_for(&guest, "7A", "2026/03/01"), "");
        assert_eq!(FormField::CheckIn.text_for(&guest, "7A", "2026/03/01"), "2026-03-01");
        assert_eq!(
            FormField::SignatureDate.text_for(&guest, "7A", "2026/03/01"),
            "2026/03/01"
        );
    }
}

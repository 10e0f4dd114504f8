mod common;

use chrono::NaiveDate;
use guest_registration_server::form_fill::{fill, fill_on, FormFillError};
use guest_registration_server::guest::GuestRecord;

use common::{blank_template, contains, first_page_content, pageless_template, TEMPLATE_TEXT};

fn guest(name: &str) -> GuestRecord {
    let mut guest = GuestRecord::new();
    guest.apply(common::complete_guest(name));
    guest
}

fn signed_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

#[test]
fn test_one_form_per_guest_in_order() {
    let guests = vec![guest("Alice Smith"), guest("Bob Jones")];
    let forms = fill_on(&blank_template(), &guests, "7A", signed_on()).unwrap();

    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].filename, "GuestForm_Unit7A_Alice_Smith.pdf");
    assert_eq!(forms[1].filename, "GuestForm_Unit7A_Bob_Jones.pdf");
    for (form, name) in forms.iter().zip(["(Alice Smith)", "(Bob Jones)"]) {
        assert!(form.pdf.starts_with(b"%PDF"));
        let content = first_page_content(&form.pdf);
        assert!(contains(&content, "(7A)"), "unit missing from {}", form.filename);
        assert!(contains(&content, name), "guest missing from {}", form.filename);
        assert!(contains(&content, "(2026/03/01)"));
        assert!(contains(&content, TEMPLATE_TEXT));
    }
}

#[test]
fn test_overlay_contains_guest_details() {
    let forms = fill_on(&blank_template(), &[guest("Alice Smith")], "7A", signed_on()).unwrap();
    let content = first_page_content(&forms[0].pdf);

    for expected in [
        "(7A)",
        "(Alice Smith)",
        "(8001015009087)",
        "(0821234567)",
        "(Toyota CA 123-456)",
        "(B12)",
        "(2026-03-01)",
        "(2026-03-04)",
        "(2026/03/01)",
    ] {
        assert!(contains(&content, expected), "missing {}", expected);
    }
}

#[test]
fn test_original_page_content_survives() {
    let forms = fill_on(&blank_template(), &[guest("Alice Smith")], "7A", signed_on()).unwrap();
    let content = first_page_content(&forms[0].pdf);

    assert!(contains(&content, TEMPLATE_TEXT));
    assert!(content.starts_with(b"q"));
}

#[test]
fn test_forms_do_not_share_overlays() {
    let guests = vec![guest("Alice Smith"), guest("Bob Jones")];
    let forms = fill_on(&blank_template(), &guests, "7A", signed_on()).unwrap();

    let second = first_page_content(&forms[1].pdf);
    assert!(contains(&second, "(Bob Jones)"));
    assert!(!contains(&second, "(Alice Smith)"));
}

#[test]
fn test_blank_optional_fields_still_render() {
    let mut sparse = guest("Alice Smith");
    sparse.vehicle_make.clear();
    sparse.vehicle_reg.clear();
    sparse.parking_bay.clear();

    let forms = fill_on(&blank_template(), &[sparse], "7A", signed_on()).unwrap();
    let content = first_page_content(&forms[0].pdf);
    assert!(contains(&content, "() Tj"));
}

#[test]
fn test_filled_form_written_to_disk_is_readable() {
    let forms = fill(&blank_template(), &[guest("Alice Smith")], "7A").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&forms[0].filename);
    std::fs::write(&path, &forms[0].pdf).unwrap();

    let reloaded = lopdf::Document::load(&path).unwrap();
    assert_eq!(reloaded.get_pages().len(), 1);
}

#[test]
fn test_pageless_template_is_render_error() {
    let result = fill_on(&pageless_template(), &[guest("Alice Smith")], "7A", signed_on());
    assert!(matches!(result, Err(FormFillError::Render(_))));
}

#[test]
fn test_garbage_template_is_load_error() {
    let result = fill_on(b"plain text, not a document", &[guest("Alice Smith")], "7A", signed_on());
    assert!(matches!(result, Err(FormFillError::Load(_))));
}

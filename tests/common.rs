#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;

use guest_registration_server::attachment::FileData;
use guest_registration_server::config::{resolve_dispatch_url, AppConfig};
use guest_registration_server::dispatch::{DispatchError, MailRelay, OutboundMessage};
use guest_registration_server::guest::GuestUpdate;
use guest_registration_server::wizard::RegistrationSession;
use guest_registration_server::AppState;

pub const BOUNDARY: &str = "----guestregboundary";

/// Text already printed on the blank template.
pub const TEMPLATE_TEXT: &str = "GUEST REGISTRATION FORM";

/// A one-page A4 PDF whose font resources and MediaBox live on the page
/// tree root, the way many form generators emit them.
pub fn blank_template() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 16.into()]),
            Operation::new("Td", vec![150.into(), 780.into()]),
            Operation::new("Tj", vec![Object::string_literal(TEMPLATE_TEXT)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A structurally valid PDF with an empty page tree.
pub fn pageless_template() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Concatenated content streams of the first page.
pub fn first_page_content(pdf: &[u8]) -> Vec<u8> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    doc.get_page_content(page_id).unwrap()
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack.windows(needle.len()).any(|window| window == needle)
}

pub fn id_scan(filename: &str) -> FileData {
    FileData::new(filename, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

pub fn complete_guest(name: &str) -> GuestUpdate {
    GuestUpdate {
        name: Some(name.to_string()),
        id_number: Some("8001015009087".to_string()),
        contact_number: Some("0821234567".to_string()),
        vehicle_make: Some("Toyota".to_string()),
        vehicle_reg: Some("CA 123-456".to_string()),
        parking_bay: Some("B12".to_string()),
        check_in: Some("2026-03-01".to_string()),
        check_out: Some("2026-03-04".to_string()),
    }
}

/// Walk a fresh session all the way to the review step.
pub fn session_ready_for_review(unit_id: &str, names: &[&str]) -> RegistrationSession {
    let mut session = RegistrationSession::new();
    session
        .configure(Some(unit_id.to_string()), Some(names.len() as u32))
        .unwrap();
    session.advance().unwrap();
    for name in names {
        session.update_current_guest(complete_guest(name)).unwrap();
        session
            .attach_identity_document(id_scan("passport scan.jpg"))
            .unwrap();
        session.advance().unwrap();
    }
    session
        .upload_template(FileData::pdf("template.pdf", blank_template()))
        .unwrap();
    session.advance().unwrap();
    session
}

/// Records every message instead of delivering it.
pub struct MockMailRelay {
    sent: Mutex<Vec<OutboundMessage>>,
    reject_with: Option<u16>,
}

impl MockMailRelay {
    pub fn accepting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: None,
        }
    }

    pub fn rejecting(status: u16) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MailRelay for MockMailRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DispatchError> {
        self.sent.lock().push(message.clone());
        match self.reject_with {
            Some(status) => Err(DispatchError::Rejected {
                status,
                message: Some("SMTP credentials not configured".to_string()),
            }),
            None => Ok(()),
        }
    }
}

pub fn test_config() -> AppConfig {
    let url = resolve_dispatch_url("http://127.0.0.1:3000", "/api/send-email").unwrap();
    AppConfig::with_dispatch_url(url)
}

pub fn test_state(relay: Arc<MockMailRelay>) -> AppState {
    AppState::with_relay(test_config(), relay)
}

/// A `multipart/form-data` body with a single `file` part.
pub fn multipart_file(filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

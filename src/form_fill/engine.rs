//! PDF overlay engine.
//!
//! Each guest gets a freshly parsed copy of the template; nothing drawn for
//! one guest can leak into another's form.

use chrono::{Local, NaiveDate};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::layout::{FieldPlacement, FIELD_LAYOUT};
use super::{FilledForm, FormFillError};
use crate::attachment::underscore_whitespace;
use crate::guest::GuestRecord;

/// Resource name the overlay font is registered under on the page.
const FONT_RESOURCE: &str = "FGuestRegHelv";

/// How the signature date is printed.
pub const SIGNATURE_DATE_FORMAT: &str = "%Y/%m/%d";

const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Fill the template for every guest, signed today.
pub fn fill(
    template: &[u8],
    guests: &[GuestRecord],
    unit_id: &str,
) -> Result<Vec<FilledForm>, FormFillError> {
    fill_on(template, guests, unit_id, Local::now().date_naive())
}

/// Fill the template for every guest with an explicit signature date.
///
/// Output order matches `guests`. The first failure aborts the batch.
pub fn fill_on(
    template: &[u8],
    guests: &[GuestRecord],
    unit_id: &str,
    signed_on: NaiveDate,
) -> Result<Vec<FilledForm>, FormFillError> {
    let signed_on = signed_on.format(SIGNATURE_DATE_FORMAT).to_string();
    guests
        .iter()
        .map(|guest| PdfFormFiller::fill_guest(template, guest, unit_id, &signed_on))
        .collect()
}

/// Output filename for a guest's form. Guests whose names collapse to the
/// same string share a filename.
pub fn form_filename(unit_id: &str, guest_name: &str) -> String {
    format!(
        "GuestForm_Unit{}_{}.pdf",
        unit_id,
        underscore_whitespace(guest_name)
    )
}

/// Stateless engine for stamping text onto the registration template.
pub struct PdfFormFiller;

impl PdfFormFiller {
    pub fn fill_guest(
        template: &[u8],
        guest: &GuestRecord,
        unit_id: &str,
        signed_on: &str,
    ) -> Result<FilledForm, FormFillError> {
        let mut doc = Document::load_mem(template).map_err(FormFillError::Load)?;

        let page_id = first_page(&doc)?;
        let page_height = page_height(&doc, page_id)?;

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        register_font(&mut doc, page_id, font_id).map_err(render_error)?;

        let overlay: Content = Content {
            operations: FIELD_LAYOUT
                .iter()
                .flat_map(|placement| {
                    let text = placement.field.text_for(guest, unit_id, signed_on);
                    text_operations(placement, page_height, &text)
                })
                .collect::<Vec<_>>(),
        };
        let overlay = overlay.encode().map_err(render_error)?;
        append_overlay(&mut doc, page_id, overlay).map_err(render_error)?;

        let mut pdf = Vec::new();
        doc.save_to(&mut pdf).map_err(FormFillError::Save)?;

        log::debug!(
            "Filled form for guest {} ({} bytes)",
            guest.id,
            pdf.len()
        );

        Ok(FilledForm {
            filename: form_filename(unit_id, &guest.name),
            pdf,
        })
    }
}

fn render_error(err: lopdf::Error) -> FormFillError {
    FormFillError::Render(err.to_string())
}

fn first_page(doc: &Document) -> Result<ObjectId, FormFillError> {
    doc.get_pages()
        .into_values()
        .next()
        .ok_or_else(|| FormFillError::Render("template has no pages".to_string()))
}

fn page_height(doc: &Document, page_id: ObjectId) -> Result<f32, FormFillError> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .map_err(render_error)?
        .ok_or_else(|| FormFillError::Render("page has no MediaBox".to_string()))?;

    let corners = media_box
        .as_array()
        .map_err(render_error)?
        .iter()
        .map(|corner| resolve(doc, corner).ok().and_then(number))
        .collect::<Option<Vec<f32>>>()
        .filter(|corners| corners.len() == 4)
        .ok_or_else(|| FormFillError::Render("MediaBox is not four numbers".to_string()))?;

    Ok((corners[3] - corners[1]).abs())
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, lopdf::Error> {
    match object {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, lopdf::Error> {
    let mut node_id = page_id;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = doc.get_dictionary(node_id)?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(resolve(doc, value)?.clone()));
        }
        match node.get(b"Parent") {
            Ok(parent) => node_id = parent.as_reference()?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// The page's own resource dictionary, materialising inherited resources on
/// the page first.
fn resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, lopdf::Error> {
    if !doc.get_dictionary(page_id)?.has(b"Resources") {
        let inherited = inherited_attribute(doc, page_id, b"Resources")?
            .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));
        doc.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", inherited);
    }

    let shared = match doc.get_dictionary(page_id)?.get(b"Resources")? {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    match shared {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut(),
        None => doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut(),
    }
}

fn register_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<(), lopdf::Error> {
    let shared_fonts = match resources_mut(doc, page_id)?.get(b"Font") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    let fonts = match shared_fonts {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => {
            let resources = resources_mut(doc, page_id)?;
            if !matches!(resources.get(b"Font"), Ok(Object::Dictionary(_))) {
                resources.set("Font", Dictionary::new());
            }
            resources.get_mut(b"Font")?.as_dict_mut()?
        }
    };
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    Ok(())
}

fn text_operations(placement: &FieldPlacement, page_height: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                placement.size.into(),
            ],
        ),
        Operation::new(
            "rg",
            vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
        ),
        Operation::new(
            "Td",
            vec![placement.x_pt().into(), placement.y_pt(page_height).into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Keep the existing page content isolated in `q ... Q` and draw the overlay
/// after it.
fn append_overlay(doc: &mut Document, page_id: ObjectId, overlay: Vec<u8>) -> Result<(), lopdf::Error> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(streams) => streams.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(streams)) => streams.clone(),
        _ => Vec::new(),
    };

    let save = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let overlay = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(save));
    contents.extend(existing);
    contents.push(Object::Reference(restore));
    contents.push(Object::Reference(overlay));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Encode text for a WinAnsi Type1 font. Unmappable characters print as `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '\t' | '\n' | '\r' => b' ',
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

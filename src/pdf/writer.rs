//! Page composition with lopdf.
//!
//! Pages use the PDF coordinate system: origin at the bottom-left corner,
//! Y increasing upward, units in points (1/72 inch).

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::Result;

/// US Letter width in points.
pub const LETTER_WIDTH: i64 = 612;
/// US Letter height in points.
pub const LETTER_HEIGHT: i64 = 792;

/// Value written to the `/Creator` info entry of created documents.
pub const CREATOR: &str = "pdf-tools-mcp-server";

const LEFT_MARGIN: i64 = 50;

const TITLE_FONT: &str = "Helvetica-Bold";
const TITLE_FONT_SIZE: i64 = 16;
const TITLE_Y: i64 = 750;

const BODY_FONT: &str = "Helvetica";
const BODY_FONT_SIZE: i64 = 12;
const BODY_Y: i64 = 720;
/// 1.2 x body font size.
const BODY_LEADING: f32 = 14.4;

const OVERLAY_FONT: &str = "Helvetica";
const OVERLAY_FONT_SIZE: i64 = 10;
const OVERLAY_Y: i64 = 50;

/// Resource name of the overlay font. Chosen to stay clear of names that
/// producers usually generate (`F1`, `TT0`, ...).
pub const OVERLAY_FONT_NAME: &str = "FPdfToolsOverlay";

/// Encode text for a standard Type1 font using `/WinAnsiEncoding`.
///
/// Latin-1 maps directly; a few common typographic characters map to their
/// WinAnsi slots. Anything else, including control characters, becomes `?`.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

fn text_literal(text: &str) -> Object {
    Object::String(win_ansi_bytes(text), StringFormat::Literal)
}

fn font_name(name: &str) -> Object {
    Object::Name(name.as_bytes().to_vec())
}

/// Dictionary for one of the standard 14 Type1 fonts.
pub fn standard_font(base_font: &str) -> Dictionary {
    Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", font_name(base_font)),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

/// Operations drawing `title` in bold and `text` below it, one line per
/// `\n`-separated segment. Nothing wraps; lines past the page bottom are
/// still emitted but fall outside the media box.
fn text_page_operations(title: &str, text: &str) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![font_name("F2"), Object::Integer(TITLE_FONT_SIZE)],
        ),
        Operation::new(
            "Td",
            vec![Object::Integer(LEFT_MARGIN), Object::Integer(TITLE_Y)],
        ),
        Operation::new("Tj", vec![text_literal(title)]),
        Operation::new("ET", vec![]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![font_name("F1"), Object::Integer(BODY_FONT_SIZE)],
        ),
        Operation::new("TL", vec![Object::Real(BODY_LEADING)]),
        Operation::new(
            "Td",
            vec![Object::Integer(LEFT_MARGIN), Object::Integer(BODY_Y)],
        ),
    ];

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        ops.push(Operation::new("Tj", vec![text_literal(line)]));
    }

    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Build a one-page letter document showing `title` and `text`.
///
/// The document info carries `/Title` and `/Creator`.
pub fn text_page_document(title: &str, text: &str) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font_id = doc.add_object(standard_font(BODY_FONT));
    let title_font_id = doc.add_object(standard_font(TITLE_FONT));

    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([
            ("F1", Object::Reference(body_font_id)),
            ("F2", Object::Reference(title_font_id)),
        ])),
    )]));

    let content = Content {
        operations: text_page_operations(title, text),
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let page_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Reference(resources_id)),
        ("MediaBox", letter_media_box()),
    ]));

    let pages = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = add_info(&mut doc, title);
    doc.trailer.set("Info", Object::Reference(info_id));

    Ok(doc)
}

fn add_info(doc: &mut Document, title: &str) -> ObjectId {
    doc.add_object(Dictionary::from_iter([
        ("Title", text_info_string(title)),
        ("Creator", text_info_string(CREATOR)),
    ]))
}

/// Info strings are text strings: PDFDocEncoding when the text fits,
/// UTF-16BE with a byte order mark otherwise.
fn text_info_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn letter_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(LETTER_WIDTH),
        Object::Integer(LETTER_HEIGHT),
    ])
}

/// Content drawn on top of an existing page.
pub struct Overlay {
    /// Drawing operations; fonts are referenced by resource name.
    pub content: Content,
    /// Fonts the content needs, keyed by resource name.
    pub fonts: Vec<(String, Dictionary)>,
}

impl Overlay {
    /// A single line of text near the bottom-left corner of the page.
    ///
    /// Line breaks are not interpreted.
    pub fn footer_line(text: &str) -> Self {
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![font_name(OVERLAY_FONT_NAME), Object::Integer(OVERLAY_FONT_SIZE)],
                ),
                Operation::new(
                    "Td",
                    vec![Object::Integer(LEFT_MARGIN), Object::Integer(OVERLAY_Y)],
                ),
                Operation::new("Tj", vec![text_literal(text)]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };

        Self {
            content,
            fonts: vec![(OVERLAY_FONT_NAME.to_string(), standard_font(OVERLAY_FONT))],
        }
    }
}

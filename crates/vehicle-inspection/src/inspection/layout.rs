//! Minimal top-down page writer on top of `lopdf`.
//!
//! The writer keeps a cursor measured from the top edge of the current page.
//! Every text line and image first checks the space left above the bottom
//! margin and opens a new page when it would not fit; a running section
//! header, when set, is repeated at the top of each new page. Pages are only
//! turned into PDF objects by [`DocumentWriter::finish`], which is also where
//! the "Page i of n" footers are stamped.

use super::compose::RenderError;
use super::image::DecodedImage;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;
pub const PAGE_MARGIN: f32 = 50.0;

const LINE_SPACING: f32 = 1.2;
const ASCENT: f32 = 0.8;
const IMAGE_GAP: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    pub const fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: PAGE_MARGIN,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Distance from the top edge past which nothing may be drawn.
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    const fn resource_name(self) -> &'static [u8] {
        match self {
            Self::Regular => b"F1",
            Self::Bold => b"F2",
        }
    }

    const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: [f32; 3],
}

impl TextStyle {
    pub const TITLE: Self = Self::new(Font::Bold, 20.0, [0.0, 0.0, 0.0]);
    pub const SECTION: Self = Self::new(Font::Bold, 14.0, [0.1, 0.2, 0.45]);
    pub const ITEM: Self = Self::new(Font::Bold, 12.0, [0.0, 0.0, 0.0]);
    pub const BODY: Self = Self::new(Font::Regular, 12.0, [0.0, 0.0, 0.0]);
    pub const NOTE: Self = Self::new(Font::Regular, 11.0, [0.2, 0.2, 0.2]);
    pub const DIAGNOSTIC: Self = Self::new(Font::Regular, 10.0, [0.75, 0.1, 0.1]);
    pub const FOOTER: Self = Self::new(Font::Regular, 9.0, [0.45, 0.45, 0.45]);

    pub const fn new(font: Font, size: f32, color: [f32; 3]) -> Self {
        Self { font, size, color }
    }

    pub fn line_height(&self) -> f32 {
        self.size * LINE_SPACING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Largest area an image may occupy; it is scaled to fit, aspect preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    pub width: f32,
    pub height: f32,
}

/// Where an image ended up. `top` is measured from the page's top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Document-level metadata written to the trailer's `Info` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    /// PDF date string, e.g. `D:20261016083000Z`.
    pub creation_date: String,
}

#[derive(Debug, Default)]
struct PageBuffer {
    operations: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

pub struct DocumentWriter {
    doc: Document,
    geometry: PageGeometry,
    pages: Vec<PageBuffer>,
    cursor: f32,
    running_header: Option<String>,
    image_count: usize,
}

impl DocumentWriter {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            geometry,
            pages: vec![PageBuffer::default()],
            cursor: geometry.margin,
            running_header: None,
            image_count: 0,
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn remaining_height(&self) -> f32 {
        self.geometry.bottom_limit() - self.cursor
    }

    /// Header repeated at the top of every page opened from now on.
    pub fn set_running_header(&mut self, header: Option<String>) {
        self.running_header = header;
    }

    pub fn new_page(&mut self) {
        self.pages.push(PageBuffer::default());
        self.cursor = self.geometry.margin;

        if let Some(header) = self.running_header.clone() {
            self.draw_line(&header, TextStyle::SECTION, Align::Left, 0.0);
            self.cursor += TextStyle::SECTION.line_height() * 0.4;
        }
    }

    /// Opens a new page when `height` does not fit above the bottom margin.
    /// A fresh page never breaks again, so oversized content cannot loop.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        let fresh_page = self.cursor <= self.geometry.margin;
        if self.cursor + height > self.geometry.bottom_limit() && !fresh_page {
            self.new_page();
            return true;
        }
        false
    }

    pub fn move_down(&mut self, amount: f32) {
        self.cursor += amount;
    }

    /// Writes `text` word-wrapped to the content width minus `indent`.
    pub fn write_text(&mut self, text: &str, style: TextStyle, indent: f32) {
        let max_width = self.geometry.content_width() - indent;
        for line in wrap_text(text, style.size, max_width) {
            self.ensure_space(style.line_height());
            self.draw_line(&line, style, Align::Left, indent);
        }
    }

    pub fn write_centered(&mut self, text: &str, style: TextStyle) {
        let max_width = self.geometry.content_width();
        for line in wrap_text(text, style.size, max_width) {
            self.ensure_space(style.line_height());
            self.draw_line(&line, style, Align::Center, 0.0);
        }
    }

    /// Horizontal rule across the content width at the cursor.
    pub fn rule(&mut self) {
        self.ensure_space(IMAGE_GAP);
        let y = self.geometry.height - self.cursor - IMAGE_GAP / 2.0;
        let left = self.geometry.margin;
        let right = self.geometry.width - self.geometry.margin;
        self.current_page().operations.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![Object::from(0.75_f32)]),
            Operation::new(
                "RG",
                vec![
                    Object::from(0.6_f32),
                    Object::from(0.6_f32),
                    Object::from(0.6_f32),
                ],
            ),
            Operation::new("m", vec![Object::from(left), Object::from(y)]),
            Operation::new("l", vec![Object::from(right), Object::from(y)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.cursor += IMAGE_GAP;
    }

    /// Places `image` at the cursor, left/top aligned inside `bounds`.
    ///
    /// The page is broken beforehand when less than `bounds.height` remains.
    pub fn place_image(
        &mut self,
        image: &DecodedImage,
        bounds: ImageBox,
    ) -> std::io::Result<Placement> {
        self.ensure_space(bounds.height);

        let scale = (bounds.width / image.width as f32).min(bounds.height / image.height as f32);
        let width = image.width as f32 * scale;
        let height = image.height as f32 * scale;
        let left = self.geometry.margin;
        let top = self.cursor;

        let xobject = image_xobject(image)?;
        let object_id = self.doc.add_object(xobject);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let bottom = self.geometry.height - top - height;
        let page = self.current_page();
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::from(width),
                    Object::from(0.0_f32),
                    Object::from(0.0_f32),
                    Object::from(height),
                    Object::from(left),
                    Object::from(bottom),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        page.images.push((name, object_id));

        self.cursor += height + IMAGE_GAP;
        Ok(Placement {
            page: self.pages.len(),
            left,
            top,
            width,
            height,
        })
    }

    /// Stamps footers, emits every page object and serializes the document.
    pub fn finish<F>(mut self, info: &DocumentInfo, footer: F) -> Result<Vec<u8>, RenderError>
    where
        F: Fn(usize, usize) -> String,
    {
        let total = self.pages.len();
        let geometry = self.geometry;

        let regular_id = self.doc.add_object(font_dictionary(Font::Regular));
        let bold_id = self.doc.add_object(font_dictionary(Font::Bold));
        let pages_id = self.doc.new_object_id();

        let mut kids = Vec::with_capacity(total);
        for (index, mut page) in std::mem::take(&mut self.pages).into_iter().enumerate() {
            let number = index + 1;
            let text = footer(number, total);
            let x = aligned_x(&geometry, &text, TextStyle::FOOTER, Align::Center, 0.0);
            page.operations
                .extend(text_operations(&text, TextStyle::FOOTER, x, geometry.margin / 2.0));

            let content = Content {
                operations: page.operations,
            }
            .encode()
            .map_err(|source| RenderError::EncodePage {
                page: number,
                source,
            })?;
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name.into_bytes(), Object::Reference(id));
            }

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => regular_id,
                        "F2" => bold_id,
                    },
                    "XObject" => xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => total as i64,
                "MediaBox" => vec![
                    Object::from(0_i64),
                    Object::from(0_i64),
                    Object::from(geometry.width),
                    Object::from(geometry.height),
                ],
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_text(&info.title)),
            "Producer" => Object::string_literal(encode_text(&info.producer)),
            "CreationDate" => Object::string_literal(info.creation_date.as_bytes().to_vec()),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|err| RenderError::Finalize(err.to_string()))?;
        Ok(buffer)
    }

    fn current_page(&mut self) -> &mut PageBuffer {
        if self.pages.is_empty() {
            self.pages.push(PageBuffer::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn draw_line(&mut self, text: &str, style: TextStyle, align: Align, indent: f32) {
        let geometry = self.geometry;
        let x = aligned_x(&geometry, text, style, align, indent);
        let baseline = geometry.height - self.cursor - style.size * ASCENT;
        self.current_page()
            .operations
            .extend(text_operations(text, style, x, baseline));
        self.cursor += style.line_height();
    }
}

fn aligned_x(geometry: &PageGeometry, text: &str, style: TextStyle, align: Align, indent: f32) -> f32 {
    match align {
        Align::Left => geometry.margin + indent,
        Align::Center => {
            let width = text_width(text, style.size);
            geometry.margin + ((geometry.content_width() - width) / 2.0).max(0.0)
        }
    }
}

fn text_operations(text: &str, style: TextStyle, x: f32, baseline: f32) -> Vec<Operation> {
    let [r, g, b] = style.color;
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "rg",
            vec![Object::from(r), Object::from(g), Object::from(b)],
        ),
        Operation::new(
            "Tf",
            vec![
                Object::Name(style.font.resource_name().to_vec()),
                Object::from(style.size),
            ],
        ),
        Operation::new("Td", vec![Object::from(x), Object::from(baseline)]),
        Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
        Operation::new("ET", vec![]),
    ]
}

fn font_dictionary(font: Font) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn image_xobject(image: &DecodedImage) -> std::io::Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&image.rgb)?;
    let compressed = encoder.finish()?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, compressed))
}

/// Maps text onto WinAnsiEncoding bytes for the standard Type 1 fonts.
/// Characters the encoding cannot express become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\t' => b' ',
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];
const DEFAULT_WIDTH: u16 = 556;

/// Approximate rendered width in points. Bold text is measured with the
/// regular metrics, which slightly underestimates it.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = encode_text(text)
        .into_iter()
        .map(|byte| match byte {
            32..=126 => u32::from(HELVETICA_WIDTHS[usize::from(byte - 32)]),
            _ => u32::from(DEFAULT_WIDTH),
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Explicit newlines are kept; words wider than a whole
/// line are split by character.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n').map(|line| line.trim_end_matches('\r')) {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width(word, size) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    let mut widened = current.clone();
                    widened.push(ch);
                    if !current.is_empty() && text_width(&widened, size) > max_width {
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    } else {
                        current = widened;
                    }
                }
            }
        }

        lines.push(current);
    }

    lines
}

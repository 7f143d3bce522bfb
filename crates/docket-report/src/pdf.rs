//! PDF output through `printpdf`'s built-in Helvetica faces.

use crate::error::{ReportError, Result};
use crate::layout::{Font, Mark, Page, PageGeometry};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const LAYER: &str = "Layer 1";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let font = |face| doc.add_builtin_font(face).map_err(render);
        Ok(Self {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Italic => &self.italic,
        }
    }
}

fn render(e: printpdf::Error) -> ReportError {
    ReportError::RenderFailure(format!("{e:?}"))
}

/// Built-in fonts only cover a single-byte encoding.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

/// Write laid-out pages to `path`.
pub(crate) fn write_pdf(
    title: &str,
    pages: &[Page],
    geometry: &PageGeometry,
    path: &Path,
) -> Result<()> {
    let (width, height) = (Mm(geometry.width_mm), Mm(geometry.height_mm));
    let title = printable(title);
    let (doc, first_page, first_layer) = PdfDocument::new(title.as_str(), width, height, LAYER);
    let fonts = Fonts::load(&doc)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, LAYER);
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw(&layer, page, geometry, &fonts);
    }

    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    doc.save(&mut BufWriter::new(file)).map_err(render)
}

fn draw(layer: &PdfLayerReference, page: &Page, geometry: &PageGeometry, fonts: &Fonts) {
    let flip = |y: f32| Mm(geometry.height_mm - y);
    layer.set_outline_thickness(0.5);

    for mark in page.marks() {
        match mark {
            Mark::Text {
                x,
                y,
                size,
                font,
                text,
            } => {
                layer.use_text(printable(text), *size, Mm(*x), flip(*y), fonts.get(*font));
            }
            Mark::Line { x1, y1, x2, y2 } => {
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1), flip(*y1)), false),
                        (Point::new(Mm(*x2), flip(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

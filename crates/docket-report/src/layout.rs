//! Placing a [`Document`] on fixed-size pages.
//!
//! Coordinates are millimetres with `y` measured down from the top edge of the
//! page; the PDF writer flips them. Text widths are estimated from the average
//! Helvetica glyph width, which is all centering needs.

use crate::document::{Block, Document, Table, TextStyle};
use crate::wrap::wrap_text;

const PT_TO_MM: f32 = 0.3528;
const AVG_GLYPH_EM: f32 = 0.5;

const TABLE_SIZE: f32 = 8.0;
const TABLE_HEADER_SIZE: f32 = 9.0;
const TABLE_LEADING: f32 = 3.6;
const CELL_PAD_Y: f32 = 1.2;
const CELL_PAD_X: f32 = 1.4;

/// Page size and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub width_mm: f32,
    /// Page height
    pub height_mm: f32,
    /// Left and right margin
    pub margin_x_mm: f32,
    /// Top margin
    pub margin_top_mm: f32,
    /// Bottom margin, which the footer sits in
    pub margin_bottom_mm: f32,
    /// Characters per line of body text
    pub body_wrap: usize,
}

impl Default for PageGeometry {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_x_mm: 10.0,
            margin_top_mm: 12.7,
            margin_bottom_mm: 12.7,
            body_wrap: 100,
        }
    }
}

impl PageGeometry {
    fn content_width(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_x_mm
    }

    fn bottom(&self) -> f32 {
        self.height_mm - self.margin_bottom_mm
    }
}

/// Built-in font faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica Bold
    Bold,
    /// Helvetica Oblique
    Italic,
}

/// Something drawn on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// A single line of text; `y` is the baseline
    Text {
        /// Left edge, millimetres from the left of the page
        x: f32,
        /// Baseline, millimetres from the top of the page
        y: f32,
        /// Font size in points
        size: f32,
        /// Face
        font: Font,
        /// Content, already wrapped
        text: String,
    },
    /// A straight rule, in millimetres from the top-left corner
    Line {
        /// Start x
        x1: f32,
        /// Start y
        y1: f32,
        /// End x
        x2: f32,
        /// End y
        y2: f32,
    },
}

/// One laid-out page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    marks: Vec<Mark>,
}

impl Page {
    /// Everything on the page in drawing order.
    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Text lines on the page in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().filter_map(|mark| match mark {
            Mark::Text { text, .. } => Some(text.as_str()),
            Mark::Line { .. } => None,
        })
    }
}

struct Metrics {
    size: f32,
    leading: f32,
    font: Font,
    space_before: f32,
    space_after: f32,
    wrap: usize,
    centered: bool,
}

fn metrics(style: TextStyle, geometry: &PageGeometry) -> Metrics {
    match style {
        TextStyle::Title => Metrics {
            size: 14.0,
            leading: 7.0,
            font: Font::Bold,
            space_before: 0.0,
            space_after: 5.0,
            wrap: 60,
            centered: true,
        },
        TextStyle::Heading => Metrics {
            size: 11.0,
            leading: 5.5,
            font: Font::Bold,
            space_before: 4.0,
            space_after: 1.5,
            wrap: 80,
            centered: false,
        },
        TextStyle::Body => Metrics {
            size: 9.0,
            leading: 4.2,
            font: Font::Regular,
            space_before: 0.0,
            space_after: 0.0,
            wrap: geometry.body_wrap,
            centered: false,
        },
        TextStyle::Note => Metrics {
            size: 8.0,
            leading: 3.8,
            font: Font::Regular,
            space_before: 0.0,
            space_after: 0.5,
            wrap: geometry.body_wrap + geometry.body_wrap / 10,
            centered: false,
        },
        TextStyle::Footer => Metrics {
            size: 7.0,
            leading: 3.5,
            font: Font::Italic,
            space_before: 3.0,
            space_after: 0.0,
            wrap: geometry.body_wrap + geometry.body_wrap / 5,
            centered: true,
        },
    }
}

fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

/// Lay out `document` and number the pages.
#[must_use]
pub fn paginate(document: &Document, geometry: &PageGeometry) -> Vec<Page> {
    let mut layout = Layout::new(geometry);

    for block in document.blocks() {
        match block {
            Block::Text { style, text } => layout.text(*style, text),
            Block::Field { label, value } => layout.field(label, value),
            Block::Table(table) => layout.table(table),
            Block::Spacer(height) => layout.space(*height),
        }
    }

    let mut pages = layout.finish();
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        let label = format!("Page {} of {}", index + 1, total);
        page.marks.push(Mark::Text {
            x: geometry.width_mm - geometry.margin_x_mm - estimated_width(&label, 7.0),
            y: geometry.height_mm - geometry.margin_bottom_mm / 2.0,
            size: 7.0,
            font: Font::Regular,
            text: label,
        });
    }
    pages
}

struct Layout<'g> {
    geometry: &'g PageGeometry,
    done: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl<'g> Layout<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            done: Vec::new(),
            current: Page::default(),
            cursor: geometry.margin_top_mm,
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.done.push(self.current);
        self.done
    }

    fn remaining(&self) -> f32 {
        self.geometry.bottom() - self.cursor
    }

    fn at_top(&self) -> bool {
        self.cursor <= self.geometry.margin_top_mm + f32::EPSILON
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.done.push(page);
        self.cursor = self.geometry.margin_top_mm;
    }

    /// Start a new page unless `height` fits or the page is still empty.
    fn reserve(&mut self, height: f32) {
        if height > self.remaining() && !self.at_top() {
            self.new_page();
        }
    }

    fn space(&mut self, height: f32) {
        if self.at_top() {
            return;
        }
        self.cursor += height;
        if self.cursor >= self.geometry.bottom() {
            self.new_page();
        }
    }

    fn put(&mut self, x: f32, y: f32, size: f32, font: Font, text: String) {
        self.current.marks.push(Mark::Text {
            x,
            y,
            size,
            font,
            text,
        });
    }

    fn rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.current.marks.push(Mark::Line { x1, y1, x2, y2 });
    }

    fn text(&mut self, style: TextStyle, text: &str) {
        let m = metrics(style, self.geometry);
        let lines = wrap_text(text, m.wrap);
        if lines.is_empty() {
            return;
        }

        self.space(m.space_before);
        // keep a heading with the first line of what follows
        let keep = if style == TextStyle::Heading {
            m.leading + TABLE_LEADING * 2.0 + CELL_PAD_Y * 2.0
        } else {
            m.leading
        };
        self.reserve(keep);

        for line in lines {
            self.reserve(m.leading);
            let x = if m.centered {
                let offset = (self.geometry.content_width() - estimated_width(&line, m.size)) / 2.0;
                self.geometry.margin_x_mm + offset.max(0.0)
            } else {
                self.geometry.margin_x_mm
            };
            let baseline = self.cursor + m.leading * 0.75;
            self.put(x, baseline, m.size, m.font, line);
            self.cursor += m.leading;
        }

        self.space(m.space_after);
    }

    fn field(&mut self, label: &str, value: &str) {
        let m = metrics(TextStyle::Body, self.geometry);
        let label = format!("{label}:");
        let label_chars = label.chars().count() + 1;
        let value_x = self.geometry.margin_x_mm + estimated_width(&label, m.size) + 1.5;
        let mut lines = wrap_text(value, m.wrap.saturating_sub(label_chars).max(10));
        if lines.is_empty() {
            lines.push("N/A".to_string());
        }

        self.reserve(m.leading);
        let baseline = self.cursor + m.leading * 0.75;
        self.put(self.geometry.margin_x_mm, baseline, m.size, Font::Bold, label);

        for (index, line) in lines.into_iter().enumerate() {
            if index > 0 {
                self.reserve(m.leading);
            }
            let baseline = self.cursor + m.leading * 0.75;
            self.put(value_x, baseline, m.size, m.font, line);
            self.cursor += m.leading;
        }
    }

    fn table(&mut self, table: &Table) {
        if table.is_empty() {
            return;
        }
        let [left, right] = *table.columns();
        let x0 = self.geometry.margin_x_mm;
        let x1 = x0 + left.width_mm;
        let x2 = x1 + right.width_mm;

        let header = [
            wrap_text(&table.header()[0], left.wrap),
            wrap_text(&table.header()[1], right.wrap),
        ];
        let header_lines = header[0].len().max(header[1].len()).max(1);
        let header_height = header_lines as f32 * TABLE_LEADING + 2.0 * CELL_PAD_Y;

        self.reserve(header_height + TABLE_LEADING + 2.0 * CELL_PAD_Y);
        self.table_header(&header, header_height, [x0, x1, x2]);

        let page_capacity = self.geometry.bottom() - self.geometry.margin_top_mm - header_height;

        for row in table.rows() {
            let cells = [wrap_text(&row[0], left.wrap), wrap_text(&row[1], right.wrap)];
            let total = cells[0].len().max(cells[1].len()).max(1);
            let mut start = 0;
            let mut fresh = false;

            while start < total {
                let space = self.remaining() - 2.0 * CELL_PAD_Y;
                let mut capacity = if space > 0.0 {
                    (space / TABLE_LEADING).floor() as usize
                } else {
                    0
                };
                if fresh {
                    capacity = capacity.max(1);
                }

                let left_lines = total - start;
                let fits_fresh =
                    left_lines as f32 * TABLE_LEADING + 2.0 * CELL_PAD_Y <= page_capacity;
                let should_break =
                    capacity == 0 || (start == 0 && capacity < left_lines && fits_fresh);
                if should_break && !fresh {
                    self.new_page();
                    self.table_header(&header, header_height, [x0, x1, x2]);
                    fresh = true;
                    continue;
                }

                let take = capacity.min(left_lines);
                self.row_segment(&cells, start, take, [x0, x1, x2]);
                start += take;
                fresh = false;
            }
        }

        self.space(2.5);
    }

    fn table_header(&mut self, header: &[Vec<String>; 2], height: f32, xs: [f32; 3]) {
        let top = self.cursor;
        self.rule(xs[0], top, xs[2], top);
        for (column, lines) in header.iter().enumerate() {
            for (index, line) in lines.iter().enumerate() {
                let baseline = top + CELL_PAD_Y + (index as f32 + 0.8) * TABLE_LEADING;
                self.put(
                    xs[column] + CELL_PAD_X,
                    baseline,
                    TABLE_HEADER_SIZE,
                    Font::Bold,
                    line.clone(),
                );
            }
        }
        self.verticals(top, top + height, xs);
        self.rule(xs[0], top + height, xs[2], top + height);
        self.cursor = top + height;
    }

    fn row_segment(&mut self, cells: &[Vec<String>; 2], start: usize, take: usize, xs: [f32; 3]) {
        let top = self.cursor;
        let height = take as f32 * TABLE_LEADING + 2.0 * CELL_PAD_Y;
        for (column, lines) in cells.iter().enumerate() {
            for (offset, line) in lines.iter().skip(start).take(take).enumerate() {
                let baseline = top + CELL_PAD_Y + (offset as f32 + 0.8) * TABLE_LEADING;
                self.put(
                    xs[column] + CELL_PAD_X,
                    baseline,
                    TABLE_SIZE,
                    Font::Regular,
                    line.clone(),
                );
            }
        }
        self.verticals(top, top + height, xs);
        self.rule(xs[0], top + height, xs[2], top + height);
        self.cursor = top + height;
    }

    fn verticals(&mut self, top: f32, bottom: f32, xs: [f32; 3]) {
        for x in xs {
            self.rule(x, top, x, bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Column;

    fn table_with(rows: usize, value: &str) -> Table {
        let mut table = Table::new(
            [Column::new(30, 46.0), Column::new(50, 114.0)],
            ["Field", "Value"],
        );
        for i in 0..rows {
            table.push_row(format!("Label {i}"), value);
        }
        table
    }

    fn text_marks(page: &Page) -> Vec<(f32, f32, String)> {
        page.marks()
            .iter()
            .filter_map(|mark| match mark {
                Mark::Text { x, y, text, .. } => Some((*x, *y, text.clone())),
                Mark::Line { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_document_has_one_numbered_page() {
        let pages = paginate(&Document::new("Empty", "empty.pdf"), &PageGeometry::default());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].texts().collect::<Vec<_>>(), vec!["Page 1 of 1"]);
    }

    #[test]
    fn test_long_table_repeats_header_on_every_page() {
        let mut document = Document::new("Report", "report.pdf");
        document.push(Block::Table(table_with(120, "Pending")));

        let pages = paginate(&document, &PageGeometry::default());
        assert!(pages.len() > 1);
        for page in &pages {
            let texts: Vec<_> = page.texts().collect();
            assert_eq!(texts[0], "Field");
            assert_eq!(texts[1], "Value");
        }

        let rows: usize = pages
            .iter()
            .map(|p| p.texts().filter(|t| t.starts_with("Label ")).count())
            .sum();
        assert_eq!(rows, 120);
    }

    #[test]
    fn test_oversized_row_is_split_within_columns() {
        let geometry = PageGeometry::default();
        let huge = "adjourned ".repeat(1500);
        let mut document = Document::new("Report", "report.pdf");
        document.push(Block::Table(table_with(1, &huge)));

        let pages = paginate(&document, &geometry);
        assert!(pages.len() > 2);

        let value_x = geometry.margin_x_mm + 46.0 + CELL_PAD_X;
        let mut value_lines = 0;
        for page in &pages {
            for (x, y, text) in text_marks(page) {
                if text.starts_with("Page ") {
                    continue;
                }
                assert!(y >= geometry.margin_top_mm && y <= geometry.bottom(), "y = {y}");
                if text.starts_with("adjourned") {
                    assert!((x - value_x).abs() < f32::EPSILON);
                    assert!(text.chars().count() <= 50);
                    value_lines += 1;
                }
            }
        }
        assert_eq!(value_lines, wrap_text(&huge, 50).len());
    }

    #[test]
    fn test_blocks_flow_top_to_bottom() {
        let mut document = Document::new("Report", "report.pdf");
        document
            .text(TextStyle::Title, "Case Details")
            .text(TextStyle::Heading, "Case Information")
            .field("CNR Number", "MHAU030151912016")
            .text(TextStyle::Footer, "Confidential");

        let pages = paginate(&document, &PageGeometry::default());
        let marks = text_marks(&pages[0]);
        let order: Vec<_> = marks.iter().map(|(_, _, t)| t.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "Case Details",
                "Case Information",
                "CNR Number:",
                "MHAU030151912016",
                "Confidential",
                "Page 1 of 1"
            ]
        );
        assert!(marks.windows(2).take(4).all(|w| w[0].1 <= w[1].1));
    }
}

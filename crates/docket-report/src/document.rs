//! Backend-independent document model.

/// Typographic role of a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Document title, centered
    Title,
    /// Section heading
    Heading,
    /// Running text
    Body,
    /// Small print such as notes
    Note,
    /// Closing line, centered
    Footer,
}

/// One column of a two-column table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Characters per wrapped line
    pub wrap: usize,
    /// Column width in millimetres
    pub width_mm: f32,
}

impl Column {
    /// Column wrapping at `wrap` characters, `width_mm` wide.
    #[must_use]
    pub const fn new(wrap: usize, width_mm: f32) -> Self {
        Self { wrap, width_mm }
    }
}

/// A two-column table with a header row repeated on every page it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: [Column; 2],
    header: [String; 2],
    rows: Vec<[String; 2]>,
}

impl Table {
    /// Empty table with a header row.
    #[must_use]
    pub fn new(columns: [Column; 2], header: [&str; 2]) -> Self {
        Self {
            columns,
            header: header.map(str::to_string),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push_row(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.rows.push([label.into(), value.into()]);
    }

    /// Column settings, label column first.
    #[must_use]
    pub fn columns(&self) -> &[Column; 2] {
        &self.columns
    }

    /// Header cells.
    #[must_use]
    pub fn header(&self) -> &[String; 2] {
        &self.header
    }

    /// Body rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[[String; 2]] {
        &self.rows
    }

    /// `true` when the table has no body rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total width in millimetres.
    #[must_use]
    pub fn width_mm(&self) -> f32 {
        self.columns[0].width_mm + self.columns[1].width_mm
    }
}

/// A unit of content, laid out top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Wrapped text in one style
    Text {
        /// Role of the text
        style: TextStyle,
        /// Content; wrapped during layout
        text: String,
    },
    /// A bold label followed by a value on one line
    Field {
        /// Label, rendered bold
        label: String,
        /// Value
        value: String,
    },
    /// A two-column table
    Table(Table),
    /// Vertical gap in millimetres
    Spacer(f32),
}

/// A titled sequence of blocks with its output file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    file_name: String,
    blocks: Vec<Block>,
}

impl Document {
    /// Start a document. `file_name` is the bare name the file is written under.
    #[must_use]
    pub fn new(title: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            blocks: Vec::new(),
        }
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Append a text block.
    pub fn text(&mut self, style: TextStyle, text: impl Into<String>) -> &mut Self {
        self.push(Block::Text {
            style,
            text: text.into(),
        })
    }

    /// Append a label/value line.
    pub fn field(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(Block::Field {
            label: label.into(),
            value: value.into(),
        })
    }

    /// Title shown at the top and stored in the file metadata.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Bare output file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content in layout order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Section headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Text {
                style: TextStyle::Heading,
                text,
            } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }
}

//! Page layout for analysis reports, independent of the PDF encoding.
//!
//! A [`SynthesizedResponse`] is first turned into a flat list of [`Block`]s,
//! which [`paginate`] wraps and places onto fixed-size pages.

use crate::domain::SynthesizedResponse;

/// Lines of the summary containing one of these are promoted to headings.
const SECTION_MARKERS: &[&str] = &[
    "Compliance Report:",
    "Strengths:",
    "Areas for Improvement:",
    "Reasoning:",
    "Additional Information:",
];

const SCORE_LABEL: &str = "Compliance Score:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    SubHeading(String),
    Paragraph { text: String, indent: f32 },
    Space(f32),
}

/// Page size and typography, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub line_spacing: f32,
}

impl Default for PageGeometry {
    /// A4 with 15 mm side margins.
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin_x: 42.5,
            margin_y: 50.0,
            title_size: 16.0,
            heading_size: 12.0,
            body_size: 11.0,
            line_spacing: 1.45,
        }
    }
}

impl PageGeometry {
    fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin_x
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub style: FontStyle,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Strips markdown emphasis markers and surrounding whitespace.
pub fn clean_markdown(line: &str) -> String {
    line.replace("**", "").replace('*', "").trim().to_string()
}

/// Rewrites `Compliance Score: 71-100: Excellent` as `Compliance Score: 71/100`.
pub fn normalize_score(line: &str) -> String {
    let Some(rest) = line
        .find(SCORE_LABEL)
        .map(|pos| &line[pos + SCORE_LABEL.len()..])
    else {
        return line.to_string();
    };

    let score = rest
        .trim()
        .split(['-', ':'])
        .next()
        .unwrap_or_default()
        .trim();

    if score.is_empty() {
        line.to_string()
    } else {
        format!("{SCORE_LABEL} {score}/100")
    }
}

pub fn is_section_header(line: &str) -> bool {
    SECTION_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Report structure: title, summary, detailed analysis, context assessment.
pub fn build_blocks(response: &SynthesizedResponse, title: &str) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(title.to_string()),
        Block::Space(20.0),
        Block::Heading("Analysis Summary:".to_string()),
    ];

    for line in response.answer.lines() {
        let cleaned = clean_markdown(line);
        if cleaned.is_empty() {
            continue;
        }
        let cleaned = normalize_score(&cleaned);

        if is_section_header(&cleaned) {
            blocks.push(Block::Space(10.0));
            blocks.push(Block::Heading(cleaned));
        } else {
            blocks.push(Block::Paragraph {
                text: cleaned,
                indent: 0.0,
            });
            blocks.push(Block::Space(6.0));
        }
    }

    blocks.push(Block::Space(20.0));
    blocks.push(Block::Heading("Detailed Analysis:".to_string()));

    for thought in &response.thought_process {
        let cleaned = clean_markdown(thought);
        if cleaned.is_empty() {
            continue;
        }

        if cleaned.ends_with(':') {
            blocks.push(Block::Space(10.0));
            blocks.push(Block::SubHeading(cleaned));
        } else {
            let indent = if cleaned.starts_with('-') { 12.0 } else { 0.0 };
            blocks.push(Block::Paragraph {
                text: cleaned,
                indent,
            });
        }
        blocks.push(Block::Space(6.0));
    }

    blocks.push(Block::Space(20.0));
    blocks.push(Block::Heading("Context Assessment:".to_string()));
    blocks.push(Block::Paragraph {
        text: format!(
            "Sufficient context available: {}",
            if response.enough_context { "Yes" } else { "No" }
        ),
        indent: 0.0,
    });

    blocks
}

/// Wraps every block to the text width and flows the lines onto pages.
pub fn paginate(blocks: &[Block], geometry: &PageGeometry) -> Vec<Page> {
    let mut cursor = Cursor::new(geometry);

    for block in blocks {
        match block {
            Block::Title(text) => {
                let size = geometry.title_size;
                for line in wrap(text, geometry.text_width(), size, FontStyle::Bold) {
                    let width = text_width(&line, size, FontStyle::Bold);
                    let x = ((geometry.width - width) / 2.0).max(geometry.margin_x);
                    cursor.place(x, FontStyle::Bold, size, line);
                }
            }
            Block::Heading(text) => {
                cursor.place_wrapped(text, 0.0, FontStyle::Bold, geometry.heading_size);
            }
            Block::SubHeading(text) => {
                cursor.place_wrapped(text, 0.0, FontStyle::Bold, geometry.body_size);
            }
            Block::Paragraph { text, indent } => {
                cursor.place_wrapped(text, *indent, FontStyle::Regular, geometry.body_size);
            }
            Block::Space(points) => cursor.advance(*points),
        }
    }

    cursor.finish()
}

struct Cursor<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            y: geometry.height - geometry.margin_y,
        }
    }

    fn top(&self) -> f32 {
        self.geometry.height - self.geometry.margin_y
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.top();
    }

    fn advance(&mut self, points: f32) {
        // Spacing at the top of a fresh page is dropped.
        if self.y < self.top() {
            self.y -= points;
        }
    }

    fn place(&mut self, x: f32, style: FontStyle, size: f32, text: String) {
        let line_height = size * self.geometry.line_spacing;
        if self.y - line_height < self.geometry.margin_y {
            self.break_page();
        }
        self.y -= line_height;
        self.current.lines.push(PlacedLine {
            x,
            y: self.y,
            style,
            size,
            text,
        });
    }

    fn place_wrapped(&mut self, text: &str, indent: f32, style: FontStyle, size: f32) {
        let width = self.geometry.text_width() - indent;
        let x = self.geometry.margin_x + indent;
        for line in wrap(text, width, size, style) {
            self.place(x, style, size, line);
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Greedy word wrap; words wider than a line are split by character.
pub fn wrap(text: &str, max_width: f32, size: f32, style: FontStyle) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size, style) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, size, style) <= max_width {
            current = word.to_string();
        } else {
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, size, style) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Approximate Helvetica advance width in points.
pub fn text_width(text: &str, size: f32, style: FontStyle) -> f32 {
    let units: u32 = text.chars().map(glyph_units).sum();
    let bold = match style {
        FontStyle::Regular => 1.0,
        FontStyle::Bold => 1.06,
    };
    units as f32 / 1000.0 * size * bold
}

fn glyph_units(ch: char) -> u32 {
    match ch {
        'i' | 'j' | 'l' | '\'' | '|' => 222,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | '/' | '[' | ']' | 'I' => 278,
        'r' | '(' | ')' | '-' => 333,
        'm' => 833,
        'w' => 722,
        'M' => 833,
        'W' => 944,
        'A'..='Z' => 667,
        _ => 556,
    }
}

use std::ops::Range;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::{BRAND, Document, NO_DATA};

// US Letter, points.
const PAGE_W: f32 = 612.0;
const PAGE_H: f32 = 792.0;
const MARGIN: f32 = 50.0;
const TABLE_W: f32 = PAGE_W - 2.0 * MARGIN;
const FOOTER_Y: f32 = 28.0;

const HEADER_H: f32 = 22.0;
const ROW_H: f32 = 18.0;
const CELL_PAD: f32 = 6.0;
const HEADER_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;

const BRAND_RGB: (f32, f32, f32) = (0.165, 0.416, 0.314); // #2A6A50
const HEADER_RGB: (f32, f32, f32) = (0.071, 0.725, 0.506); // #12B981

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    fn resource(self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"F1"),
            Font::Bold => Name(b"F2"),
            Font::Oblique => Name(b"F3"),
        }
    }

    fn base(self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"Helvetica"),
            Font::Bold => Name(b"Helvetica-Bold"),
            Font::Oblique => Name(b"Helvetica-Oblique"),
        }
    }

    /// Bold glyphs run slightly wider than the regular metrics below.
    fn scale(self) -> f32 {
        match self {
            Font::Bold => 1.06,
            Font::Regular | Font::Oblique => 1.0,
        }
    }
}

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// WinAnsi bytes for `s`. Latin-1 maps through; anything else becomes `?`.
fn encode(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x09 | 0x0A | 0x0D => b' ',
            _ => b'?',
        })
        .collect()
}

fn width(text: &[u8], font: Font, size: f32) -> f32 {
    let units: u32 = text
        .iter()
        .map(|&b| match b {
            0x20..=0x7E => u32::from(HELVETICA_WIDTHS[usize::from(b - 0x20)]),
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0 * font.scale()
}

/// Encode and shorten `s` with `...` until it fits `max` points.
fn fit(s: &str, font: Font, size: f32, max: f32) -> Vec<u8> {
    let mut text = encode(s);
    if width(&text, font, size) <= max {
        return text;
    }
    let ellipsis = width(b"...", font, size);
    while !text.is_empty() && width(&text, font, size) + ellipsis > max {
        text.pop();
    }
    text.extend_from_slice(b"...");
    text
}

/// Row ranges per page. Always at least one page, so an empty table still
/// yields the page that carries the placeholder.
fn paginate(rows: usize, first: usize, rest: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = first.max(1);
    loop {
        let end = (start + capacity).min(rows);
        pages.push(start..end);
        if end >= rows {
            return pages;
        }
        start = end;
        capacity = rest.max(1);
    }
}

fn rows_below(top: f32) -> usize {
    ((top - HEADER_H - MARGIN) / ROW_H).floor().max(0.0) as usize
}

struct Page {
    content: Content,
}

impl Page {
    fn new() -> Self {
        Self { content: Content::new() }
    }

    fn fill(&mut self, (r, g, b): (f32, f32, f32)) {
        self.content.set_fill_rgb(r, g, b);
    }

    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &[u8]) {
        self.content.begin_text();
        self.content.set_font(font.resource(), size);
        self.content.next_line(x, y);
        self.content.show(Str(text));
        self.content.end_text();
    }

    fn centered(&mut self, font: Font, size: f32, y: f32, s: &str) {
        let text = encode(s);
        let x = (PAGE_W - width(&text, font, size)) / 2.0;
        self.text(font, size, x, y, &text);
    }

    /// Brand, title, period and summary. Returns the y where the table starts.
    fn heading(&mut self, doc: &Document) -> f32 {
        let mut y = PAGE_H - MARGIN - 22.0;
        self.fill(BRAND_RGB);
        self.centered(Font::Oblique, 22.0, y, BRAND);
        self.fill((0.0, 0.0, 0.0));

        y -= 40.0;
        self.centered(Font::Bold, 18.0, y, &doc.title);
        y -= 26.0;
        self.text(Font::Regular, 11.0, MARGIN, y, &encode(&doc.period));

        y -= 10.0;
        for (label, value) in &doc.summary {
            y -= 15.0;
            let label = encode(&format!("{label}: "));
            let indent = width(&label, Font::Bold, 11.0);
            self.text(Font::Bold, 11.0, MARGIN, y, &label);
            self.text(Font::Regular, 11.0, MARGIN + indent, y, &encode(value));
        }
        y - 24.0
    }

    fn table(&mut self, doc: &Document, widths: &[f32], rows: &[Vec<String>], top: f32) {
        // Header band.
        self.fill(HEADER_RGB);
        self.content.rect(MARGIN, top - HEADER_H, TABLE_W, HEADER_H);
        self.content.fill_nonzero();
        self.fill((1.0, 1.0, 1.0));
        let mut x = MARGIN;
        for (column, &w) in doc.columns.iter().zip(widths) {
            let label = fit(column.header, Font::Bold, HEADER_SIZE, w - 2.0 * CELL_PAD);
            let tx = x + (w - width(&label, Font::Bold, HEADER_SIZE)) / 2.0;
            self.text(Font::Bold, HEADER_SIZE, tx, top - HEADER_H + 7.0, &label);
            x += w;
        }
        self.fill((0.0, 0.0, 0.0));

        let mut y = top - HEADER_H;
        for row in rows {
            let mut x = MARGIN;
            for (cell, &w) in row.iter().zip(widths) {
                let text = fit(cell, Font::Regular, BODY_SIZE, w - 2.0 * CELL_PAD);
                let tx = x + (w - width(&text, Font::Regular, BODY_SIZE)) / 2.0;
                self.text(Font::Regular, BODY_SIZE, tx, y - ROW_H + 5.5, &text);
                x += w;
            }
            y -= ROW_H;
        }

        // Grid.
        let bottom = y;
        self.content.set_line_width(0.5);
        self.content.move_to(MARGIN, top);
        self.content.line_to(MARGIN + TABLE_W, top);
        let mut line_y = top - HEADER_H;
        while line_y >= bottom - 0.01 {
            self.content.move_to(MARGIN, line_y);
            self.content.line_to(MARGIN + TABLE_W, line_y);
            line_y -= ROW_H;
        }
        let mut x = MARGIN;
        self.content.move_to(x, top);
        self.content.line_to(x, bottom);
        for &w in widths {
            x += w;
            self.content.move_to(x, top);
            self.content.line_to(x, bottom);
        }
        self.content.stroke();
    }

    fn footer(&mut self, number: usize, total: usize) {
        self.centered(Font::Regular, 9.0, FOOTER_Y, &format!("Page {number} of {total}"));
    }
}

pub(super) fn render(doc: &Document) -> Vec<u8> {
    let total_weight: f32 = doc.columns.iter().map(|c| c.weight).sum();
    let widths: Vec<f32> = doc
        .columns
        .iter()
        .map(|c| c.weight / total_weight * TABLE_W)
        .collect();

    let mut first = Page::new();
    let first_top = first.heading(doc);
    let pages = paginate(doc.rows.len(), rows_below(first_top), rows_below(PAGE_H - MARGIN));
    let total = pages.len();

    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let fonts = [(Font::Regular, Ref::new(4)), (Font::Bold, Ref::new(5)), (Font::Oblique, Ref::new(6))];
    let page_ids: Vec<Ref> = (0..total).map(|i| Ref::new(7 + 2 * i as i32)).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id).kids(page_ids.iter().copied()).count(total as i32);
    pdf.document_info(info_id).title(TextStr(&doc.title)).producer(TextStr(BRAND));
    for (font, id) in fonts {
        pdf.type1_font(id)
            .base_font(font.base())
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let mut first = Some(first);
    for (index, range) in pages.into_iter().enumerate() {
        let (mut page, top) = match first.take() {
            Some(p) => (p, first_top),
            None => (Page::new(), PAGE_H - MARGIN),
        };

        if doc.rows.is_empty() {
            page.text(Font::Regular, 11.0, MARGIN, top - 14.0, &encode(NO_DATA));
        } else {
            page.table(doc, &widths, &doc.rows[range], top);
        }
        page.footer(index + 1, total);

        let page_id = page_ids[index];
        let content_id = Ref::new(page_id.get() + 1);
        let mut writer = pdf.page(page_id);
        writer.media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H));
        writer.parent(tree_id);
        writer.contents(content_id);
        let mut resources = writer.resources();
        let mut names = resources.fonts();
        for (font, id) in fonts {
            names.pair(font.resource(), id);
        }
        names.finish();
        resources.finish();
        writer.finish();
        pdf.stream(content_id, &page.content.finish());
    }

    pdf.finish()
}

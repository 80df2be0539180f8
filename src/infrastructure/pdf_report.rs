// PDF report rendering for a single dataset
//
// Writes a minimal PDF 1.4 file: US Letter pages, the two built-in Helvetica
// faces, one content stream of text operators per page.
use crate::domain::dataset::DatasetRecord;
use std::fmt::Write as _;

const PAGE_WIDTH: i32 = 612;
const PAGE_HEIGHT: i32 = 792;
const TOP_MARGIN: i32 = 60;
const BOTTOM_MARGIN: i32 = 80;

pub const REPORT_TITLE: &str = "Chemical Equipment Dataset Report";

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Cursor-based page layout; `y` counts down from the top of the page.
struct Layout {
    pages: Vec<String>,
    current: String,
    y: i32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - TOP_MARGIN,
        }
    }

    fn text(&mut self, font: Font, size: u32, x: i32, text: &str) {
        let _ = writeln!(
            self.current,
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            font.resource(),
            size,
            x,
            self.y,
            escape_text(text)
        );
    }

    fn down(&mut self, points: i32) {
        self.y -= points;
    }

    fn break_page_if_full(&mut self) {
        if self.y < BOTTOM_MARGIN {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - TOP_MARGIN;
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// WinAnsiEncoding byte for a character outside printable ASCII, if the
/// built-in fonts can show it.
fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        '\u{a0}'..='\u{ff}' => Some(c as u8),
        '€' => Some(0x80),
        '‚' => Some(0x82),
        '„' => Some(0x84),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

/// Escape a string for a PDF literal. Non-ASCII characters are written as
/// octal escapes in WinAnsiEncoding; anything the encoding lacks becomes `?`.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => match win_ansi_byte(c) {
                Some(byte) => escaped.push_str(&format!("\\{:03o}", byte)),
                None => escaped.push('?'),
            },
        }
    }
    escaped
}

/// Render the report for one dataset as PDF bytes.
pub fn render_report(record: &DatasetRecord) -> Vec<u8> {
    let summary = &record.summary;
    let mut layout = Layout::new();

    layout.text(Font::Bold, 16, 50, REPORT_TITLE);

    layout.down(40);
    layout.text(Font::Regular, 12, 50, &format!("Dataset ID: {}", record.id));
    layout.down(20);
    layout.text(
        Font::Regular,
        12,
        50,
        &format!("Upload time: {}", record.uploaded_at.format("%Y-%m-%d %H:%M:%S")),
    );

    layout.down(30);
    layout.text(Font::Bold, 12, 50, "Summary Statistics");

    layout.down(20);
    layout.text(Font::Regular, 11, 60, &format!("Total count: {}", summary.total_count));
    layout.down(18);
    layout.text(Font::Regular, 11, 60, &format!("Average flowrate: {:.2}", summary.avg_flowrate));
    layout.down(18);
    layout.text(Font::Regular, 11, 60, &format!("Average pressure: {:.2}", summary.avg_pressure));
    layout.down(18);
    layout.text(
        Font::Regular,
        11,
        60,
        &format!("Average temperature: {:.2}", summary.avg_temperature),
    );

    layout.down(30);
    layout.text(Font::Bold, 12, 50, "Equipment Type Distribution");

    layout.down(20);
    for (label, count) in summary.ranked_distribution() {
        layout.text(Font::Regular, 11, 60, &format!("{}: {}", label, count));
        layout.down(18);
        layout.break_page_if_full();
    }

    write_document(&layout.finish())
}

/// Serialize page content streams into a complete PDF file.
fn write_document(pages: &[String]) -> Vec<u8> {
    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets: Vec<usize> = Vec::new();

    let first_page_object = 5;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page_object + 2 * i))
        .collect();

    push_object(&mut out, &mut offsets, b"<< /Type /Catalog /Pages 2 0 R >>");
    push_object(
        &mut out,
        &mut offsets,
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()).as_bytes(),
    );
    push_object(
        &mut out,
        &mut offsets,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    push_object(
        &mut out,
        &mut offsets,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (i, content) in pages.iter().enumerate() {
        let contents_object = first_page_object + 2 * i + 1;
        push_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT, contents_object
            )
            .as_bytes(),
        );

        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content.as_bytes());
        stream.extend_from_slice(b"\nendstream");
        push_object(&mut out, &mut offsets, &stream);
    }

    let xref_offset = out.len();
    let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
    for offset in &offsets {
        let _ = write!(trailer, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        trailer,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        offsets.len() + 1,
        xref_offset
    );
    out.extend_from_slice(trailer.as_bytes());
    out
}

fn push_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, body: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

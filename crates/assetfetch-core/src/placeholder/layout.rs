//! Pure layout of an image placeholder: wrapped title lines, centering, watermark.

/// Glyph cell of the built-in bitmap font before scaling.
pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, in font units (glyph + 1 column gap).
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

const TITLE_SCALE: u32 = 4;
const WATERMARK_SCALE: u32 = 2;
const MARGIN: u32 = 50;

pub const BACKGROUND: [u8; 3] = [45, 45, 65];
pub const ACCENT: [u8; 3] = [212, 175, 55];
pub const WATERMARK_TONE: [u8; 3] = [150, 150, 170];

/// One line of text positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub scale: u32,
    pub color: [u8; 3],
}

impl TextLine {
    pub fn pixel_width(&self) -> u32 {
        text_width(&self.text, self.scale)
    }
}

/// Everything a rendering backend needs to paint an image placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasLayout {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    /// Gradient tone blended in from the top edge.
    pub accent: [u8; 3],
    pub title: Vec<TextLine>,
    pub watermark: TextLine,
}

fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * GLYPH_ADVANCE - 1) * scale
}

/// Greedy word wrap to at most `max_chars` per line; words longer than a line are split.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn centered(text: String, canvas_width: u32, y: u32, scale: u32, color: [u8; 3]) -> TextLine {
    let w = text_width(&text, scale);
    TextLine {
        x: canvas_width.saturating_sub(w) / 2,
        text,
        y,
        scale,
        color,
    }
}

/// Lay out `title` (upper-cased for the bitmap font) and `watermark` on a `width` x `height` canvas.
pub fn compose(title: &str, watermark: &str, width: u32, height: u32) -> CanvasLayout {
    let usable = width.saturating_sub(2 * MARGIN).max(GLYPH_ADVANCE * TITLE_SCALE);
    let max_chars = (usable / (GLYPH_ADVANCE * TITLE_SCALE)) as usize;
    let line_height = (GLYPH_HEIGHT + 2) * TITLE_SCALE;

    let title = title.to_uppercase();
    let wrapped = wrap_words(&title, max_chars);
    let block = wrapped.len() as u32 * line_height;
    let top = height.saturating_sub(block) / 2;
    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| centered(text, width, top + i as u32 * line_height, TITLE_SCALE, ACCENT))
        .collect();

    let wm_y = height.saturating_sub(MARGIN / 2 + GLYPH_HEIGHT * WATERMARK_SCALE);
    let watermark = centered(
        watermark.to_uppercase(),
        width,
        wm_y,
        WATERMARK_SCALE,
        WATERMARK_TONE,
    );

    CanvasLayout {
        width,
        height,
        background: BACKGROUND,
        accent: ACCENT,
        title: lines,
        watermark,
    }
}

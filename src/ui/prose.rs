/// Plain-terminal rendering of the hint panel's lightly formatted text.
///
/// Handles the subset the text generator actually produces: `#` headings,
/// `-`/`*` bullets, numbered items, `**bold**` markers (stripped) and
/// paragraphs. Output is word-wrapped to a column width measured in
/// terminal cells, where Devanagari vowel signs and other combining
/// marks take no column of their own.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineStyle {
    Heading,
    Bullet,
    Body,
    Blank,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProseLine {
    pub text: String,
    pub style: LineStyle,
}

impl ProseLine {
    fn new(text: String, style: LineStyle) -> Self {
        ProseLine { text, style }
    }
}

/// Marks that attach to the preceding character instead of taking a cell.
pub fn is_combining(c: char) -> bool {
    matches!(c,
        '\u{0900}'..='\u{0903}'
        | '\u{093A}'..='\u{093C}'
        | '\u{093E}'..='\u{094F}'
        | '\u{0951}'..='\u{0957}'
        | '\u{0962}'..='\u{0963}'
        | '\u{200C}'..='\u{200D}'
        | '\u{0300}'..='\u{036F}'
        | '\u{FE0F}')
}

/// Terminal columns `s` occupies.
pub fn display_width(s: &str) -> usize {
    s.chars().filter(|&c| !is_combining(c)).count()
}

/// Split `s` into cell clusters: a base character plus its trailing marks.
pub fn clusters(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        if is_combining(c) && start.is_some() {
            continue;
        }
        if let Some(st) = start {
            out.push(&s[st..i]);
        }
        start = Some(i);
    }
    if let Some(st) = start {
        out.push(&s[st..]);
    }
    out
}

/// Format `text` into styled lines no wider than `width` cells.
pub fn format(text: &str, width: usize) -> Vec<ProseLine> {
    let width = width.max(8);
    let mut out: Vec<ProseLine> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            if out.last().map_or(false, |l| l.style != LineStyle::Blank) {
                out.push(ProseLine::new(String::new(), LineStyle::Blank));
            }
            continue;
        }

        let (style, mut prefix, body) = classify(line);
        let body = strip_emphasis(body);
        // A marker that leaves no room for text is dropped.
        if display_width(&prefix) >= width {
            prefix.clear();
        }
        let indent = " ".repeat(display_width(&prefix));

        for (i, wrapped) in wrap(&body, width - display_width(&prefix)).into_iter().enumerate() {
            let lead = if i == 0 { &prefix } else { &indent };
            out.push(ProseLine::new(format!("{lead}{wrapped}"), style));
        }
    }

    while out.last().map_or(false, |l| l.style == LineStyle::Blank) {
        out.pop();
    }
    out
}

fn classify(line: &str) -> (LineStyle, String, &str) {
    if line.starts_with('#') {
        return (LineStyle::Heading, String::new(), line.trim_start_matches('#').trim());
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return (LineStyle::Bullet, "• ".into(), rest.trim());
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return (LineStyle::Bullet, format!("{}. ", &line[..digits]), rest.trim());
        }
    }
    (LineStyle::Body, String::new(), line)
}

fn strip_emphasis(s: &str) -> String {
    s.replace("**", "").replace("__", "")
}

/// Greedy word wrap. Words longer than a line are split at cluster bounds.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_w = 0;

    for word in text.split_whitespace() {
        let ww = display_width(word);
        if cur_w > 0 && cur_w + 1 + ww <= width {
            cur.push(' ');
            cur.push_str(word);
            cur_w += 1 + ww;
            continue;
        }
        if cur_w > 0 {
            lines.push(std::mem::take(&mut cur));
            cur_w = 0;
        }
        if ww <= width {
            cur.push_str(word);
            cur_w = ww;
            continue;
        }
        for cl in clusters(word) {
            if cur_w == width {
                lines.push(std::mem::take(&mut cur));
                cur_w = 0;
            }
            cur.push_str(cl);
            cur_w += 1;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowel_signs_take_no_column() {
        assert_eq!(display_width("क"), 1);
        assert_eq!(display_width("कि"), 1);
        assert_eq!(display_width("क्ष"), 2);
        assert_eq!(display_width("अं"), 1);
        assert_eq!(clusters("किताब"), vec!["कि", "ता", "ब"]);
    }

    #[test]
    fn headings_bullets_and_bold() {
        let text = "## Memory trick\n\n- **क** से कबूतर\n* ख से खरगोश\n2. Say it aloud";
        let lines = format(text, 40);
        assert_eq!(lines[0], ProseLine::new("Memory trick".into(), LineStyle::Heading));
        assert_eq!(lines[1].style, LineStyle::Blank);
        assert_eq!(lines[2].text, "• क से कबूतर");
        assert_eq!(lines[3].text, "• ख से खरगोश");
        assert_eq!(lines[4].text, "2. Say it aloud");
        assert_eq!(lines[4].style, LineStyle::Bullet);
    }

    #[test]
    fn wraps_and_indents_continuations() {
        let lines = format("- one two three four five six", 12);
        assert_eq!(lines[0].text, "• one two");
        assert_eq!(lines[1].text, "  three four");
        assert!(lines.iter().all(|l| display_width(&l.text) <= 12));
    }

    #[test]
    fn blank_runs_collapse_and_trailing_blanks_drop() {
        let lines = format("\n\nfirst\n\n\n\nsecond\n\n", 20);
        let styles: Vec<_> = lines.iter().map(|l| l.style).collect();
        assert_eq!(styles, vec![LineStyle::Body, LineStyle::Blank, LineStyle::Body]);
    }

    #[test]
    fn overlong_word_is_split() {
        let lines = format("abcdefghijklmnopqrst", 8);
        assert_eq!(lines[0].text, "abcdefgh");
        assert_eq!(lines[2].text, "qrst");
    }

    #[test]
    fn number_wider_than_panel_is_dropped() {
        let lines = format("1234567890123. tip", 10);
        assert_eq!(lines, vec![ProseLine::new("tip".into(), LineStyle::Bullet)]);

        let lines = format("12345678. fits barely", 10);
        assert!(lines.iter().all(|l| display_width(&l.text) <= 10));
        assert_eq!(lines[0].text, "fits");
    }
}

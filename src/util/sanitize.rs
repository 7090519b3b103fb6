/// Strip terminal control characters from server-supplied text before drawing it.
///
/// Tabs become a single space. Newlines survive only when `keep_newlines` is set;
/// otherwise they collapse to spaces so single-line cells stay single-line.
pub fn sanitize(text: &str, keep_newlines: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' if keep_newlines => out.push('\n'),
            '\n' | '\t' => out.push(' '),
            '\r' => {}
            c if c.is_control() => {}
            // Bidi overrides can visually reorder the rest of the line
            '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => {}
            c => out.push(c),
        }
    }
    out
}

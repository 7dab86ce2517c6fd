use html_escape::decode_html_entities;

/// Reduce an HTML fragment to its text: tags dropped, entities decoded,
/// whitespace runs collapsed to single spaces.
pub fn strip_html(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => {
                in_tag = true;
                // A tag boundary separates words.
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    decode_html_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

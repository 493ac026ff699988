//! HTML escaping of rendered values.

use std::borrow::Cow;

/// Escape `& < > " ' \` =` for safe inclusion in HTML.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(needs_escape) else {
        return Cow::Borrowed(text);
    };
    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..first]);
    for c in text[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'' | '`' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'`=</a>"#),
            "&lt;a href&#x3D;&quot;x&quot;&gt;&#x27;&amp;&#x27;&#x60;&#x3D;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
    }
}

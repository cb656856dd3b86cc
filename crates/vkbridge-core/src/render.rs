//! Renders a [`Message`] into the exact HTML string sent to the Sink.
//!
//! The output format is an external contract (consumers on the Telegram
//! side parse/display it verbatim), so this intentionally hand-rolls HTML
//! escaping rather than pulling in a general-purpose templating crate: the
//! entity set has to match Go's `html.EscapeString` byte for byte,
//! including its choice of `&#34;`/`&#39;` over the named `&quot;`/`&apos;`
//! entities.

use crate::message::{Message, MessageKind};

/// Render `message` into the HTML body handed to the Sink client.
///
/// Format: `👤 <a href="https://vk.com/{slug}{abs_id}">{name}</a>\n{icon} {text}`
/// where `slug` is `id` for a user sender and `club` for a community sender,
/// and `{text}` is HTML-escaped.
pub fn render(message: &Message) -> String {
    let abs_id = message.sender_id.unsigned_abs();
    let slug = if message.is_from_user() { "id" } else { "club" };
    let display_name = display_name(message, abs_id);
    let icon = message.kind.icon();
    let escaped_text = escape_html(&message.text);

    format!(
        "👤 <a href=\"https://vk.com/{slug}{abs_id}\">{display_name}</a>\n{icon} {escaped_text}",
    )
}

/// Full name when Enrichment resolved a [`crate::message::Sender`],
/// otherwise the decimal absolute sender id as a last resort.
fn display_name(message: &Message, abs_id: u64) -> String {
    match &message.sender {
        Some(sender) => format!("{} {}", sender.first_name, sender.last_name),
        None => abs_id.to_string(),
    }
}

/// Escape `&`, `<`, `>`, `'` and `"` the way Go's `html.EscapeString` does:
/// numeric character references for the quotes, named entities for the rest.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(ch),
        }
    }
    out
}

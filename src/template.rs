//! Per-contact message rendering

use crate::types::Contact;

pub const DEFAULT_FOOTER: &str = "Reply STOP to opt out.";

/// Fill the contact placeholders in `template` and append the opt-out footer
/// on its own line. Unknown `{tokens}` are left as-is.
pub fn render_message(template: Option<&str>, contact: &Contact, footer: Option<&str>) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut body = template
        .unwrap_or("")
        .replace("{firstName}", &field(&contact.first_name))
        .replace("{lastName}", &field(&contact.last_name))
        .replace("{city}", &field(&contact.city));

    let footer = footer.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_FOOTER);
    body.push('\n');
    body.push_str(footer);
    body
}

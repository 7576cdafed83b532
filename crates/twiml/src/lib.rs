//! TwiML rendering for paced replies.
//!
//! Pure formatting over a [`DeliveryPlan`]: message elements in plan
//! order, pause elements carrying the declarative delays. No business
//! logic lives here.

use remora_reply::DeliveryPlan;

/// Content type for TwiML HTTP responses.
pub const CONTENT_TYPE: &str = "text/xml";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Render a delivery plan as a TwiML `<Response>` document.
///
/// Emits, in plan order, a `<Pause length="n"/>` before any item whose
/// delay is nonzero, then the item body as a `<Message>`. Bodies and
/// ordering arrive exactly as scheduled upstream.
pub fn render(plan: &DeliveryPlan) -> String {
    let mut out = String::with_capacity(XML_DECLARATION.len() + 64);
    out.push_str(XML_DECLARATION);
    out.push_str("<Response>");
    for entry in &plan.items {
        if entry.delay_secs > 0 {
            out.push_str("<Pause length=\"");
            out.push_str(&entry.delay_secs.to_string());
            out.push_str("\"/>");
        }
        out.push_str("<Message>");
        out.push_str(&escape_xml(entry.item.body()));
        out.push_str("</Message>");
    }
    out.push_str("</Response>");
    out
}

/// Render a single-message response outside any plan. Used for the
/// fallback reply when planning cannot be trusted to have produced
/// anything deliverable.
pub fn render_single(body: &str) -> String {
    let mut out = String::with_capacity(XML_DECLARATION.len() + 64);
    out.push_str(XML_DECLARATION);
    out.push_str("<Response><Message>");
    out.push_str(&escape_xml(body));
    out.push_str("</Message></Response>");
    out
}

/// Escape XML special characters.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

//! Message rendering: template substitution and tracking-pixel embedding.

use super::{Recipient, TrackingId};

/// Placeholder replaced with the recipient's display name in the subject
/// and body templates.
pub const NAME_PLACEHOLDER: &str = "{company_name}";

/// Campaign message template. The tracker base URL is the externally
/// reachable address of the correlation receiver; the rendered HTML embeds
/// `{base}/track/{tracking_id}` as a 1x1 image.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub tracker_base_url: String,
}

/// A fully rendered message, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl MessageTemplate {
    /// Render for one recipient. `None` when the recipient has no
    /// destination address (such recipients never reach the send loop, but
    /// rendering stays total either way).
    pub fn render(&self, recipient: &Recipient, tracking_id: &TrackingId) -> Option<RenderedMessage> {
        let to = recipient.email.clone()?;
        let display_name = recipient.display_name();

        let subject = self.subject.replace(NAME_PLACEHOLDER, display_name);
        let text_body = self.body.replace(NAME_PLACEHOLDER, display_name);
        let html_body = self.html_body(&text_body, tracking_id);

        Some(RenderedMessage {
            to,
            subject,
            text_body,
            html_body,
        })
    }

    fn html_body(&self, text_body: &str, tracking_id: &TrackingId) -> String {
        let base = self.tracker_base_url.trim_end_matches('/');
        let pixel = format!(
            "<img src=\"{base}/track/{tracking_id}\" width=\"1\" height=\"1\" alt=\"\">"
        );
        let paragraphs = text_body.replace('\n', "<br>\n");
        format!(
            "<html>\n  <head>\n    <style>\n      body {{ font-family: sans-serif; }}\n      p {{ line-height: 1.6; }}\n    </style>\n  </head>\n  <body>\n    <p>{paragraphs}</p>\n    {pixel}\n  </body>\n</html>"
        )
    }
}

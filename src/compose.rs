/// Outreach message and Gmail compose link

use crate::config::GMAIL_COMPOSE_URL;
use url::Url;

const DEFAULT_SUBJECT: &str = "Frontend Engineer role";

const DEFAULT_BODY: &str = "Hi {first_name},

I saw on the YC Work at a Startup site that you're hiring for a Frontend Engineer, and I'd like to throw my hat in the ring.

I'd love to understand more about what you're looking for and whether my skills and experience would be a good fit. Do you have some time in the next week or two to chat?

Best,
{sender_name}";

/// Subject and body of the outreach email
///
/// The body may use `{first_name}` and `{sender_name}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct OutreachTemplate {
    pub subject: String,
    pub body: String,
}

impl Default for OutreachTemplate {
    fn default() -> Self {
        OutreachTemplate {
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

impl OutreachTemplate {
    pub fn render(&self, first_name: &str, sender_name: &str) -> String {
        self.body
            .replace("{first_name}", first_name)
            .replace("{sender_name}", sender_name)
    }

    /// Gmail compose URL addressed to `email`
    pub fn compose_url(&self, email: &str, first_name: &str, sender_name: &str) -> Result<Url, url::ParseError> {
        let body = self.render(first_name, sender_name);
        Url::parse_with_params(
            GMAIL_COMPOSE_URL,
            &[
                ("view", "cm"),
                ("fs", "1"),
                ("to", email),
                ("su", self.subject.as_str()),
                ("body", body.as_str()),
            ],
        )
    }
}

/// First word of a founder's display name
pub fn first_name(founder_name: &str) -> &str {
    founder_name.split_whitespace().next().unwrap_or("")
}

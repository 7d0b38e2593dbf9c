//! Call-control directive rendering
//!
//! The call-control binding answers each webhook with an ordered list
//! of directives (speak, gather, redirect, hangup) rendered as TwiML
//! XML. Directives execute top to bottom on the telephony side; a
//! directive after a `Gather` only runs when the gather times out.

use std::fmt::Write as _;

/// One telephony directive
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Say { text: String, language: String },
    Gather {
        language: String,
        action: String,
        timeout_secs: u32,
    },
    Redirect { url: String },
    Hangup,
}

/// An ordered directive list for one webhook response
#[derive(Debug, Default)]
pub struct VoiceResponse {
    directives: Vec<Directive>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>, language: impl Into<String>) -> Self {
        self.directives.push(Directive::Say {
            text: text.into(),
            language: language.into(),
        });
        self
    }

    /// Listen for caller speech; the result posts to `action`. The
    /// next directive runs only if the gather times out.
    pub fn gather(
        mut self,
        language: impl Into<String>,
        action: impl Into<String>,
        timeout_secs: u32,
    ) -> Self {
        self.directives.push(Directive::Gather {
            language: language.into(),
            action: action.into(),
            timeout_secs,
        });
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.directives.push(Directive::Redirect { url: url.into() });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.directives.push(Directive::Hangup);
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for directive in &self.directives {
            match directive {
                Directive::Say { text, language } => {
                    let _ = write!(
                        xml,
                        "<Say language=\"{}\">{}</Say>",
                        escape_xml(language),
                        escape_xml(text)
                    );
                }
                Directive::Gather {
                    language,
                    action,
                    timeout_secs,
                } => {
                    let _ = write!(
                        xml,
                        "<Gather input=\"speech\" language=\"{}\" action=\"{}\" method=\"POST\" timeout=\"{}\"/>",
                        escape_xml(language),
                        escape_xml(action),
                        timeout_secs
                    );
                }
                Directive::Redirect { url } => {
                    let _ = write!(xml, "<Redirect>{}</Redirect>", escape_xml(url));
                }
                Directive::Hangup => xml.push_str("<Hangup/>"),
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! Request encoding, response decoding and device error classification
//!
//! This is the only place that interprets `<error>` envelopes. Everything
//! above it receives either a clean [`Envelope`] or a typed [`Error`].

use crate::envelope::value::{XmlMap, XmlValue};
use crate::error::{ERROR_SESSION_INVALID, ERROR_TRY_AGAIN};
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use tracing::debug;

/// Declaration prepended to every request body
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Root element of successful responses
pub const RESPONSE_ROOT: &str = "response";

/// Root element of device failures
pub const ERROR_ROOT: &str = "error";

/// Outbound command bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Page through the inbox
    SmsList {
        /// 1-based page number
        page: u32,
        /// Messages per page
        count: u32,
    },
    /// Mark one message as read
    SetRead {
        /// Message index
        index: u32,
    },
    /// Delete one or more messages
    DeleteSms {
        /// Message indices in caller order
        indices: Vec<u32>,
    },
    /// Submit a USSD code
    UssdSend {
        /// USSD code, e.g. `*100#`
        content: String,
    },
}

impl RequestKind {
    /// Child elements of `<request>` in the order the device expects them
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            RequestKind::SmsList { page, count } => vec![
                ("PageIndex", page.to_string()),
                ("ReadCount", count.to_string()),
                ("BoxType", "1".to_string()),
                ("SortType", "0".to_string()),
                ("Ascending", "0".to_string()),
                ("UnreadPreferred", "0".to_string()),
            ],
            RequestKind::SetRead { index } => vec![("Index", index.to_string())],
            RequestKind::DeleteSms { indices } => indices
                .iter()
                .map(|index| ("Index", index.to_string()))
                .collect(),
            // The empty <timeout> is sent as the web UI sends it; the device
            // assigns it no documented meaning.
            RequestKind::UssdSend { content } => vec![
                ("content", content.clone()),
                ("codeType", "CodeType".to_string()),
                ("timeout", String::new()),
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RequestKind::SmsList { .. } => "sms-list",
            RequestKind::SetRead { .. } => "set-read",
            RequestKind::DeleteSms { .. } => "delete-sms",
            RequestKind::UssdSend { .. } => "ussd-send",
        }
    }
}

/// Build the XML body for a command
pub fn encode(kind: &RequestKind) -> String {
    let mut body = String::from(XML_DECLARATION);
    body.push_str("<request>");
    for (name, value) in kind.fields() {
        body.push_str(&format!("<{name}>{}</{name}>", escape(value.as_str())));
    }
    body.push_str("</request>");
    body
}

/// A decoded device response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    root: String,
    body: XmlValue,
}

impl Envelope {
    pub fn new(root: impl Into<String>, body: XmlValue) -> Self {
        Self {
            root: root.into(),
            body,
        }
    }

    /// `response` or `error`
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn body(&self) -> &XmlValue {
        &self.body
    }

    pub fn into_body(self) -> XmlValue {
        self.body
    }

    pub fn is_error(&self) -> bool {
        self.root == ERROR_ROOT
    }

    /// Child elements of the root, for responses that carry fields
    pub fn fields(&self) -> Result<&XmlMap> {
        self.body.as_map().ok_or_else(|| {
            Error::missing_field("<fields>", &format!("<{}> envelope", self.root))
        })
    }
}

/// Device error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    /// 125002
    SessionInvalid,
    /// 111019
    TransientBusy,
    /// Anything else, raw code preserved
    Other(i64),
}

impl DeviceErrorKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            ERROR_SESSION_INVALID => DeviceErrorKind::SessionInvalid,
            ERROR_TRY_AGAIN => DeviceErrorKind::TransientBusy,
            other => DeviceErrorKind::Other(other),
        }
    }

    pub fn into_error(self, message: Option<String>) -> Error {
        match self {
            DeviceErrorKind::SessionInvalid => Error::SessionInvalid,
            DeviceErrorKind::TransientBusy => Error::TransientBusy,
            DeviceErrorKind::Other(code) => Error::device(code, message),
        }
    }
}

struct Frame {
    name: String,
    children: XmlMap,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: XmlMap::new(),
            text: String::new(),
        }
    }

    fn into_parts(self) -> (String, XmlValue) {
        let value = if self.children.is_empty() {
            XmlValue::Text(self.text)
        } else {
            XmlValue::Map(self.children)
        };
        (self.name, value)
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, XmlValue)>,
    name: String,
    value: XmlValue,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.insert(name, value);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::xml(format!("unexpected second root element <{name}>")));
    }
    *root = Some((name, value));
    Ok(())
}

/// Parse a device response into an [`Envelope`]
pub fn decode(text: &str) -> Result<Envelope> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, XmlValue)> = None;

    loop {
        let event = reader.read_event().map_err(|e| Error::xml(e.to_string()))?;
        match event {
            Event::Start(start) => {
                stack.push(Frame::new(element_name(start.local_name().as_ref())));
            }
            Event::Empty(start) => {
                let name = element_name(start.local_name().as_ref());
                attach(&mut stack, &mut root, name, XmlValue::Text(String::new()))?;
            }
            Event::Text(raw) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = raw.unescape().map_err(|e| Error::xml(e.to_string()))?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::xml("closing tag without opening tag"))?;
                let (name, value) = frame.into_parts();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::xml(format!("unclosed element <{}>", open.name)));
    }

    let (name, body) = root.ok_or_else(|| Error::xml("document has no root element"))?;
    if name != RESPONSE_ROOT && name != ERROR_ROOT {
        return Err(Error::xml(format!("unexpected root element <{name}>")));
    }

    Ok(Envelope::new(name, body))
}

/// Inspect an envelope for a device error
pub fn classify_error(envelope: &Envelope) -> Option<DeviceErrorKind> {
    if !envelope.is_error() {
        return None;
    }

    let code = envelope
        .body()
        .get("code")
        .and_then(XmlValue::as_text)
        .and_then(|code| code.trim().parse::<i64>().ok())
        .unwrap_or(0);

    Some(DeviceErrorKind::from_code(code))
}

/// Pass a clean envelope through, or raise its classified error
pub fn check(envelope: Envelope) -> Result<Envelope> {
    match classify_error(&envelope) {
        None => Ok(envelope),
        Some(kind) => {
            let message = envelope
                .body()
                .get("message")
                .and_then(XmlValue::as_text)
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(str::to_string);
            debug!("Device reported {:?} (message: {:?})", kind, message);
            Err(kind.into_error(message))
        }
    }
}

/// [`decode`] followed by [`check`]
pub fn decode_checked(text: &str) -> Result<Envelope> {
    check(decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_encode_sms_list_field_order() {
        let body = encode(&RequestKind::SmsList { page: 1, count: 20 });
        assert_eq!(
            body,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><request>\
             <PageIndex>1</PageIndex><ReadCount>20</ReadCount><BoxType>1</BoxType>\
             <SortType>0</SortType><Ascending>0</Ascending><UnreadPreferred>0</UnreadPreferred>\
             </request>"
        );
    }

    #[test]
    fn test_encode_delete_preserves_order() {
        let body = encode(&RequestKind::DeleteSms {
            indices: vec![40003, 40001, 40002],
        });
        assert!(body.ends_with(
            "<request><Index>40003</Index><Index>40001</Index><Index>40002</Index></request>"
        ));
    }

    #[test]
    fn test_encode_ussd_keeps_empty_timeout() {
        let body = encode(&RequestKind::UssdSend {
            content: "*100#".to_string(),
        });
        assert!(body.contains(
            "<content>*100#</content><codeType>CodeType</codeType><timeout></timeout>"
        ));
    }

    #[test]
    fn test_encode_escapes_markup() {
        let body = encode(&RequestKind::UssdSend {
            content: "a<b".to_string(),
        });
        assert!(body.contains("<content>a&lt;b</content>"));
    }

    #[test]
    fn test_decode_response_fields() {
        let envelope = decode(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
    <UnreadMessage>2</UnreadMessage>
    <SmsStorageFull>0</SmsStorageFull>
    <OnlineUpdateStatus>10</OnlineUpdateStatus>
</response>"#,
        )
        .unwrap();

        assert_eq!(envelope.root(), "response");
        let fields = envelope.fields().unwrap();
        assert_eq!(fields.text("UnreadMessage").unwrap(), "2");
        assert_eq!(fields.len(), 3);
        assert_eq!(classify_error(&envelope), None);
    }

    #[test]
    fn test_decode_plain_ok() {
        let envelope = decode("<?xml version=\"1.0\" encoding=\"UTF-8\"?><response>OK</response>")
            .unwrap();
        assert_eq!(envelope.body(), &XmlValue::Text("OK".to_string()));
        assert!(envelope.fields().is_err());
    }

    #[test]
    fn test_decode_empty_and_self_closing_elements() {
        let envelope = decode("<response><Sca></Sca><Phone/></response>").unwrap();
        let fields = envelope.fields().unwrap();
        assert_eq!(fields.text("Sca").unwrap(), "");
        assert_eq!(fields.text("Phone").unwrap(), "");
    }

    #[test]
    fn test_decode_unescapes_text() {
        let envelope =
            decode("<response><content>Balance &amp; bonus: 5 &lt;USD&gt;</content></response>")
                .unwrap();
        assert_eq!(
            envelope.fields().unwrap().text("content").unwrap(),
            "Balance & bonus: 5 <USD>"
        );
    }

    #[test]
    fn test_decode_rejects_foreign_root() {
        assert!(matches!(
            decode("<html><body/></html>"),
            Err(Error::Xml { .. })
        ));
        assert!(matches!(decode(""), Err(Error::Xml { .. })));
        assert!(matches!(
            decode("<response><a></response>"),
            Err(Error::Xml { .. })
        ));
    }

    #[rstest]
    #[case("125002", DeviceErrorKind::SessionInvalid)]
    #[case("111019", DeviceErrorKind::TransientBusy)]
    #[case("100002", DeviceErrorKind::Other(100002))]
    #[case("113018", DeviceErrorKind::Other(113018))]
    fn test_classify_error_codes(#[case] code: &str, #[case] expected: DeviceErrorKind) {
        let text = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?><error><code>{code}</code><message></message></error>");
        let envelope = decode(&text).unwrap();
        assert_eq!(classify_error(&envelope), Some(expected));
    }

    #[test]
    fn test_classify_error_without_code_defaults_to_zero() {
        let envelope = decode("<error><message>oops</message></error>").unwrap();
        assert_eq!(classify_error(&envelope), Some(DeviceErrorKind::Other(0)));
    }

    #[test]
    fn test_check_maps_to_typed_errors() {
        assert!(matches!(
            decode_checked("<error><code>125002</code></error>"),
            Err(Error::SessionInvalid)
        ));
        assert!(matches!(
            decode_checked("<error><code>111019</code></error>"),
            Err(Error::TransientBusy)
        ));

        match decode_checked("<error><code>100003</code><message>No rights</message></error>") {
            Err(Error::Device { code, message }) => {
                assert_eq!(code, 100003);
                assert_eq!(message.as_deref(), Some("No rights"));
            }
            other => panic!("expected device error, got {:?}", other),
        }

        assert!(decode_checked("<response>OK</response>").is_ok());
    }
}

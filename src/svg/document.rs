//! A minimal owned SVG element tree built from `quick-xml` events.
//!
//! Only elements and attributes are kept; text content is irrelevant for
//! drawing. Namespace prefixes are resolved against the `xmlns`
//! declarations in scope so callers can match on namespace URIs instead of
//! whatever prefix a particular editor chose.

use crate::error::{DocumentError, DocumentResult};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const INKSCAPE_NAMESPACE: &str = "http://www.inkscape.org/namespaces/inkscape";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Local name, without any prefix.
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
}

impl Element {
    /// An SVG-namespaced element with no attributes.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: Some(SVG_NAMESPACE.to_string()),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute {
            namespace: None,
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_namespaced_attribute(mut self, namespace: &str, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// True for `<name>` in the SVG namespace. Elements with no namespace at
    /// all are accepted too, since plenty of hand-written files omit it.
    pub fn is_svg(&self, name: &str) -> bool {
        self.name == name
            && self
                .namespace
                .as_deref()
                .is_none_or(|ns| ns == SVG_NAMESPACE)
    }

    /// Look up a presentation property, either as an attribute or as a
    /// declaration inside `style`. The `style` declaration wins.
    pub fn style_property(&self, property: &str) -> Option<&str> {
        let from_style = self.attribute("style").and_then(|style| {
            style
                .split(';')
                .filter_map(|decl| decl.split_once(':'))
                .filter(|(key, _)| key.trim() == property)
                .map(|(_, value)| value.trim())
                .last()
        });
        from_style.or_else(|| self.attribute(property).map(str::trim))
    }

    pub fn has_style(&self, property: &str, value: &str) -> bool {
        self.attribute(property).map(str::trim) == Some(value)
            || self.style_property(property) == Some(value)
    }
}

/// A parsed SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn parse(xml: &str) -> DocumentResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut scopes = NamespaceScopes::default();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let element = scopes.open(e)?;
                    stack.push(element);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = scopes.open(e)?;
                    scopes.close();
                    attach(element, &mut stack, &mut root);
                }
                Ok(Event::End(_)) => {
                    scopes.close();
                    if let Some(element) = stack.pop() {
                        attach(element, &mut stack, &mut root);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocumentError::Xml(format!(
                        "{} at position {}",
                        e,
                        reader.buffer_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(DocumentError::Xml(
                "unexpected end of document, unclosed elements remain".to_string(),
            ));
        }

        root.map(|root| Self { root }).ok_or(DocumentError::Empty)
    }
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

/// Stack of `xmlns` bindings, one frame per open element.
#[derive(Default)]
struct NamespaceScopes {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScopes {
    fn lookup(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_string());
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }

    /// Push the element's declarations and build it with resolved names.
    fn open(&mut self, e: &BytesStart) -> DocumentResult<Element> {
        let mut raw = Vec::new();
        let mut frame = Vec::new();

        for attr in e.attributes() {
            let attr = attr.map_err(|err| DocumentError::Xml(err.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| DocumentError::Xml(err.to_string()))?
                .to_string();
            let value = std::str::from_utf8(&attr.value)
                .map_err(|err| DocumentError::Xml(err.to_string()))?;
            let value = quick_xml::escape::unescape(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());

            if key == "xmlns" {
                frame.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                frame.push((prefix.to_string(), value));
            } else {
                raw.push((key, value));
            }
        }
        self.frames.push(frame);

        let qualified = std::str::from_utf8(e.name().as_ref())
            .map_err(|err| DocumentError::Xml(err.to_string()))?
            .to_string();
        let (namespace, name) = match qualified.split_once(':') {
            Some((prefix, local)) => match self.lookup(prefix) {
                Some(uri) => (Some(uri), local.to_string()),
                None => (None, qualified.clone()),
            },
            None => (self.lookup(""), qualified.clone()),
        };

        // Unprefixed attributes never take the default namespace.
        let attributes = raw
            .into_iter()
            .map(|(key, value)| match key.split_once(':') {
                Some((prefix, local)) => match self.lookup(prefix) {
                    Some(uri) => Attribute {
                        namespace: Some(uri),
                        name: local.to_string(),
                        value,
                    },
                    None => Attribute {
                        namespace: None,
                        name: key,
                        value,
                    },
                },
                None => Attribute {
                    namespace: None,
                    name: key,
                    value,
                },
            })
            .collect();

        Ok(Element {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        })
    }

    fn close(&mut self) {
        self.frames.pop();
    }
}

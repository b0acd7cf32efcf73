//! Merge fields in WordprocessingML (`.docx`) documents.
//!
//! Word stores a merge field in one of two shapes:
//!
//! - A *complex* field spread over sibling runs: a run holding
//!   `<w:fldChar w:fldCharType="begin"/>`, runs holding `<w:instrText>`
//!   pieces, a `separate` run, the runs showing the current value, and an
//!   `end` run.
//! - A *simple* field: `<w:fldSimple w:instr=" MERGEFIELD Name ">` wrapping
//!   the run that shows the value.
//!
//! Both carry an instruction such as `MERGEFIELD "Name" \* FirstCap`, whose
//! name is the field expression.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::document::xml::qualified_name;
use crate::document::{DocumentError, Element, NodePath, Package, XmlDocument, XmlError};
use crate::interpreter::{Engine, PropertyStore};
use crate::merge::{FieldSource, MergeError, Placeholder, merge_fields};

/// Package part holding the main document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

const WORDPROCESSING_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Number of runs after a field's `begin` run searched for instruction text.
///
/// Instructions split over more runs are read incompletely.
pub const INSTRUCTION_LOOKAHEAD: usize = 5;

/// Instruction prefix identifying a simple merge field.
const SIMPLE_FIELD_PREFIX: &str = " MERGEFIELD";

static INSTRUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^\s*MERGEFIELD\s+(?:"(?P<quoted>[^"]+)"|(?P<bare>[^\s"]+))(?P<modifiers>(?:\s*\\\*\s*\w+)*)"#,
    )
    .expect("instruction pattern is valid")
});

static MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\*\s*(\w+)").expect("modifier pattern is valid"));

/// A parsed `MERGEFIELD` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Field name with any surrounding quotes removed.
    pub name: String,
    /// Words following `\*` switches, in order.
    pub modifiers: Vec<String>,
}

/// Parse a `MERGEFIELD` instruction, or `None` if `text` is not one.
///
/// # Example
///
/// ```
/// use docmerge::document::docx::parse_instruction;
///
/// let instruction =
///     parse_instruction(r#" MERGEFIELD "Full name" \* MERGEFORMAT \* FirstCap"#).unwrap();
/// assert_eq!(instruction.name, "Full name");
/// assert_eq!(instruction.modifiers, ["MERGEFORMAT", "FirstCap"]);
/// ```
pub fn parse_instruction(text: &str) -> Option<Instruction> {
    let captures = INSTRUCTION.captures(text)?;
    let name = captures
        .name("quoted")
        .or_else(|| captures.name("bare"))?
        .as_str()
        .to_string();
    let modifiers = captures
        .name("modifiers")
        .map(|m| {
            MODIFIER
                .captures_iter(m.as_str())
                .filter_map(|c| c.get(1))
                .map(|word| word.as_str().to_string())
                .collect()
        })
        .unwrap_or_default();
    Some(Instruction { name, modifiers })
}

/// A located merge field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocxField {
    /// Multi-run field, addressed by its `begin` run.
    Complex { begin: NodePath },
    /// `w:fldSimple` element.
    Simple { element: NodePath },
}

/// Qualified element and attribute names under the document's prefix.
#[derive(Debug, Clone)]
struct WordNames {
    run: String,
    text: String,
    field_char: String,
    field_char_type: String,
    instruction_text: String,
    simple_field: String,
    instruction: String,
}

impl WordNames {
    fn new(prefix: &str) -> Self {
        Self {
            run: qualified_name(prefix, "r"),
            text: qualified_name(prefix, "t"),
            field_char: qualified_name(prefix, "fldChar"),
            field_char_type: qualified_name(prefix, "fldCharType"),
            instruction_text: qualified_name(prefix, "instrText"),
            simple_field: qualified_name(prefix, "fldSimple"),
            instruction: qualified_name(prefix, "instr"),
        }
    }
}

/// A loaded `word/document.xml` part.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    xml: XmlDocument,
    names: WordNames,
}

impl DocxDocument {
    /// Parse document XML.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        Ok(Self::from_xml(XmlDocument::parse(source)?))
    }

    /// Wrap an already parsed document. Falls back to the `w` prefix when the
    /// root does not declare the WordprocessingML namespace.
    pub fn from_xml(xml: XmlDocument) -> Self {
        let names = WordNames::new(xml.prefix_for(WORDPROCESSING_NAMESPACE).unwrap_or("w"));
        Self { xml, names }
    }

    /// Serialize back to XML text.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        self.xml.to_xml()
    }

    /// All complex and simple merge fields, in document order.
    ///
    /// Every run with a `begin` field character counts as a complex field;
    /// whether it is a merge field is decided by its instruction text.
    pub fn fields(&self) -> Vec<DocxField> {
        let names = &self.names;
        let mut fields = Vec::new();
        self.xml.root().walk(&mut |path, element| {
            if element.name() == names.run && field_char_is(element, names, "begin") {
                fields.push(DocxField::Complex {
                    begin: path.to_vec(),
                });
            } else if element.name() == names.simple_field
                && element
                    .attribute(&names.instruction)
                    .is_some_and(|instr| instr.starts_with(SIMPLE_FIELD_PREFIX))
            {
                fields.push(DocxField::Simple {
                    element: path.to_vec(),
                });
            }
        });
        fields
    }

    /// The field's raw instruction text.
    ///
    /// For a complex field this concatenates the `w:instrText` of the first
    /// [`INSTRUCTION_LOOKAHEAD`] sibling runs after the `begin` run.
    pub fn instruction(&self, field: &DocxField) -> Option<String> {
        let root = self.xml.root();
        match field {
            DocxField::Complex { begin } => {
                let (&index, parent_path) = begin.split_last()?;
                let parent = root.get(parent_path)?;
                let text: String = parent
                    .elements()
                    .filter(|(i, element)| *i > index && element.name() == self.names.run)
                    .take(INSTRUCTION_LOOKAHEAD)
                    .flat_map(|(_, run)| run.elements())
                    .filter(|(_, element)| element.name() == self.names.instruction_text)
                    .map(|(_, element)| element.text())
                    .collect();
                Some(text)
            }
            DocxField::Simple { element } => root
                .get(element)?
                .attribute(&self.names.instruction)
                .map(ToString::to_string),
        }
    }

    /// The text the field currently displays.
    pub fn value(&self, field: &DocxField) -> Option<String> {
        let path = self.value_path(field)?;
        self.xml.root().get(&path).map(Element::text)
    }

    /// Replace the text the field displays. Returns `false` if the field has
    /// no value run.
    pub fn set_value(&mut self, field: &DocxField, value: &str) -> bool {
        let Some(path) = self.value_path(field) else {
            return false;
        };
        let Some(text) = self.xml.root_mut().get_mut(&path) else {
            return false;
        };
        text.set_text(value);
        if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
            text.set_attribute("xml:space", "preserve");
        }
        true
    }

    /// Path to the `w:t` element holding the field's displayed value.
    ///
    /// Complex fields: the first `w:t` in the first run following the first
    /// `separate` run after `begin`. Simple fields: the first `w:t` in a child
    /// run of `w:fldSimple`.
    fn value_path(&self, field: &DocxField) -> Option<NodePath> {
        let root = self.xml.root();
        let names = &self.names;
        let (parent_path, run_index, run) = match field {
            DocxField::Complex { begin } => {
                let (&index, parent_path) = begin.split_last()?;
                let parent = root.get(parent_path)?;
                let mut following = parent
                    .elements()
                    .filter(|(i, element)| *i > index && element.name() == names.run);
                following
                    .by_ref()
                    .find(|(_, run)| field_char_is(run, names, "separate"))?;
                let (run_index, run) =
                    following.find(|(_, run)| run.child(&names.text).is_some())?;
                (parent_path.to_vec(), run_index, run)
            }
            DocxField::Simple { element } => {
                let simple = root.get(element)?;
                let (run_index, run) = simple.elements().find(|(_, run)| {
                    run.name() == names.run && run.child(&names.text).is_some()
                })?;
                (element.clone(), run_index, run)
            }
        };
        let (text_index, _) = run
            .elements()
            .find(|(_, element)| element.name() == names.text)?;
        let mut path = parent_path;
        path.push(run_index);
        path.push(text_index);
        Some(path)
    }
}

/// Check if `run` holds a `w:fldChar` of the given type.
fn field_char_is(run: &Element, names: &WordNames, kind: &str) -> bool {
    run.elements().any(|(_, element)| {
        element.name() == names.field_char
            && element.attribute(&names.field_char_type) == Some(kind)
    })
}

impl FieldSource for DocxDocument {
    type Field = DocxField;

    fn locate(&self) -> Vec<DocxField> {
        self.fields()
    }

    fn read(&self, field: &DocxField) -> Option<String> {
        self.instruction(field)
    }

    fn placeholders(&self, text: &str) -> Vec<Placeholder> {
        parse_instruction(text)
            .map(|instruction| Placeholder {
                span: 0..text.len(),
                expression: instruction.name,
                modifiers: instruction.modifiers,
            })
            .into_iter()
            .collect()
    }

    /// A field displays its value alone; the instruction is not rewritten.
    fn render(&self, _text: &str, _placeholders: &[Placeholder], values: &[Option<String>]) -> String {
        values.iter().flatten().next().cloned().unwrap_or_default()
    }

    fn write(&mut self, field: &DocxField, value: &str) {
        if !self.set_value(field, value) {
            warn!(?field, "merge field has no value run; left unchanged");
        }
    }
}

/// Merge `properties` into the document at `path`, overwriting it.
pub fn merge_in_place(
    engine: &Engine,
    path: impl AsRef<Path>,
    properties: &PropertyStore,
) -> Result<Vec<MergeError>, DocumentError> {
    let path = path.as_ref();
    let mut package = Package::open(path)?;
    let xml_error = |source: XmlError| DocumentError::Xml {
        part: DOCUMENT_PART.to_string(),
        source,
    };

    let mut document = DocxDocument::parse(package.part_text(DOCUMENT_PART)?).map_err(xml_error)?;
    let errors = merge_fields(&mut document, engine, properties);
    debug!(path = %path.display(), errors = errors.len(), "merged document");

    package.set_part(DOCUMENT_PART, document.to_xml().map_err(xml_error)?.into_bytes());
    package.save(path)?;
    Ok(errors)
}

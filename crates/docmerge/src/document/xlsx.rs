//! Merge fields in SpreadsheetML (`.xlsx`) workbooks.
//!
//! Placeholders are written into cell text as `[[Name]]` and end up in the
//! shared-string table (`xl/sharedStrings.xml`). One shared string may hold
//! several placeholders; each resolves independently and is substituted in
//! place. When a fully merged string is a number, the string is emptied and
//! every cell referencing it is rewritten as a numeric cell.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::document::xml::qualified_name;
use crate::document::{DocumentError, Element, Node, NodePath, Package, XmlDocument, XmlError};
use crate::interpreter::{Engine, PropertyStore};
use crate::merge::{FieldSource, MergeError, Placeholder, merge_fields};

/// Package part holding the shared-string table.
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

const WORKSHEETS_FOLDER: &str = "xl/worksheets/";

const SPREADSHEET_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Cell attribute holding the cell's data type.
const CELL_TYPE: &str = "t";

/// Cell type marking a value as a shared-string index.
const SHARED_STRING_TYPE: &str = "s";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\s*(?P<name>[^\[\]]+?)\s*\]\]").expect("placeholder pattern is valid")
});

/// Find `[[Name]]` placeholders in `text`, left to right.
///
/// Each placeholder's span covers the brackets; its expression is the name
/// with surrounding whitespace removed.
///
/// # Example
///
/// ```
/// use docmerge::document::xlsx::find_placeholders;
///
/// let text = "Invoice [[Number]] of [[ Date ]]";
/// let placeholders = find_placeholders(text);
/// assert_eq!(placeholders[0].expression, "Number");
/// assert_eq!(&text[placeholders[1].span.clone()], "[[ Date ]]");
/// ```
pub fn find_placeholders(text: &str) -> Vec<Placeholder> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|captures| {
            let template = captures.get(0)?;
            let name = captures.name("name")?;
            Some(Placeholder {
                span: template.range(),
                expression: name.as_str().to_string(),
                modifiers: Vec::new(),
            })
        })
        .collect()
}

/// A shared string containing at least one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedStringField {
    /// Position in the shared-string table, as referenced by cells.
    pub index: usize,
    path: NodePath,
}

/// Qualified element names under a part's prefix.
#[derive(Debug, Clone)]
struct SheetNames {
    item: String,
    text: String,
    run: String,
    cell: String,
    value: String,
}

impl SheetNames {
    fn for_document(xml: &XmlDocument) -> Self {
        let prefix = xml.prefix_for(SPREADSHEET_NAMESPACE).unwrap_or("");
        Self {
            item: qualified_name(prefix, "si"),
            text: qualified_name(prefix, "t"),
            run: qualified_name(prefix, "r"),
            cell: qualified_name(prefix, "c"),
            value: qualified_name(prefix, "v"),
        }
    }
}

/// A loaded worksheet part.
#[derive(Debug, Clone)]
struct Worksheet {
    part: String,
    xml: XmlDocument,
    names: SheetNames,
    modified: bool,
}

/// The shared-string table of a workbook plus the worksheets referencing it.
#[derive(Debug, Clone)]
pub struct XlsxDocument {
    shared_strings: XmlDocument,
    names: SheetNames,
    worksheets: Vec<Worksheet>,
}

impl XlsxDocument {
    /// Parse shared-string table XML.
    pub fn parse(shared_strings: &str) -> Result<Self, XmlError> {
        let shared_strings = XmlDocument::parse(shared_strings)?;
        let names = SheetNames::for_document(&shared_strings);
        Ok(Self {
            shared_strings,
            names,
            worksheets: Vec::new(),
        })
    }

    /// Add a worksheet whose cells may reference the shared strings.
    pub fn add_worksheet(&mut self, part: impl Into<String>, source: &str) -> Result<(), XmlError> {
        let xml = XmlDocument::parse(source)?;
        let names = SheetNames::for_document(&xml);
        self.worksheets.push(Worksheet {
            part: part.into(),
            xml,
            names,
            modified: false,
        });
        Ok(())
    }

    /// Text of every shared string, in table order.
    pub fn shared_strings(&self) -> Vec<String> {
        self.items()
            .map(|(_, item)| self.item_text(item))
            .collect()
    }

    /// Serialize the shared-string table.
    pub fn shared_strings_xml(&self) -> Result<String, XmlError> {
        self.shared_strings.to_xml()
    }

    /// The `<c>` element with reference `reference` (e.g. `B2`) in a worksheet.
    pub fn cell(&self, part: &str, reference: &str) -> Option<&Element> {
        let sheet = self.worksheet(part)?;
        let mut found = None;
        sheet.xml.root().walk(&mut |path, element| {
            if found.is_none()
                && element.name() == sheet.names.cell
                && element.attribute("r") == Some(reference)
            {
                found = Some(path.to_vec());
            }
        });
        sheet.xml.root().get(&found?)
    }

    /// Shared strings containing placeholders, in table order.
    pub fn fields(&self) -> Vec<SharedStringField> {
        self.items()
            .enumerate()
            .filter(|(_, (_, item))| PLACEHOLDER.is_match(&self.item_text(item)))
            .map(|(index, (child, _))| SharedStringField {
                index,
                path: vec![child],
            })
            .collect()
    }

    /// Current text of a shared string.
    pub fn text(&self, field: &SharedStringField) -> Option<String> {
        let item = self.shared_strings.root().get(&field.path)?;
        Some(self.item_text(item))
    }

    /// Replace a shared string with plain text, dropping any rich-text runs.
    pub fn set_text(&mut self, field: &SharedStringField, value: &str) -> bool {
        let mut text = Element::new(self.names.text.as_str());
        text.set_text(value);
        if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
            text.set_attribute("xml:space", "preserve");
        }
        let Some(item) = self.shared_strings.root_mut().get_mut(&field.path) else {
            return false;
        };
        item.set_text("");
        item.push(Node::Element(text));
        true
    }

    /// Empty a shared string and turn every cell referencing it into a
    /// numeric cell holding `number`. Returns the number of cells rewritten.
    pub fn replace_with_number(&mut self, field: &SharedStringField, number: f64) -> usize {
        self.set_text(field, "");
        let index = field.index.to_string();
        let value = number.to_string();
        let mut rewritten = 0;

        for sheet in &mut self.worksheets {
            let names = &sheet.names;
            let mut cells: Vec<NodePath> = Vec::new();
            sheet.xml.root().walk(&mut |path, element| {
                if element.name() == names.cell
                    && element.attribute(CELL_TYPE) == Some(SHARED_STRING_TYPE)
                    && element
                        .child(&names.value)
                        .is_some_and(|v| v.text().trim() == index)
                {
                    cells.push(path.to_vec());
                }
            });

            for path in &cells {
                let Some(cell) = sheet.xml.root_mut().get_mut(path) else {
                    continue;
                };
                cell.remove_attribute(CELL_TYPE);
                if let Some(v) = cell.child_mut(&names.value) {
                    v.set_text(&value);
                }
            }
            if !cells.is_empty() {
                sheet.modified = true;
                rewritten += cells.len();
            }
        }
        rewritten
    }

    fn worksheet(&self, part: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|sheet| sheet.part == part)
    }

    /// `<si>` children of the table root with their child indices.
    fn items(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.shared_strings
            .root()
            .elements()
            .filter(|(_, element)| element.name() == self.names.item)
    }

    /// Visible text of a `<si>`: its `<t>` plus the `<t>` of each rich-text
    /// run. Phonetic runs are skipped.
    fn item_text(&self, item: &Element) -> String {
        let mut text = String::new();
        for (_, child) in item.elements() {
            if child.name() == self.names.text {
                text.push_str(&child.text());
            } else if child.name() == self.names.run {
                if let Some(t) = child.child(&self.names.text) {
                    text.push_str(&t.text());
                }
            }
        }
        text
    }
}

impl FieldSource for XlsxDocument {
    type Field = SharedStringField;

    fn locate(&self) -> Vec<SharedStringField> {
        self.fields()
    }

    fn read(&self, field: &SharedStringField) -> Option<String> {
        self.text(field)
    }

    fn placeholders(&self, text: &str) -> Vec<Placeholder> {
        find_placeholders(text)
    }

    fn write(&mut self, field: &SharedStringField, value: &str) {
        self.set_text(field, value);
    }

    fn commit_number(&mut self, field: &SharedStringField, number: f64) -> bool {
        let cells = self.replace_with_number(field, number);
        debug!(index = field.index, number, cells, "stored shared string as number");
        true
    }
}

/// Merge `properties` into the workbook at `path`, overwriting it.
///
/// A workbook without a shared-string table has no placeholders and is left
/// untouched.
pub fn merge_in_place(
    engine: &Engine,
    path: impl AsRef<Path>,
    properties: &PropertyStore,
) -> Result<Vec<MergeError>, DocumentError> {
    let path = path.as_ref();
    let mut package = Package::open(path)?;
    if package.part(SHARED_STRINGS_PART).is_none() {
        debug!(path = %path.display(), "workbook has no shared strings");
        return Ok(Vec::new());
    }

    let mut document = XlsxDocument::parse(package.part_text(SHARED_STRINGS_PART)?)
        .map_err(|source| xml_error(SHARED_STRINGS_PART, source))?;
    let worksheet_parts: Vec<String> = package
        .part_names()
        .filter(|name| is_worksheet_part(name))
        .map(ToString::to_string)
        .collect();
    for part in &worksheet_parts {
        document
            .add_worksheet(part.as_str(), package.part_text(part)?)
            .map_err(|source| xml_error(part, source))?;
    }

    let errors = merge_fields(&mut document, engine, properties);
    debug!(path = %path.display(), errors = errors.len(), "merged workbook");

    let shared_strings = document
        .shared_strings_xml()
        .map_err(|source| xml_error(SHARED_STRINGS_PART, source))?;
    package.set_part(SHARED_STRINGS_PART, shared_strings.into_bytes());
    for sheet in document.worksheets.iter().filter(|sheet| sheet.modified) {
        let xml = sheet
            .xml
            .to_xml()
            .map_err(|source| xml_error(&sheet.part, source))?;
        package.set_part(&sheet.part, xml.into_bytes());
    }
    package.save(path)?;
    Ok(errors)
}

/// Worksheet parts sit directly in `xl/worksheets/`; relationship parts live
/// in a subfolder.
fn is_worksheet_part(name: &str) -> bool {
    name.strip_prefix(WORKSHEETS_FOLDER)
        .is_some_and(|rest| !rest.contains('/') && rest.ends_with(".xml"))
}

fn xml_error(part: &str, source: XmlError) -> DocumentError {
    DocumentError::Xml {
        part: part.to_string(),
        source,
    }
}

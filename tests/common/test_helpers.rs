use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Schema accepting `<root>` with string content
pub const SIMPLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="root" type="xs:string"/>
</xs:schema>"#;

/// Schema for a namespaced `<n:note>` with one `<to>` child
pub const NOTE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="urn:note"
           elementFormDefault="unqualified">
    <xs:element name="note">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="to" type="xs:string"/>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

pub const VALID_NOTE_DTD_XML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE note [
<!ELEMENT note (to)>
<!ELEMENT to (#PCDATA)>
]>
<note><to>Tove</to></note>"#;

pub const INVALID_NOTE_DTD_XML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE note [
<!ELEMENT note (to)>
<!ELEMENT to (#PCDATA)>
]>
<note>
<from>Jani</from>
</note>"#;

pub const MALFORMED_XML: &str = "<root>\n<child>\n</root>";

/// Scratch directory holding the documents of one test
pub struct TestDocs {
    dir: TempDir,
}

impl TestDocs {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the scratch directory
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

/// Document whose root carries an `xsi:noNamespaceSchemaLocation` hint
pub fn xml_with_no_namespace_hint(schema_location: &str, content: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
      xsi:noNamespaceSchemaLocation="{schema_location}">{content}</root>"#
    )
}

/// Document in `urn:note` whose root carries an `xsi:schemaLocation` pair
pub fn note_with_schema_location(schema_location: &str, child: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<n:note xmlns:n="urn:note"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xsi:schemaLocation="urn:other other.xsd urn:note {schema_location}"><{child}>x</{child}></n:note>"#
    )
}

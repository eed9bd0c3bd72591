//! LibXML2 FFI Wrapper Module
//!
//! libxml2 does the actual parsing, DTD validation and XML Schema
//! validation. This module holds the raw declarations, RAII owners for the
//! libxml2 objects we allocate, and the conversion from libxml2's node
//! structures into the owned [`crate::dom`] tree.
//!
//! ## Error routing
//!
//! libxml2 reports problems through a structured error callback. Every
//! operation here takes an `on_error` closure; a C trampoline forwards each
//! `xmlError` to it as an [`XmlErrorRecord`] while the operation runs.
//! Parser errors go through the thread-local handler installed by
//! `xmlSetStructuredErrorFunc`, schema errors through the per-context
//! handlers. The thread-local handler is removed again when the parse
//! returns.
//!
//! ## Struct layouts
//!
//! `XmlNode`, `XmlAttr`, `XmlNs` and `XmlDoc` mirror the public layout of
//! libxml2's tree structures. `XmlAttr` and `XmlDoc` declare only the
//! leading fields we read; they are never constructed on the Rust side.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::ops::BitOr;
use std::path::PathBuf;
use std::ptr::{self, NonNull};
use std::sync::Once;

use libc::{c_char, c_int, c_long, c_ushort, c_void};

use crate::dom::{DocumentTree, Node};
use crate::error::{LibXml2Error, LibXml2Result};

/// Global initialization flag for libxml2
///
/// `xmlInitParser` is not thread-safe, so it runs exactly once.
static LIBXML2_INIT: Once = Once::new();

// xmlElementType values
const XML_ELEMENT_NODE: c_int = 1;
const XML_TEXT_NODE: c_int = 3;
const XML_CDATA_SECTION_NODE: c_int = 4;
const XML_ENTITY_REF_NODE: c_int = 5;
const XML_PI_NODE: c_int = 7;
const XML_COMMENT_NODE: c_int = 8;
const XML_DTD_NODE: c_int = 14;
const XML_XINCLUDE_START: c_int = 19;
const XML_XINCLUDE_END: c_int = 20;

// Opaque libxml2 structures
#[repr(C)]
pub struct XmlParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchema {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaValidCtxt {
    _private: [u8; 0],
}

/// `xmlNs`
#[allow(dead_code)]
#[repr(C)]
pub struct XmlNs {
    next: *mut XmlNs,
    kind: c_int,
    href: *const c_char,
    prefix: *const c_char,
    _private: *mut c_void,
    context: *mut XmlDoc,
}

/// `xmlNode`
#[allow(dead_code)]
#[repr(C)]
pub struct XmlNode {
    _private: *mut c_void,
    kind: c_int,
    name: *const c_char,
    children: *mut XmlNode,
    last: *mut XmlNode,
    parent: *mut XmlNode,
    next: *mut XmlNode,
    prev: *mut XmlNode,
    doc: *mut XmlDoc,
    ns: *mut XmlNs,
    content: *mut c_char,
    properties: *mut XmlAttr,
    ns_def: *mut XmlNs,
    psvi: *mut c_void,
    line: c_ushort,
    extra: c_ushort,
}

/// Leading fields of `xmlAttr`
#[allow(dead_code)]
#[repr(C)]
pub struct XmlAttr {
    _private: *mut c_void,
    kind: c_int,
    name: *const c_char,
    children: *mut XmlNode,
    last: *mut XmlNode,
    parent: *mut XmlNode,
    next: *mut XmlAttr,
    prev: *mut XmlAttr,
    doc: *mut XmlDoc,
    ns: *mut XmlNs,
}

/// Leading fields of `xmlDoc`
#[allow(dead_code)]
#[repr(C)]
pub struct XmlDoc {
    _private: *mut c_void,
    kind: c_int,
    name: *mut c_char,
    children: *mut XmlNode,
}

/// `xmlError`
#[repr(C)]
pub struct XmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut c_void, error: *const XmlError)>;

// External libxml2 FFI declarations
#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    pub fn xmlInitParser();

    // Document parsing
    pub fn xmlNewParserCtxt() -> *mut XmlParserCtxt;
    pub fn xmlFreeParserCtxt(ctxt: *mut XmlParserCtxt);
    pub fn xmlCtxtReadMemory(
        ctxt: *mut XmlParserCtxt,
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    pub fn xmlFreeDoc(doc: *mut XmlDoc);
    pub fn xmlGetLineNo(node: *const XmlNode) -> c_long;

    pub fn xmlSetStructuredErrorFunc(ctx: *mut c_void, handler: XmlStructuredErrorFunc);

    // Schema parsing functions
    pub fn xmlSchemaNewParserCtxt(url: *const c_char) -> *mut XmlSchemaParserCtxt;
    pub fn xmlSchemaSetParserStructuredErrors(
        ctxt: *mut XmlSchemaParserCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    pub fn xmlSchemaParse(ctxt: *const XmlSchemaParserCtxt) -> *mut XmlSchema;
    pub fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    pub fn xmlSchemaFree(schema: *mut XmlSchema);

    // Schema validation functions
    pub fn xmlSchemaNewValidCtxt(schema: *const XmlSchema) -> *mut XmlSchemaValidCtxt;
    pub fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    pub fn xmlSchemaSetValidStructuredErrors(
        ctxt: *mut XmlSchemaValidCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    pub fn xmlSchemaValidateDoc(ctxt: *mut XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;
}

/// `xmlErrorLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlErrorLevel {
    None,
    Warning,
    Error,
    Fatal,
}

impl XmlErrorLevel {
    pub fn from_raw(level: c_int) -> Self {
        match level {
            1 => XmlErrorLevel::Warning,
            2 => XmlErrorLevel::Error,
            3 => XmlErrorLevel::Fatal,
            _ => XmlErrorLevel::None,
        }
    }
}

/// Owned copy of an `xmlError` handed to `on_error` closures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlErrorRecord {
    pub level: XmlErrorLevel,
    pub file: Option<String>,
    pub line: i32,
    pub message: String,
}

impl XmlErrorRecord {
    /// # Safety
    ///
    /// `error` must be a live `xmlError` passed in by libxml2.
    unsafe fn from_raw(error: &XmlError) -> Self {
        let message = unsafe { c_string(error.message) }.unwrap_or_default();
        Self {
            level: XmlErrorLevel::from_raw(error.level),
            file: unsafe { c_string(error.file) },
            line: error.line,
            message: message.trim_end().to_string(),
        }
    }
}

/// Callback for libxml2 to report errors (structured)
///
/// `user_data` points at a `&mut dyn FnMut(XmlErrorRecord)` living on the
/// stack of the operation that registered it.
unsafe extern "C" fn structured_error_callback(user_data: *mut c_void, error: *const XmlError) {
    if user_data.is_null() || error.is_null() {
        return;
    }

    let handler = unsafe { &mut *(user_data as *mut &mut dyn FnMut(XmlErrorRecord)) };
    let record = unsafe { XmlErrorRecord::from_raw(&*error) };
    handler(record);
}

/// Keeps the thread-local structured error handler installed while alive
struct StructuredErrorScope {
    _not_send: PhantomData<*mut c_void>,
}

impl StructuredErrorScope {
    /// # Safety
    ///
    /// `context` must stay valid until the scope is dropped.
    unsafe fn install(context: *mut c_void) -> Self {
        unsafe { xmlSetStructuredErrorFunc(context, Some(structured_error_callback)) };
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for StructuredErrorScope {
    fn drop(&mut self) {
        unsafe { xmlSetStructuredErrorFunc(ptr::null_mut(), None) };
    }
}

/// `XML_PARSE_*` option bits for the document parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions(c_int);

impl ParseOptions {
    /// Substitute entities
    pub const NOENT: Self = Self(1 << 1);
    /// Load the external subset
    pub const DTDLOAD: Self = Self(1 << 2);
    /// Default DTD attributes
    pub const DTDATTR: Self = Self(1 << 3);
    /// Validate with the DTD
    pub const DTDVALID: Self = Self(1 << 4);
    /// Forbid network access
    pub const NONET: Self = Self(1 << 11);
    /// Line numbers above 65535
    pub const BIG_LINES: Self = Self(1 << 22);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> c_int {
        self.0
    }
}

impl BitOr for ParseOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Outcome of validating a document against a compiled schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Validation succeeded (return code 0)
    Valid,
    /// Validation failed with errors (return code > 0)
    Invalid { error_count: i32 },
    /// Internal error occurred (return code < 0)
    InternalError { code: i32 },
}

impl ValidationResult {
    pub fn from_code(code: c_int) -> Self {
        match code {
            0 => ValidationResult::Valid,
            n if n > 0 => ValidationResult::Invalid { error_count: n },
            n => ValidationResult::InternalError { code: n },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Owner of a parsed libxml2 document
#[derive(Debug)]
pub struct XmlDocPtr {
    ptr: NonNull<XmlDoc>,
    url: String,
}

impl XmlDocPtr {
    /// # Safety
    ///
    /// `ptr` must be null or a document allocated by libxml2 that nothing
    /// else frees.
    unsafe fn from_raw(ptr: *mut XmlDoc, url: &str) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| XmlDocPtr {
            ptr,
            url: url.to_string(),
        })
    }

    pub(crate) fn as_ptr(&self) -> *mut XmlDoc {
        self.ptr.as_ptr()
    }

    /// The URL the document was parsed under
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Source line of the document element, if libxml2 recorded one
    pub fn root_line(&self) -> Option<u32> {
        unsafe {
            let mut cursor = (*self.as_ptr()).children;
            while !cursor.is_null() {
                if (*cursor).kind == XML_ELEMENT_NODE {
                    let line = xmlGetLineNo(cursor);
                    return u32::try_from(line).ok().filter(|&line| line > 0);
                }
                cursor = (*cursor).next;
            }
        }
        None
    }

    /// Copy the libxml2 tree into an owned [`DocumentTree`]
    pub fn to_tree(&self) -> DocumentTree {
        let mut root = Node::document();
        root.children = unsafe { convert_siblings((*self.as_ptr()).children) };
        DocumentTree::new(root, self.url.clone())
    }
}

impl Drop for XmlDocPtr {
    fn drop(&mut self) {
        unsafe { xmlFreeDoc(self.ptr.as_ptr()) };
    }
}

/// Owner of a compiled XML Schema
#[derive(Debug)]
pub struct XmlSchemaPtr {
    ptr: NonNull<XmlSchema>,
}

impl XmlSchemaPtr {
    /// # Safety
    ///
    /// `ptr` must be null or a schema returned by `xmlSchemaParse` that
    /// nothing else frees.
    unsafe fn from_raw(ptr: *mut XmlSchema) -> LibXml2Result<Self> {
        NonNull::new(ptr)
            .map(|ptr| XmlSchemaPtr { ptr })
            .ok_or(LibXml2Error::SchemaParseFailed)
    }

    pub(crate) fn as_ptr(&self) -> *const XmlSchema {
        self.ptr.as_ptr()
    }
}

impl Drop for XmlSchemaPtr {
    fn drop(&mut self) {
        unsafe { xmlSchemaFree(self.ptr.as_ptr()) };
    }
}

/// Safe entry point to the libxml2 operations this crate needs
pub struct LibXml2Wrapper {
    _phantom: PhantomData<()>,
}

impl LibXml2Wrapper {
    /// Create a new wrapper, initializing libxml2 on first use
    pub fn new() -> Self {
        LIBXML2_INIT.call_once(|| unsafe {
            xmlInitParser();
        });

        LibXml2Wrapper {
            _phantom: PhantomData,
        }
    }

    /// Parse a document held in memory
    ///
    /// `url` becomes the document's base URL: relative DTD and entity
    /// references resolve against it and libxml2 reports it as the error
    /// file. Errors and warnings go to `on_error` as they happen.
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::DocumentParseFailed` when libxml2 produces no
    /// document (the input is not well-formed).
    pub fn read_memory(
        &self,
        buffer: &[u8],
        url: &str,
        options: ParseOptions,
        mut on_error: &mut dyn FnMut(XmlErrorRecord),
    ) -> LibXml2Result<XmlDocPtr> {
        let size = c_int::try_from(buffer.len()).map_err(|_| LibXml2Error::InvalidInput {
            details: format!("document of {} bytes is too large", buffer.len()),
        })?;
        let c_url = to_c_string(url)?;
        let url_ptr = if url.is_empty() {
            ptr::null()
        } else {
            c_url.as_ptr()
        };

        unsafe {
            let ctxt = xmlNewParserCtxt();
            if ctxt.is_null() {
                return Err(LibXml2Error::ParserContextCreationFailed);
            }

            let doc = {
                let _scope = StructuredErrorScope::install(handler_context(&mut on_error));
                xmlCtxtReadMemory(
                    ctxt,
                    buffer.as_ptr() as *const c_char,
                    size,
                    url_ptr,
                    ptr::null(),
                    options.bits(),
                )
            };

            xmlFreeParserCtxt(ctxt);

            XmlDocPtr::from_raw(doc, url).ok_or_else(|| LibXml2Error::DocumentParseFailed {
                source_locator: url.to_string(),
            })
        }
    }

    /// Load and compile the XML Schema at `location` (path or URL)
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::SchemaParseFailed` if the schema cannot be
    /// compiled; the reasons have already gone to `on_error`.
    pub fn parse_schema_file(
        &self,
        location: &str,
        mut on_error: &mut dyn FnMut(XmlErrorRecord),
    ) -> LibXml2Result<XmlSchemaPtr> {
        let c_location = to_c_string(location)?;

        unsafe {
            let parser_ctxt = xmlSchemaNewParserCtxt(c_location.as_ptr());
            if parser_ctxt.is_null() {
                return Err(LibXml2Error::ParserContextCreationFailed);
            }

            let context = handler_context(&mut on_error);
            xmlSchemaSetParserStructuredErrors(
                parser_ctxt,
                Some(structured_error_callback),
                context,
            );

            let schema = {
                // Reading the schema document itself reports through the
                // thread-local handler.
                let _scope = StructuredErrorScope::install(context);
                xmlSchemaParse(parser_ctxt)
            };

            xmlSchemaFreeParserCtxt(parser_ctxt);

            XmlSchemaPtr::from_raw(schema)
        }
    }

    /// Validate a parsed document against a compiled schema
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::ValidationContextCreationFailed` if no
    /// validation context can be created and
    /// `LibXml2Error::ValidationFailed` on internal libxml2 errors.
    pub fn validate_document(
        &self,
        schema: &XmlSchemaPtr,
        doc: &XmlDocPtr,
        mut on_error: &mut dyn FnMut(XmlErrorRecord),
    ) -> LibXml2Result<ValidationResult> {
        unsafe {
            let valid_ctxt = xmlSchemaNewValidCtxt(schema.as_ptr());
            if valid_ctxt.is_null() {
                return Err(LibXml2Error::ValidationContextCreationFailed);
            }

            xmlSchemaSetValidStructuredErrors(
                valid_ctxt,
                Some(structured_error_callback),
                handler_context(&mut on_error),
            );

            let result_code = xmlSchemaValidateDoc(valid_ctxt, doc.as_ptr());

            xmlSchemaFreeValidCtxt(valid_ctxt);

            match ValidationResult::from_code(result_code) {
                ValidationResult::InternalError { code } => Err(LibXml2Error::ValidationFailed {
                    code,
                    file: PathBuf::from(doc.url()),
                }),
                result => Ok(result),
            }
        }
    }
}

impl Default for LibXml2Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

fn handler_context(handler: &mut &mut dyn FnMut(XmlErrorRecord)) -> *mut c_void {
    ptr::from_mut(handler).cast::<c_void>()
}

fn to_c_string(value: &str) -> LibXml2Result<CString> {
    CString::new(value).map_err(|_| LibXml2Error::InvalidInput {
        details: format!("{value:?} contains a NUL byte"),
    })
}

/// # Safety
///
/// `ptr` must be null or a NUL-terminated string.
unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// # Safety
///
/// `first` must be null or the head of a live libxml2 sibling list.
unsafe fn convert_siblings(first: *const XmlNode) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut cursor = first;
    while !cursor.is_null() {
        if let Some(node) = unsafe { convert_node(cursor) } {
            nodes.push(node);
        }
        cursor = unsafe { (*cursor).next };
    }
    nodes
}

/// # Safety
///
/// `raw` must point to a live libxml2 node. For DTD nodes only the fields
/// shared with `xmlNode` up to `next` are read.
unsafe fn convert_node(raw: *const XmlNode) -> Option<Node> {
    let kind = unsafe { (*raw).kind };
    let name = unsafe { c_string((*raw).name) }.unwrap_or_default();

    let node = match kind {
        XML_ELEMENT_NODE => unsafe { convert_element(raw) },
        XML_TEXT_NODE => Node::text(unsafe { node_content(raw) }),
        XML_CDATA_SECTION_NODE => Node::cdata(unsafe { node_content(raw) }),
        XML_COMMENT_NODE => Node::comment(unsafe { node_content(raw) }),
        XML_PI_NODE => Node::processing_instruction(&name, unsafe { node_content(raw) }),
        XML_DTD_NODE => Node::document_type(&name),
        XML_ENTITY_REF_NODE => Node::entity_reference(&name),
        XML_XINCLUDE_START | XML_XINCLUDE_END => return None,
        _ => Node::unknown(&name),
    };
    Some(node)
}

unsafe fn node_content(raw: *const XmlNode) -> String {
    unsafe { c_string((*raw).content) }.unwrap_or_default()
}

/// Namespace URI and prefix of an `xmlNs`
unsafe fn namespace_parts(ns: *const XmlNs) -> (Option<String>, Option<String>) {
    if ns.is_null() {
        return (None, None);
    }
    unsafe { (c_string((*ns).href), c_string((*ns).prefix)) }
}

unsafe fn convert_element(raw: *const XmlNode) -> Node {
    let local_name = unsafe { c_string((*raw).name) }.unwrap_or_default();
    let (namespace_uri, prefix) = unsafe { namespace_parts((*raw).ns) };
    let mut element =
        Node::element_from_parts(&local_name, prefix.as_deref(), namespace_uri.as_deref());

    let mut declaration = unsafe { (*raw).ns_def };
    while !declaration.is_null() {
        let (uri, declared_prefix) = unsafe { namespace_parts(declaration) };
        element.attributes.push(Node::namespace_declaration(
            declared_prefix.as_deref(),
            uri.unwrap_or_default(),
        ));
        declaration = unsafe { (*declaration).next };
    }

    let mut attribute = unsafe { (*raw).properties };
    while !attribute.is_null() {
        element
            .attributes
            .push(unsafe { convert_attribute(attribute) });
        attribute = unsafe { (*attribute).next };
    }

    element.children = unsafe { convert_siblings((*raw).children) };
    element
}

unsafe fn convert_attribute(raw: *const XmlAttr) -> Node {
    let local_name = unsafe { c_string((*raw).name) }.unwrap_or_default();
    let (namespace_uri, prefix) = unsafe { namespace_parts((*raw).ns) };

    let mut value = String::new();
    let mut child = unsafe { (*raw).children };
    while !child.is_null() {
        match unsafe { (*child).kind } {
            XML_TEXT_NODE => value.push_str(&unsafe { node_content(child) }),
            XML_ENTITY_REF_NODE => {
                let name = unsafe { c_string((*child).name) }.unwrap_or_default();
                value.push_str(&format!("&{name};"));
            }
            _ => {}
        }
        child = unsafe { (*child).next };
    }

    Node::attribute_from_parts(
        &local_name,
        prefix.as_deref(),
        namespace_uri.as_deref(),
        value,
    )
}

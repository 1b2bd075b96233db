//! Distinguished names.
//!
//! A [`Name`] keeps every attribute exactly as it was encoded (OID, string
//! type, raw value and which RDN set it belongs to) so that a parsed name
//! re-encodes to identical bytes.

use core::fmt;
use core::str::FromStr;

use const_oid::ObjectIdentifier;
use der::asn1::{Any, Ia5StringRef, PrintableStringRef, SetOfVec};
use der::{Decode, Encode, Tag, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use crate::error::{CertwrightError, Result};

/// `(short name, long name, oid)` for the attributes OpenSSL knows by name.
const ATTRIBUTES: &[(&str, &str, &str)] = &[
    ("C", "countryName", "2.5.4.6"),
    ("ST", "stateOrProvinceName", "2.5.4.8"),
    ("L", "localityName", "2.5.4.7"),
    ("street", "streetAddress", "2.5.4.9"),
    ("O", "organizationName", "2.5.4.10"),
    ("OU", "organizationalUnitName", "2.5.4.11"),
    ("CN", "commonName", "2.5.4.3"),
    ("SN", "surname", "2.5.4.4"),
    ("GN", "givenName", "2.5.4.42"),
    ("title", "title", "2.5.4.12"),
    ("initials", "initials", "2.5.4.43"),
    ("pseudonym", "pseudonym", "2.5.4.65"),
    ("name", "name", "2.5.4.41"),
    ("postalCode", "postalCode", "2.5.4.17"),
    ("serialNumber", "serialNumber", "2.5.4.5"),
    ("dnQualifier", "dnQualifier", "2.5.4.46"),
    ("emailAddress", "emailAddress", "1.2.840.113549.1.9.1"),
    ("DC", "domainComponent", "0.9.2342.19200300.100.1.25"),
    ("UID", "userId", "0.9.2342.19200300.100.1.1"),
];

fn resolve_field(field: &str) -> Result<ObjectIdentifier> {
    if let Some((_, _, oid)) = ATTRIBUTES
        .iter()
        .find(|(short, long, _)| *short == field || long.eq_ignore_ascii_case(field))
    {
        return ObjectIdentifier::new(oid).map_err(|e| CertwrightError::InvalidInput(e.to_string()));
    }
    ObjectIdentifier::new(field)
        .map_err(|_| CertwrightError::InvalidInput(format!("unknown name attribute '{field}'")))
}

/// OpenSSL short name for an attribute OID, or the dotted OID.
pub fn short_name(oid: &ObjectIdentifier) -> String {
    let dotted = oid.to_string();
    ATTRIBUTES
        .iter()
        .find(|(_, _, o)| *o == dotted)
        .map(|(short, _, _)| short.to_string())
        .unwrap_or(dotted)
}

fn default_tag(oid: &ObjectIdentifier) -> Tag {
    match oid.to_string().as_str() {
        "2.5.4.6" | "2.5.4.5" | "2.5.4.46" => Tag::PrintableString,
        "1.2.840.113549.1.9.1" | "0.9.2342.19200300.100.1.25" => Tag::Ia5String,
        _ => Tag::Utf8String,
    }
}

/// One attribute of a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    oid: ObjectIdentifier,
    tag: Tag,
    value: Vec<u8>,
    set: usize,
}

impl NameEntry {
    pub fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    /// ASN.1 string type the value is encoded with.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn value_bytes(&self) -> &[u8] {
        &self.value
    }

    pub fn value(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }

    /// Index of the RDN set this entry belongs to.
    pub fn set(&self) -> usize {
        self.set
    }

    pub fn short_name(&self) -> String {
        short_name(&self.oid)
    }
}

/// An ordered distinguished name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    entries: Vec<NameEntry>,
}

impl Name {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `field=value` as a new RDN.
    ///
    /// `field` is an OpenSSL short or long name (`CN`, `commonName`) or a
    /// dotted OID. The string type is PrintableString for country, serial
    /// number and DN qualifier, IA5String for email address and domain
    /// component, and UTF8String otherwise.
    pub fn add_entry(&mut self, field: &str, value: &str) -> Result<()> {
        let oid = resolve_field(field)?;
        let tag = default_tag(&oid);
        match tag {
            Tag::PrintableString => {
                PrintableStringRef::new(value)?;
            }
            Tag::Ia5String => {
                Ia5StringRef::new(value)?;
            }
            _ => {}
        }
        let set = self.entries.last().map(|e| e.set + 1).unwrap_or(0);
        self.entries.push(NameEntry {
            oid,
            tag,
            value: value.as_bytes().to_vec(),
            set,
        });
        Ok(())
    }

    /// Builder-style [`add_entry`](Self::add_entry).
    pub fn with_entry(mut self, field: &str, value: &str) -> Result<Self> {
        self.add_entry(field, value)?;
        Ok(self)
    }

    /// Parses the OpenSSL slash form, e.g. `/C=US/O=Example Corp/CN=example.com`.
    ///
    /// A backslash escapes the next character, so `\/` is a literal slash.
    pub fn parse(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix('/')
            .ok_or_else(|| CertwrightError::InvalidInput(format!("name must start with '/': {s}")))?;

        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '/' => parts.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        parts.push(current);

        let mut name = Name::new();
        for part in parts.iter().filter(|p| !p.is_empty()) {
            let (field, value) = part.split_once('=').ok_or_else(|| {
                CertwrightError::InvalidInput(format!("missing '=' in name component '{part}'"))
            })?;
            name.add_entry(field.trim(), value)?;
        }
        Ok(name)
    }

    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<String> {
        let oid = resolve_field(field).ok()?;
        self.entries
            .iter()
            .find(|e| e.oid == oid)
            .map(NameEntry::value)
    }

    /// Renders the name as `C=US, O=Example Corp, CN=example.com`.
    pub fn to_oneline(&self) -> String {
        self.render(", ", " + ")
    }

    fn render(&self, rdn_separator: &str, set_separator: &str) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                if self.entries[i - 1].set == entry.set {
                    out.push_str(set_separator);
                } else {
                    out.push_str(rdn_separator);
                }
            }
            out.push_str(&entry.short_name());
            out.push('=');
            out.push_str(&entry.value());
        }
        out
    }

    pub fn to_x509(&self) -> Result<x509_cert::name::Name> {
        let mut rdns: Vec<RelativeDistinguishedName> = Vec::new();
        let mut last_set = None;
        for entry in &self.entries {
            let attr = AttributeTypeAndValue {
                oid: entry.oid,
                value: Any::new(entry.tag, entry.value.clone())?,
            };
            match rdns.last_mut() {
                Some(rdn) if last_set == Some(entry.set) => rdn.0.insert(attr)?,
                _ => {
                    let mut set = SetOfVec::new();
                    set.insert(attr)?;
                    rdns.push(RelativeDistinguishedName(set));
                }
            }
            last_set = Some(entry.set);
        }
        Ok(RdnSequence(rdns))
    }

    pub fn from_x509(name: &x509_cert::name::Name) -> Self {
        let entries = name
            .0
            .iter()
            .enumerate()
            .flat_map(|(set, rdn)| {
                rdn.0.iter().map(move |attr| NameEntry {
                    oid: attr.oid,
                    tag: attr.value.tag(),
                    value: attr.value.value().to_vec(),
                    set,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_x509()?.to_der()?)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self::from_x509(&x509_cert::name::Name::from_der(der)?))
    }
}

impl fmt::Display for Name {
    /// The slash form accepted by [`Name::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }
        write!(f, "/{}", self.render("/", "+"))
    }
}

impl FromStr for Name {
    type Err = CertwrightError;

    fn from_str(s: &str) -> Result<Self> {
        Name::parse(s)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Attributes and attribute groups.
//
// An attribute is a value tag, a name, and one or more values that all share
// that tag.  A group is a delimiter tag and an ordered list of attributes.

use std::fmt;

use chrono::{DateTime, Utc};

use vprint_core::error::{Result, VprintError};

use crate::tag::{DelimiterTag, ValueTag};
use crate::value::Value;

pub const ATTRIBUTES_CHARSET: &str = "attributes-charset";
pub const ATTRIBUTES_NATURAL_LANGUAGE: &str = "attributes-natural-language";

/// Charset advertised in every response.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Natural language advertised in every response.
pub const DEFAULT_NATURAL_LANGUAGE: &str = "en-us";

/// A named, tagged, non-empty list of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    tag: ValueTag,
    name: String,
    values: Vec<Value>,
}

impl Attribute {
    /// Create an attribute holding its first value.
    ///
    /// Rejects an empty or whitespace-only name.
    pub fn new(tag: ValueTag, name: impl Into<String>, value: Value) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(VprintError::InvalidAttributeName(name));
        }
        Ok(Self::named(tag, name, value))
    }

    /// Constructor for names known at compile time.
    pub(crate) fn named(tag: ValueTag, name: impl Into<String>, value: Value) -> Self {
        Self {
            tag,
            name: name.into(),
            values: vec![value],
        }
    }

    /// Build a multi-valued attribute from an iterator.
    ///
    /// Returns `EmptyAttribute` when `values` yields nothing.
    pub fn with_values(
        tag: ValueTag,
        name: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self> {
        let name = name.into();
        let mut values = values.into_iter();
        let first = values
            .next()
            .ok_or_else(|| VprintError::EmptyAttribute(name.clone()))?;
        let mut attribute = Self::new(tag, name, first)?;
        attribute.values.extend(values);
        Ok(attribute)
    }

    // -- Kind constructors --------------------------------------------------

    pub fn keyword(name: &str, value: impl Into<String>) -> Self {
        Self::named(ValueTag::Keyword, name, Value::text(value))
    }

    /// Multi-valued keyword attribute; an empty list yields a single empty keyword.
    pub fn keywords<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::strings_of(ValueTag::Keyword, name, values)
    }

    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self::named(ValueTag::TextWithoutLanguage, name, Value::text(value))
    }

    pub fn name_value(name: &str, value: impl Into<String>) -> Self {
        Self::named(ValueTag::NameWithoutLanguage, name, Value::text(value))
    }

    pub fn uri(name: &str, value: impl Into<String>) -> Self {
        Self::named(ValueTag::Uri, name, Value::text(value))
    }

    pub fn charset(name: &str, value: impl Into<String>) -> Self {
        Self::named(ValueTag::Charset, name, Value::text(value))
    }

    pub fn natural_language(name: &str, value: impl Into<String>) -> Self {
        Self::named(ValueTag::NaturalLanguage, name, Value::text(value))
    }

    pub fn mime_types<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::strings_of(ValueTag::MimeMediaType, name, values)
    }

    pub fn integer(name: &str, value: i32) -> Self {
        Self::named(ValueTag::Integer, name, Value::Integer(value))
    }

    pub fn enumeration(name: &str, value: i32) -> Self {
        Self::named(ValueTag::Enum, name, Value::Enum(value))
    }

    pub fn enumerations(name: &str, values: impl IntoIterator<Item = i32>) -> Self {
        let mut attribute = Self {
            tag: ValueTag::Enum,
            name: name.into(),
            values: values.into_iter().map(Value::Enum).collect(),
        };
        if attribute.values.is_empty() {
            attribute.values.push(Value::NoValue);
            attribute.tag = ValueTag::NoValue;
        }
        attribute
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        Self::named(ValueTag::Boolean, name, Value::Boolean(value))
    }

    pub fn date_time(name: &str, value: DateTime<Utc>) -> Self {
        Self::named(ValueTag::DateTime, name, Value::DateTime(value))
    }

    fn strings_of<I, S>(tag: ValueTag, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<Value> = values.into_iter().map(Value::text).collect();
        if values.is_empty() {
            values.push(Value::text(""));
        }
        Self {
            tag,
            name: name.into(),
            values,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Append an additional value. The name is not re-validated.
    pub fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn first_value(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn first_string(&self) -> Option<&str> {
        self.values.first().and_then(Value::as_str)
    }

    pub fn first_integer(&self) -> Option<i32> {
        self.values.first().and_then(Value::as_integer)
    }

    /// Every string-family value, in order. Non-string values are skipped.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(Value::as_str)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) = ", self.name, self.tag)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// A delimiter tag with its ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    tag: DelimiterTag,
    attributes: Vec<Attribute>,
}

impl Group {
    pub fn new(tag: DelimiterTag) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
        }
    }

    /// The standard operation-attributes group: `attributes-charset` then
    /// `attributes-natural-language`.
    pub fn operation_attributes() -> Self {
        let mut group = Self::new(DelimiterTag::OperationAttributes);
        group.push(Attribute::charset(ATTRIBUTES_CHARSET, DEFAULT_CHARSET));
        group.push(Attribute::natural_language(
            ATTRIBUTES_NATURAL_LANGUAGE,
            DEFAULT_NATURAL_LANGUAGE,
        ));
        group
    }

    pub fn tag(&self) -> DelimiterTag {
        self.tag
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.push(attribute);
        self
    }

    /// First attribute named `name`.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.tag)?;
        for attribute in &self.attributes {
            writeln!(f, "  {attribute}")?;
        }
        Ok(())
    }
}

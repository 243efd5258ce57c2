//! Section lookup and key/value upserts on a [`ConfigDocument`].

use super::node::{ConfigDocument, Element};
use super::DocumentError;

pub const APP_SETTINGS: &str = "appSettings";
pub const CONNECTION_STRINGS: &str = "connectionStrings";

/// Tag used for entry elements inside a section.
pub const ENTRY_TAG: &str = "add";

/// Attribute names that identify an entry and carry its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryShape {
    pub key: &'static str,
    pub value: &'static str,
}

impl EntryShape {
    /// `<add key="..." value="..."/>`, used by generic sections.
    pub const KEY_VALUE: EntryShape = EntryShape {
        key: "key",
        value: "value",
    };

    /// `<add name="..." connectionString="..."/>`.
    pub const CONNECTION_STRING: EntryShape = EntryShape {
        key: "name",
        value: "connectionString",
    };

    /// The shape conventionally used by a section of this name.
    pub fn for_section(name: &str) -> EntryShape {
        if name == CONNECTION_STRINGS {
            EntryShape::CONNECTION_STRING
        } else {
            EntryShape::KEY_VALUE
        }
    }
}

impl Element {
    /// Inserts or updates the entry identified by `key`.
    ///
    /// An existing entry keeps its position and has its value attribute
    /// overwritten; otherwise a new entry is appended.
    pub fn set_entry(&mut self, shape: EntryShape, key: &str, value: &str) -> &mut Self {
        let existing = self
            .elements_mut()
            .find(|e| e.name() == ENTRY_TAG && e.attribute(shape.key) == Some(key));

        match existing {
            Some(entry) => entry.set_attribute(shape.value, value),
            None => {
                self.add_element(
                    Element::new(ENTRY_TAG)
                        .with_attribute(shape.key, key)
                        .with_attribute(shape.value, value),
                );
            }
        }
        self
    }

    /// The value of the entry identified by `key`, if any.
    pub fn entry_value(&self, shape: EntryShape, key: &str) -> Option<&str> {
        self.entries(shape)
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// All well-formed entries of this section, in document order.
    ///
    /// Entries missing either attribute are skipped.
    pub fn entries(&self, shape: EntryShape) -> impl Iterator<Item = (&str, &str)> {
        self.elements()
            .filter(|e| e.name() == ENTRY_TAG)
            .filter_map(move |e| Some((e.attribute(shape.key)?, e.attribute(shape.value)?)))
    }
}

impl ConfigDocument {
    /// Finds the section `name` directly under the root.
    ///
    /// Absence is `Ok(None)`; only a wrong root is an error.
    pub fn section(&self, name: &str) -> Result<Option<&Element>, DocumentError> {
        Ok(self.root()?.element(name))
    }

    /// Finds the section `name`, appending an empty one when it is missing
    /// and `create_if_missing` is set.
    pub fn get_section(
        &mut self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<Option<&mut Element>, DocumentError> {
        let root = self.root_mut()?;
        if create_if_missing && root.element(name).is_none() {
            root.add_element(Element::new(name));
        }
        Ok(root.element_mut(name))
    }

    pub fn app_settings(&self) -> Result<Option<&Element>, DocumentError> {
        self.section(APP_SETTINGS)
    }

    pub fn connection_strings(&self) -> Result<Option<&Element>, DocumentError> {
        self.section(CONNECTION_STRINGS)
    }

    /// Upserts `entries` into the section `name` using `shape`, creating the
    /// section when missing. Later duplicates in `entries` win.
    pub fn set_section_entries<I, K, V>(
        &mut self,
        name: &str,
        shape: EntryShape,
        entries: I,
    ) -> Result<&mut Self, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let root = self.root_mut()?;
        match root.element_mut(name) {
            Some(section) => upsert_all(section, shape, entries),
            None => {
                let mut section = Element::new(name);
                upsert_all(&mut section, shape, entries);
                root.add_element(section);
            }
        }
        Ok(self)
    }

    /// Upserts `key`/`value` entries into the section `name`.
    pub fn set_key_value_section<I, K, V>(
        &mut self,
        name: &str,
        entries: I,
    ) -> Result<&mut Self, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.set_section_entries(name, EntryShape::KEY_VALUE, entries)
    }

    pub fn set_app_settings<I, K, V>(&mut self, entries: I) -> Result<&mut Self, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.set_key_value_section(APP_SETTINGS, entries)
    }

    pub fn set_connection_strings<I, K, V>(
        &mut self,
        entries: I,
    ) -> Result<&mut Self, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.set_section_entries(CONNECTION_STRINGS, EntryShape::CONNECTION_STRING, entries)
    }
}

fn upsert_all<I, K, V>(section: &mut Element, shape: EntryShape, entries: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in entries {
        section.set_entry(shape, key.as_ref(), value.as_ref());
    }
}

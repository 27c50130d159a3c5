/// A `SimpleData` entry of a placemark: attribute name and text value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataField {
    pub name: String,
    pub value: String,
}

impl DataField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// One placemark as read from the cartography document, before any typed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub fields: Vec<DataField>,
    /// Text of the outer boundary `coordinates` element (empty if the placemark has none).
    pub ring: String,
}

impl RawRecord {
    /// Value of the first field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }
}

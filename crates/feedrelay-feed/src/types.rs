/// One feed entry as parsed, fields raw and untrusted.
///
/// `description` keeps its original markup; sanitization for the delivery
/// transport happens downstream. `links` preserves document order: the
/// alternate/main link first, then enclosure and media URLs.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub links: Vec<String>,
    /// Date-like fields in document order as `(element name, raw value)`.
    /// Only the first occurrence of each element name is kept.
    pub date_fields: Vec<(String, String)>,
}

impl RawEntry {
    /// Raw value of a date-like field by element name, if the entry had one.
    #[must_use]
    pub fn date_field(&self, name: &str) -> Option<&str> {
        self.date_fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

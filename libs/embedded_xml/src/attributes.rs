/// XML attribute reader
///
/// Iterates the `name="value"` pairs of a start tag. Values may be single or
/// double quoted and can contain whitespace. Iteration stops at the first
/// malformed pair.
#[derive(Clone)]
pub struct AttributeReader<'a> {
    rest: &'a str,
}

impl core::fmt::Debug for AttributeReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut builder = f.debug_map();
        for (n, v) in self.clone() {
            builder.entry(&n, &v);
        }
        builder.finish()
    }
}

impl Default for AttributeReader<'_> {
    fn default() -> Self {
        AttributeReader { rest: "" }
    }
}

impl PartialEq for AttributeReader<'_> {
    fn eq(&self, other: &Self) -> bool {
        let mut lhs = self.clone();
        let mut rhs = other.clone();
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return true,
                (Some((n1, v1)), Some((n2, v2))) if n1.eq_ignore_ascii_case(n2) && v1 == v2 => {}
                _ => return false,
            }
        }
    }
}

impl<'a> AttributeReader<'a> {
    /// ```
    /// # use embedded_xml::AttributeReader;
    /// let mut reader = AttributeReader::from_block(r#"foo="bar" baz='qux quux'"#);
    /// assert_eq!(reader.next(), Some(("foo", "bar")));
    /// assert_eq!(reader.next(), Some(("baz", "qux quux")));
    /// assert_eq!(reader.next(), None);
    /// ```
    pub fn from_block(block: &str) -> AttributeReader<'_> {
        AttributeReader {
            rest: block.trim_ascii(),
        }
    }

    /// Case-insensitive search by attribute name. Returns the value or None.
    /// ```
    /// # use embedded_xml::AttributeReader;
    /// let reader = AttributeReader::from_block(r#"foo="bar" Baz = 'qux'"#);
    /// assert_eq!(reader.get("foo"), Some("bar"));
    /// assert_eq!(reader.get("baz"), Some("qux"));
    /// assert_eq!(reader.get("nonexistent"), None);
    /// ```
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.clone()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    fn malformed(&mut self) -> Option<(&'a str, &'a str)> {
        trace!("Ignoring malformed attributes: {:?}", self.rest);
        self.rest = "";
        None
    }
}

impl<'a> Iterator for AttributeReader<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.rest.trim_ascii_start();
        if block.is_empty() {
            return None;
        }
        let Some((name, value)) = block.split_once('=') else {
            return self.malformed();
        };
        let name = name.trim_ascii_end();
        if name.is_empty() || name.contains(|c: char| c.is_ascii_whitespace()) {
            return self.malformed();
        }
        let value = value.trim_ascii_start();
        let Some(quote) = value.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            // unquoted value, HTML style
            let end = value
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(value.len());
            self.rest = &value[end..];
            return Some((name, &value[..end]));
        };
        let value = &value[1..];
        let Some(end) = value.find(quote) else {
            return self.malformed();
        };
        self.rest = &value[end + 1..];
        Some((name, &value[..end]))
    }
}

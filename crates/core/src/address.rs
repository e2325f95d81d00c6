use serde::{Deserialize, Serialize};

/// Country used when a stored address has none.
pub const DEFAULT_COUNTRY: &str = "France";

/// Postal address of a client or a job site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl PostalAddress {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// Single-line rendering, e.g. `12 rue des Lilas, 69003 Lyon`.
    pub fn one_line(&self) -> String {
        format!("{}, {} {}", self.street, self.postal_code, self.city)
    }
}

impl Default for PostalAddress {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_puts_postal_code_before_city() {
        let addr = PostalAddress::new("12 rue des Lilas", "Lyon", "69003", "France");
        assert_eq!(addr.one_line(), "12 rue des Lilas, 69003 Lyon");
    }

    #[test]
    fn default_country_is_france() {
        assert_eq!(PostalAddress::default().country, "France");
    }
}

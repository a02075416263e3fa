use regex::Regex;

use crate::models::FacilityRecord;

/// Builds geocoder queries from facility records.
///
/// The facility-type prefix carries no location information, so it is
/// stripped before the name is combined with district and country.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    prefix: Option<Regex>,
    country: String,
}

impl QueryComposer {
    pub fn new(name_prefix: &str, country: &str) -> Result<Self, regex::Error> {
        let prefix = if name_prefix.trim().is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)^{}\s*",
                regex::escape(name_prefix.trim())
            ))?)
        };

        Ok(Self {
            prefix,
            country: country.to_string(),
        })
    }

    pub fn clean_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(re) => re.replace(name, "").trim().to_string(),
            None => name.trim().to_string(),
        }
    }

    /// `"<cleaned name>, <district>, <country>"`
    pub fn compose(&self, record: &FacilityRecord) -> String {
        format!(
            "{}, {}, {}",
            self.clean_name(&record.name),
            record.district,
            self.country
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> QueryComposer {
        QueryComposer::new("CEBA", "Perú").unwrap()
    }

    #[test]
    fn test_compose_strips_prefix() {
        let record = FacilityRecord::new("CEBA Norte", "Lima").unwrap();
        assert_eq!(composer().compose(&record), "Norte, lima, Perú");
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let c = composer();
        assert_eq!(c.clean_name("ceba  San Martín"), "San Martín");
        assert_eq!(c.clean_name("Ceba José Olaya"), "José Olaya");
    }

    #[test]
    fn test_prefix_only_at_start() {
        assert_eq!(
            composer().clean_name("Colegio CEBA Central"),
            "Colegio CEBA Central"
        );
    }

    #[test]
    fn test_empty_prefix_keeps_name() {
        let c = QueryComposer::new("", "Perú").unwrap();
        assert_eq!(c.clean_name(" CEBA Norte "), "CEBA Norte");
    }
}

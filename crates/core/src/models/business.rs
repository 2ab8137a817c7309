//! Business (item) records

use serde::{Deserialize, Deserializer, Serialize};

/// A business that can be reviewed and recommended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    /// Unique business identifier
    pub business_id: String,

    /// Business name
    #[serde(default)]
    pub name: String,

    /// Category labels (e.g. "Pizza", "Beauty & Spas")
    ///
    /// The raw dataset stores these as one comma-separated string and may
    /// leave them null; both forms are accepted.
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub categories: Vec<String>,
}

impl Business {
    pub fn new(business_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategories {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCategories>::deserialize(deserializer)?;
    let categories = match raw {
        None => Vec::new(),
        Some(RawCategories::List(list)) => list,
        Some(RawCategories::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
    };
    Ok(categories)
}

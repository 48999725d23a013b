use serde::{Deserialize, Serialize};

/// A user-defined spending category with its allowed subcategories.
///
/// This is display/validation metadata for the host UI; matching never
/// consults it. Deserialization also accepts the legacy shape, a bare category
/// name, which is upgraded to a category with no subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CategoryRepr")]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<String>,
}

impl Category {
    /// Creates a category without subcategories.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subcategories: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    Named {
        name: String,
        #[serde(default)]
        subcategories: Vec<String>,
    },
    Bare(String),
}

impl From<CategoryRepr> for Category {
    fn from(repr: CategoryRepr) -> Self {
        match repr {
            CategoryRepr::Named {
                name,
                subcategories,
            } => Category {
                name,
                subcategories,
            },
            CategoryRepr::Bare(name) => Category {
                name,
                subcategories: Vec::new(),
            },
        }
    }
}

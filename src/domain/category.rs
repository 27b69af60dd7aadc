use serde::{Deserialize, Serialize};

/// Expense category attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Icon name understood by the presentation layer
    pub icon: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

const BUILTIN: [(&str, &str, &str); 8] = [
    ("1", "Food", "fast-food-outline"),
    ("2", "Transportation", "car-outline"),
    ("3", "Shopping", "cart-outline"),
    ("4", "Entertainment", "game-controller-outline"),
    ("5", "Health", "medical-outline"),
    ("6", "Education", "book-outline"),
    ("7", "Bills", "receipt-outline"),
    ("8", "Other", "ellipsis-horizontal-outline"),
];

/// The built-in expense categories offered to users.
pub fn builtin_categories() -> Vec<Category> {
    BUILTIN
        .iter()
        .map(|(id, name, icon)| Category::new(*id, *name, *icon))
        .collect()
}

/// Find a built-in category by id or by case-insensitive name.
pub fn find_category(key: &str) -> Option<Category> {
    let key = key.trim();
    BUILTIN
        .iter()
        .find(|(id, name, _)| *id == key || name.eq_ignore_ascii_case(key))
        .map(|(id, name, icon)| Category::new(*id, *name, *icon))
}

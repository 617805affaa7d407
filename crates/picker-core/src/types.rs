use serde::{Deserialize, Serialize};

/// A catalog product. `name` is the unique key used by the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub brand: String,
    pub name: String,
    pub category: String,
    pub image: String,
    pub description: String,
}

impl Product {
    /// Stand-in for a selected name that no longer resolves against the catalog.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            id: None,
            brand: String::new(),
            name: name.into(),
            category: String::new(),
            image: String::new(),
            description: String::new(),
        }
    }
}

/// On-disk shape of the product data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFile {
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn of the conversation sent to the assistant endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_product_file_ignores_unknown_fields() {
        let json = r#"{"products":[{"id":7,"brand":"CeraVe","name":"Foaming Cleanser",
            "category":"cleanser","image":"a.jpg","description":"d","extra":true}]}"#;
        let file: ProductFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.products.len(), 1);
        assert_eq!(file.products[0].id, Some(7));
        assert_eq!(file.products[0].category, "cleanser");
    }

    #[test]
    fn test_product_missing_field_is_rejected() {
        let json = r#"{"products":[{"brand":"CeraVe","name":"X","category":"c","image":"i"}]}"#;
        assert!(serde_json::from_str::<ProductFile>(json).is_err());
    }
}

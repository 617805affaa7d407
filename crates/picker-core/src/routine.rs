use crate::error::Result;
use crate::types::Product;

/// Shown instead of calling the assistant when nothing is selected.
pub const EMPTY_SELECTION_NOTICE: &str =
    "Please select at least one product to generate a routine.";

/// The synthetic user turn asking for a routine built from `products`.
pub fn routine_request(products: &[Product]) -> Result<String> {
    let listing = serde_json::to_string_pretty(products)?;
    Ok(format!(
        "Here are the selected products as JSON:\n{}\nPlease generate a step-by-step routine using these products.",
        listing
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    #[test]
    fn test_routine_request_embeds_products() {
        let products = vec![product("Product A", "CeraVe", "skincare")];
        let text = routine_request(&products).unwrap();

        assert!(text.starts_with("Here are the selected products as JSON:\n["));
        assert!(text.ends_with("\nPlease generate a step-by-step routine using these products."));

        let start = text.find('[').unwrap();
        let end = text.rfind(']').unwrap();
        let embedded: Vec<Product> = serde_json::from_str(&text[start..=end]).unwrap();
        assert_eq!(embedded, products);
    }
}

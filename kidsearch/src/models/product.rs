use serde::Serialize;

use crate::elastic::ProductSource;

const MISSING_LABEL: &str = "N/A";
const CATEGORY_LABEL_CHARS: usize = 40;

/// A catalogue product with CSV artefacts cleaned up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub brand: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// `"nan"` is what pandas wrote for empty cells when the index was built.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
}

fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

impl From<ProductSource> for Product {
    fn from(source: ProductSource) -> Self {
        let image_url = clean_text(source.image_url).filter(|url| url.starts_with("http"));

        Self {
            name: source.product_name.trim().to_string(),
            brand: clean_text(source.brand),
            price: source.price.unwrap_or(0.0),
            category: clean_text(source.category),
            image_url,
        }
    }
}

impl Product {
    pub fn brand_label(&self) -> &str {
        self.brand.as_deref().unwrap_or(MISSING_LABEL)
    }

    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .map(|c| truncate_chars(c, CATEGORY_LABEL_CHARS))
            .unwrap_or(MISSING_LABEL)
    }

    pub fn price_label(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// First `max` characters of the name followed by an ellipsis.
    pub fn short_name(&self, max: usize) -> String {
        format!("{}...", truncate_chars(&self.name, max))
    }
}

// Prompt text for document analysis.

/// System instruction for a compliance analysis. `{product}` is substituted
/// with the caller's product label.
pub const ANALYSIS_SYSTEM_TEMPLATE: &str = "\
You are an expert in internal audit and compliance. \
Analyze the following document text for the product: {product}. \
Generate a detailed, actionable list of security controls to be implemented for this product. \
Format your response as JSON with keys: summary, controls (array of detailed controls), \
risks (array of detailed risks).";

pub fn analysis_system_prompt(product: &str) -> String {
    let product = product.trim();
    let product = if product.is_empty() { "N/A" } else { product };
    ANALYSIS_SYSTEM_TEMPLATE.replace("{product}", product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_product_and_keys() {
        let prompt = analysis_system_prompt("Card Vault");
        assert!(prompt.contains("for the product: Card Vault."));
        for key in ["summary", "controls", "risks"] {
            assert!(prompt.contains(key));
        }
    }

    #[test]
    fn test_blank_product_becomes_na() {
        assert!(analysis_system_prompt("   ").contains("for the product: N/A."));
    }
}

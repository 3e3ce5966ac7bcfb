//! The extraction instruction sent alongside every statement.
//!
//! The instruction is identical for every request and is not configurable.
//! It is assembled once from three parts: the task preamble, the category
//! list (generated from [`Category::ALL`] so the prompt and the typed
//! taxonomy cannot drift apart), and the filtering policy plus output-shape
//! contract.
//!
//! The policy ("skip transfers and deposits", "use Other when unsure") is
//! enforced only by the model. The handler relays whatever comes back.

use crate::output::Category;
use once_cell::sync::Lazy;

const PREAMBLE: &str = r#"You are analyzing a bank statement PDF. Extract ALL transactions and categorize them for a restaurant business.

Extract each transaction with:
1. Date (YYYY-MM-DD format)
2. Description/Merchant
3. Amount (positive number, no currency symbols)
4. Suggested Category (from the list below)

CATEGORIES (choose most appropriate):
"#;

const POLICY_AND_FORMAT: &str = r#"
IMPORTANT:
- Skip: payments to credit cards, transfers between accounts, deposits
- Only include: actual business expenses (purchases, bills, fees)
- If unsure about category, use "Other"

Return ONLY valid JSON (no markdown, no backticks):
{
  "transactions": [
    {
      "date": "2026-02-15",
      "merchant": "SYSCO FOODS",
      "amount": 1234.56,
      "category": "Food & Supplies"
    }
  ]
}"#;

/// The full extraction instruction.
pub static EXTRACTION_PROMPT: Lazy<String> = Lazy::new(|| {
    let mut prompt = String::from(PREAMBLE);
    for category in Category::ALL {
        prompt.push_str("- ");
        prompt.push_str(category.label());
        prompt.push('\n');
    }
    prompt.push_str(POLICY_AND_FORMAT);
    prompt
});

/// Borrow the extraction instruction.
pub fn extraction_prompt() -> &'static str {
    EXTRACTION_PROMPT.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_listed_in_order() {
        let prompt = extraction_prompt();
        let mut last = 0;
        for c in Category::ALL {
            let needle = format!("\n- {}\n", c.label());
            let pos = prompt
                .find(&needle)
                .unwrap_or_else(|| panic!("category {c} missing from prompt"));
            assert!(pos >= last, "category {c} out of order");
            last = pos;
        }
    }

    #[test]
    fn category_list_sits_between_header_and_policy() {
        let prompt = extraction_prompt();
        assert!(prompt.contains("CATEGORIES (choose most appropriate):\n- Food & Supplies\n"));
        assert!(prompt.contains("- Other\n\nIMPORTANT:"));
    }

    #[test]
    fn policy_and_format_contract_present() {
        let prompt = extraction_prompt();
        assert!(prompt.contains("Skip: payments to credit cards, transfers between accounts, deposits"));
        assert!(prompt.contains(r#"If unsure about category, use "Other""#));
        assert!(prompt.contains("no markdown, no backticks"));
        assert!(prompt.ends_with('}'));
    }

    #[test]
    fn embedded_example_is_valid_json() {
        let prompt = extraction_prompt();
        let start = prompt.find("{\n  \"transactions\"").unwrap();
        let example: serde_json::Value = serde_json::from_str(&prompt[start..]).unwrap();
        assert_eq!(example["transactions"][0]["merchant"], "SYSCO FOODS");
    }
}

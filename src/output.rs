//! Typed views over the model's extraction result.
//!
//! The endpoint relays the model's JSON untouched, so nothing here sits on
//! the request path. These types exist for library and CLI consumers that
//! want to work with transactions as Rust values after the fact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Expense category offered to the model.
///
/// The variant order is the order the labels appear in the extraction
/// instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Supplies")]
    FoodAndSupplies,
    #[serde(rename = "Beverage")]
    Beverage,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Rent")]
    Rent,
    #[serde(rename = "Payroll")]
    Payroll,
    #[serde(rename = "Equipment")]
    Equipment,
    #[serde(rename = "Marketing")]
    Marketing,
    #[serde(rename = "Maintenance & Repairs")]
    MaintenanceAndRepairs,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Licenses & Permits")]
    LicensesAndPermits,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
    #[serde(rename = "Sales Tax")]
    SalesTax,
    #[serde(rename = "Payroll Taxes")]
    PayrollTaxes,
    #[serde(rename = "Other Taxes")]
    OtherTaxes,
    #[serde(rename = "Bank Fees")]
    BankFees,
    #[serde(rename = "Credit Card Fees")]
    CreditCardFees,
    #[serde(rename = "Transaction Fees")]
    TransactionFees,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Every category, in instruction order.
    pub const ALL: [Category; 19] = [
        Category::FoodAndSupplies,
        Category::Beverage,
        Category::Utilities,
        Category::Rent,
        Category::Payroll,
        Category::Equipment,
        Category::Marketing,
        Category::MaintenanceAndRepairs,
        Category::Insurance,
        Category::LicensesAndPermits,
        Category::ProfessionalServices,
        Category::OfficeSupplies,
        Category::SalesTax,
        Category::PayrollTaxes,
        Category::OtherTaxes,
        Category::BankFees,
        Category::CreditCardFees,
        Category::TransactionFees,
        Category::Other,
    ];

    /// The exact label the model is asked to emit.
    pub fn label(self) -> &'static str {
        match self {
            Category::FoodAndSupplies => "Food & Supplies",
            Category::Beverage => "Beverage",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::Payroll => "Payroll",
            Category::Equipment => "Equipment",
            Category::Marketing => "Marketing",
            Category::MaintenanceAndRepairs => "Maintenance & Repairs",
            Category::Insurance => "Insurance",
            Category::LicensesAndPermits => "Licenses & Permits",
            Category::ProfessionalServices => "Professional Services",
            Category::OfficeSupplies => "Office Supplies",
            Category::SalesTax => "Sales Tax",
            Category::PayrollTaxes => "Payroll Taxes",
            Category::OtherTaxes => "Other Taxes",
            Category::BankFees => "Bank Fees",
            Category::CreditCardFees => "Credit Card Fees",
            Category::TransactionFees => "Transaction Fees",
            Category::Other => "Other",
        }
    }

    /// Map a model-produced label back to a category.
    ///
    /// Matching ignores case and surrounding whitespace. Anything outside the
    /// taxonomy lands in [`Category::Other`], the same bucket the model is
    /// told to use when unsure.
    pub fn from_label(label: &str) -> Category {
        let label = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One expense line as produced by the model.
///
/// `category` stays a string: the model may drift outside the taxonomy and
/// the endpoint never coerces. Use [`Transaction::category`] for the typed
/// view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub merchant: String,
    /// Positive amount without currency symbol.
    pub amount: f64,
    #[serde(rename = "category")]
    pub category_label: String,
}

impl Transaction {
    pub fn category(&self) -> Category {
        Category::from_label(&self.category_label)
    }
}

/// The full extraction result: transactions in the order the model listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub transactions: Vec<Transaction>,
}

impl ExtractionOutput {
    /// Decode a relayed result into typed transactions.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Sum of all transaction amounts.
    pub fn total(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    /// Per-category totals in taxonomy order, skipping empty categories.
    pub fn totals_by_category(&self) -> Vec<(Category, f64)> {
        Category::ALL
            .into_iter()
            .filter_map(|c| {
                let mut matched = self.transactions.iter().filter(|t| t.category() == c).peekable();
                matched.peek()?;
                Some((c, matched.map(|t| t.amount).sum::<f64>()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_round_trip_through_serde() {
        for c in Category::ALL {
            let v = serde_json::to_value(c).unwrap();
            assert_eq!(v, json!(c.label()));
        }
    }

    #[test]
    fn from_label_is_lenient() {
        assert_eq!(Category::from_label("  bank fees "), Category::BankFees);
        assert_eq!(Category::from_label("Food & Supplies"), Category::FoodAndSupplies);
        assert_eq!(Category::from_label("Groceries"), Category::Other);
    }

    #[test]
    fn decode_relayed_result() {
        let value = json!({
            "transactions": [
                {"date": "2026-02-15", "merchant": "SYSCO FOODS", "amount": 1234.56, "category": "Food & Supplies"},
                {"date": "2026-02-16", "merchant": "XCEL ENERGY", "amount": 310.0, "category": "Utilities"},
                {"date": "2026-02-17", "merchant": "US FOODS", "amount": 65.44, "category": "Food & Supplies"}
            ]
        });
        let out = ExtractionOutput::from_value(&value).unwrap();
        assert_eq!(out.transactions.len(), 3);
        assert_eq!(out.transactions[0].merchant, "SYSCO FOODS");
        assert_eq!(out.transactions[1].category(), Category::Utilities);
        assert!((out.total() - 1610.0).abs() < 1e-9);

        let by_cat = out.totals_by_category();
        assert_eq!(by_cat.len(), 2);
        assert_eq!(by_cat[0].0, Category::FoodAndSupplies);
        assert!((by_cat[0].1 - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let value = json!({"transactions": [{"date": "2026-02-15"}]});
        assert!(ExtractionOutput::from_value(&value).is_err());
    }
}

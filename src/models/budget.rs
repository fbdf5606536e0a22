use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub category: String,
    pub amount: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

impl Budget {
    pub fn new(category: String, amount: Decimal) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Self {
            category,
            amount,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

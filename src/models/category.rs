/// Category recorded on every income transaction.
pub const INCOME_CATEGORY: &str = "Salary/Income";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Food,
    Transport,
    Entertainment,
    Utilities,
    Healthcare,
    Education,
    Rent,
    Shopping,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Utilities => "Utilities",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Rent => "Rent",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the fixed set.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().to_lowercase() == lower)
    }

    pub fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Utilities,
            Self::Healthcare,
            Self::Education,
            Self::Rent,
            Self::Shopping,
            Self::Other,
        ]
    }

    /// Comma-separated list for error and help messages.
    pub fn names() -> String {
        Self::all()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

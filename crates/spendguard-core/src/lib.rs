//! Core data model and document store for spendguard
//!
//! Three user-scoped collections (users, expenses, transactions) are held
//! behind a single lock, with an optional JSON snapshot for durability.
//! Aggregation queries live in [`reports`].

pub mod error;
pub mod reports;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use uuid::Uuid;

pub use error::{CoreError, CoreResult, ErrorCode, FieldError};
pub use reports::{ActivityEntry, CategoryTotal, ExpenseTotals, FraudSummary, MonthBucket};

/// Maximum length of a free-text description
pub const MAX_DESCRIPTION_LEN: usize = 200;

// ==================== Category ====================

/// Expense category enumeration
///
/// A closed set: unknown labels are rejected when a request body is
/// deserialized, not deeper in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Healthcare,
    Education,
    Other,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Bills,
        Category::Healthcare,
        Category::Education,
        Category::Other,
    ];
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food" => Ok(Category::Food),
            "Transport" => Ok(Category::Transport),
            "Shopping" => Ok(Category::Shopping),
            "Entertainment" => Ok(Category::Entertainment),
            "Bills" => Ok(Category::Bills),
            "Healthcare" => Ok(Category::Healthcare),
            "Education" => Ok(Category::Education),
            "Other" => Ok(Category::Other),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Food => write!(f, "Food"),
            Category::Transport => write!(f, "Transport"),
            Category::Shopping => write!(f, "Shopping"),
            Category::Entertainment => write!(f, "Entertainment"),
            Category::Bills => write!(f, "Bills"),
            Category::Healthcare => write!(f, "Healthcare"),
            Category::Education => write!(f, "Education"),
            Category::Other => write!(f, "Other"),
        }
    }
}

// ==================== Fraud Verdict ====================

fn empty_analysis() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Classification result embedded in a transaction
///
/// A plain value type owned exclusively by its parent record. The field
/// constraints (confidence within [0, 1]) are enforced at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudVerdict {
    /// Whether the transaction was flagged as fraudulent
    pub is_fraud: bool,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
    /// Structured analysis of the description (may be empty)
    #[serde(default = "empty_analysis")]
    pub description_analysis: serde_json::Value,
    /// Ordered human-readable reasons (may be empty)
    #[serde(default)]
    pub reasons: Vec<String>,
    /// When the check ran
    pub checked_at: DateTime<Utc>,
}

impl FraudVerdict {
    /// Build a verdict, clamping confidence into [0, 1]
    pub fn new(
        is_fraud: bool,
        confidence: f64,
        description_analysis: serde_json::Value,
        reasons: Vec<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            is_fraud,
            confidence,
            description_analysis,
            reasons,
            checked_at: Utc::now(),
        }
    }

    /// The non-fraud, zero-confidence verdict used when the classifier
    /// is unreachable or disabled
    pub fn safe_default() -> Self {
        Self::new(false, 0.0, empty_analysis(), Vec::new())
    }
}

impl Default for FraudVerdict {
    fn default() -> Self {
        Self::safe_default()
    }
}

// ==================== Records ====================

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email (unique, case-insensitive)
    pub email: String,
    /// Hex-encoded password digest
    pub password_digest: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique record identifier
    pub id: String,
    /// Owning user id
    pub user: String,
    /// Non-negative amount
    pub amount: f64,
    /// Expense category
    pub category: Category,
    /// Optional description (at most 200 characters)
    #[serde(default)]
    pub description: String,
    /// When the expense happened
    pub date: DateTime<Utc>,
    /// When the record was created (immutable)
    pub created_at: DateTime<Utc>,
}

/// Transaction record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique record identifier
    pub id: String,
    /// Owning user id
    pub user: String,
    /// Non-negative amount
    pub amount: f64,
    /// Where the transaction took place
    pub location: String,
    /// Optional description (at most 200 characters)
    #[serde(default)]
    pub description: String,
    /// When the transaction occurred (distinct from record creation)
    pub time: DateTime<Utc>,
    /// Embedded classification result
    pub fraud_result: FraudVerdict,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

// ==================== Validated Inputs ====================

/// Unvalidated expense payload as received from the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// A validated expense creation request
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseDraft {
    /// Validate the draft, collecting field-level errors
    pub fn validate(self) -> CoreResult<NewExpense> {
        let mut errors = Vec::new();

        let amount = match self.amount {
            Some(a) if a.is_finite() && a >= 0.0 => a,
            Some(_) => {
                errors.push(FieldError::new("amount", "Amount must be a positive number"));
                0.0
            }
            None => {
                errors.push(FieldError::new("amount", "Please provide amount"));
                0.0
            }
        };

        let category = match self.category.as_deref() {
            Some(label) => match label.parse::<Category>() {
                Ok(c) => c,
                Err(_) => {
                    errors.push(FieldError::new("category", "Unknown category"));
                    Category::default()
                }
            },
            None => {
                errors.push(FieldError::new("category", "Please provide category"));
                Category::default()
            }
        };

        let description = validate_description(self.description, &mut errors);

        if errors.is_empty() {
            Ok(NewExpense {
                amount,
                category,
                description,
                date: self.date,
            })
        } else {
            Err(CoreError::Validation { errors })
        }
    }
}

/// Partial expense update as received from the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdateDraft {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// A validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseUpdateDraft {
    /// Validate the provided fields, collecting field-level errors
    pub fn validate(self) -> CoreResult<ExpensePatch> {
        let mut errors = Vec::new();

        if let Some(a) = self.amount {
            if !a.is_finite() || a < 0.0 {
                errors.push(FieldError::new("amount", "Amount must be a positive number"));
            }
        }

        let category = match self.category.as_deref() {
            Some(label) => match label.parse::<Category>() {
                Ok(c) => Some(c),
                Err(_) => {
                    errors.push(FieldError::new("category", "Unknown category"));
                    None
                }
            },
            None => None,
        };

        let description = match self.description {
            Some(d) => {
                let trimmed = d.trim().to_string();
                if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
                    errors.push(FieldError::new(
                        "description",
                        "Description cannot be more than 200 characters",
                    ));
                }
                Some(trimmed)
            }
            None => None,
        };

        if errors.is_empty() {
            Ok(ExpensePatch {
                amount: self.amount,
                category,
                description,
                date: self.date,
            })
        } else {
            Err(CoreError::Validation { errors })
        }
    }
}

/// Unvalidated transaction payload as received from the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub amount: Option<f64>,
    pub location: Option<String>,
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated transaction creation request
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub location: String,
    pub time: DateTime<Utc>,
    pub description: String,
}

impl TransactionDraft {
    /// Validate the draft, collecting field-level errors
    pub fn validate(self) -> CoreResult<NewTransaction> {
        let mut errors = Vec::new();

        let amount = match self.amount {
            Some(a) if a.is_finite() && a >= 0.0 => a,
            Some(_) => {
                errors.push(FieldError::new("amount", "Amount must be a positive number"));
                0.0
            }
            None => {
                errors.push(FieldError::new("amount", "Please provide amount"));
                0.0
            }
        };

        let location = match self.location {
            Some(l) => {
                let trimmed = l.trim().to_string();
                if trimmed.is_empty() {
                    errors.push(FieldError::new("location", "Location is required"));
                }
                trimmed
            }
            None => {
                errors.push(FieldError::new("location", "Location is required"));
                String::new()
            }
        };

        let time = match self.time {
            Some(t) => t,
            None => {
                errors.push(FieldError::new("time", "Valid date is required"));
                Utc::now()
            }
        };

        let description = validate_description(self.description, &mut errors);

        if errors.is_empty() {
            Ok(NewTransaction {
                amount,
                location,
                time,
                description,
            })
        } else {
            Err(CoreError::Validation { errors })
        }
    }
}

fn validate_description(description: Option<String>, errors: &mut Vec<FieldError>) -> String {
    let trimmed = description.unwrap_or_default().trim().to_string();
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(FieldError::new(
            "description",
            "Description cannot be more than 200 characters",
        ));
    }
    trimmed
}

// ==================== Query Types ====================

/// Filter for expense listings
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ExpenseFilter {
    fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category {
            if expense.category != category {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if expense.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if expense.date > end {
                return false;
            }
        }
        true
    }
}

/// Pagination metadata returned with every listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    /// Compute metadata; `pages = ceil(total / limit)`
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        Self {
            page: page.max(1),
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

// ==================== Store ====================

/// Snapshot-serializable store contents
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    /// Opaque session token -> user id
    #[serde(default)]
    sessions: HashMap<String, String>,
}

/// In-process document store
///
/// Single-record writes are atomic under the lock; readers clone records
/// out so aggregation never observes a partial write. The JSON snapshot
/// is best-effort durability: a failed write is logged, not surfaced.
pub struct Store {
    data: RwLock<StoreData>,
    snapshot: Option<PathBuf>,
}

impl Store {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            snapshot: None,
        }
    }

    /// Open a store backed by a JSON snapshot file
    ///
    /// A missing file starts empty; an empty path behaves like [`Store::new`].
    pub fn open(path: PathBuf) -> CoreResult<Self> {
        if path.as_os_str().is_empty() {
            return Ok(Self::new());
        }

        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let data: StoreData =
                serde_json::from_str(&content).map_err(|e| CoreError::InternalError {
                    message: format!("Corrupt snapshot {}: {}", path.display(), e),
                })?;
            log::info!(
                target: "spendguard::store",
                "Loaded snapshot {} ({} users, {} expenses, {} transactions)",
                path.display(),
                data.users.len(),
                data.expenses.len(),
                data.transactions.len()
            );
            data
        } else {
            log::info!(
                target: "spendguard::store",
                "Snapshot {} not found, starting empty",
                path.display()
            );
            StoreData::default()
        };

        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(path),
        })
    }

    fn persist(&self, data: &StoreData) {
        let Some(path) = &self.snapshot else {
            return;
        };
        let result = serde_json::to_string_pretty(data)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
                }
                std::fs::write(path, json).map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            log::error!(
                target: "spendguard::store",
                "Failed to write snapshot {}: {}",
                path.display(),
                e
            );
        }
    }

    // ==================== Users & Sessions ====================

    /// Register a new user; the email must be unused
    pub fn create_user(&self, name: &str, email: &str, password_digest: &str) -> CoreResult<User> {
        let mut data = self.data.write().unwrap();
        let email_lower = email.to_lowercase();
        if data.users.iter().any(|u| u.email.to_lowercase() == email_lower) {
            return Err(CoreError::DuplicateEntry {
                entry: email.to_string(),
            });
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_digest: password_digest.to_string(),
            created_at: Utc::now(),
        };
        data.users.push(user.clone());
        self.persist(&data);
        Ok(user)
    }

    /// Find a user by email (case-insensitive)
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let data = self.data.read().unwrap();
        let email_lower = email.to_lowercase();
        data.users
            .iter()
            .find(|u| u.email.to_lowercase() == email_lower)
            .cloned()
    }

    /// Get a user by id
    pub fn user(&self, id: &str) -> Option<User> {
        let data = self.data.read().unwrap();
        data.users.iter().find(|u| u.id == id).cloned()
    }

    /// Verify login credentials against the stored digest.
    /// A missing user and a wrong password are indistinguishable.
    pub fn authenticate(&self, email: &str, password_digest: &str) -> CoreResult<User> {
        let user = self
            .user_by_email(email)
            .ok_or(CoreError::InvalidCredentials)?;
        if user.password_digest != password_digest {
            return Err(CoreError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Issue an opaque session token for a user
    pub fn issue_token(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let mut data = self.data.write().unwrap();
        data.sessions.insert(token.clone(), user_id.to_string());
        self.persist(&data);
        token
    }

    /// Resolve a session token to its user id
    pub fn resolve_token(&self, token: &str) -> Option<String> {
        let data = self.data.read().unwrap();
        data.sessions.get(token).cloned()
    }

    // ==================== Expenses ====================

    /// Create an expense owned by `user_id`
    pub fn create_expense(&self, user_id: &str, input: NewExpense) -> CoreResult<Expense> {
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            user: user_id.to_string(),
            amount: input.amount,
            category: input.category,
            description: input.description,
            date: input.date.unwrap_or(now),
            created_at: now,
        };
        let mut data = self.data.write().unwrap();
        data.expenses.push(expense.clone());
        self.persist(&data);
        Ok(expense)
    }

    /// List a user's expenses, filtered and paginated, newest date first.
    /// Returns the page of records plus the total matching count.
    pub fn expenses(
        &self,
        user_id: &str,
        filter: &ExpenseFilter,
        page: usize,
        limit: usize,
    ) -> (Vec<Expense>, usize) {
        let data = self.data.read().unwrap();
        let mut matching: Vec<Expense> = data
            .expenses
            .iter()
            .filter(|e| e.user == user_id && filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));

        let total = matching.len();
        let page = page.max(1);
        let limit = limit.max(1);
        let skip = (page - 1) * limit;
        let records = matching.into_iter().skip(skip).take(limit).collect();
        (records, total)
    }

    /// Get one expense; absent and not-owned are indistinguishable
    pub fn expense(&self, user_id: &str, id: &str) -> CoreResult<Expense> {
        let data = self.data.read().unwrap();
        data.expenses
            .iter()
            .find(|e| e.id == id && e.user == user_id)
            .cloned()
            .ok_or(CoreError::RecordNotFound { kind: "Expense" })
    }

    /// Apply a validated patch to an owned expense
    pub fn update_expense(
        &self,
        user_id: &str,
        id: &str,
        patch: ExpensePatch,
    ) -> CoreResult<Expense> {
        let mut data = self.data.write().unwrap();
        let expense = data
            .expenses
            .iter_mut()
            .find(|e| e.id == id && e.user == user_id)
            .ok_or(CoreError::RecordNotFound { kind: "Expense" })?;

        if let Some(amount) = patch.amount {
            expense.amount = amount;
        }
        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(description) = patch.description {
            expense.description = description;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        let updated = expense.clone();
        self.persist(&data);
        Ok(updated)
    }

    /// Delete an owned expense
    pub fn delete_expense(&self, user_id: &str, id: &str) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        let before = data.expenses.len();
        data.expenses.retain(|e| !(e.id == id && e.user == user_id));
        if data.expenses.len() == before {
            return Err(CoreError::RecordNotFound { kind: "Expense" });
        }
        self.persist(&data);
        Ok(())
    }

    // ==================== Transactions ====================

    /// Create a transaction with its fraud verdict (append-only)
    pub fn create_transaction(
        &self,
        user_id: &str,
        input: NewTransaction,
        verdict: FraudVerdict,
    ) -> CoreResult<Transaction> {
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user: user_id.to_string(),
            amount: input.amount,
            location: input.location,
            description: input.description,
            time: input.time,
            fraud_result: verdict,
            created_at: Utc::now(),
        };
        let mut data = self.data.write().unwrap();
        data.transactions.push(transaction.clone());
        self.persist(&data);
        Ok(transaction)
    }

    /// List a user's transactions, newest creation first, paginated.
    /// Returns the page of records plus the total count.
    pub fn transactions(&self, user_id: &str, page: usize, limit: usize) -> (Vec<Transaction>, usize) {
        let data = self.data.read().unwrap();
        let mut matching: Vec<Transaction> = data
            .transactions
            .iter()
            .filter(|t| t.user == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let page = page.max(1);
        let limit = limit.max(1);
        let skip = (page - 1) * limit;
        let records = matching.into_iter().skip(skip).take(limit).collect();
        (records, total)
    }

    /// All of a user's flagged transactions, newest creation first
    pub fn fraud_transactions(&self, user_id: &str) -> Vec<Transaction> {
        let data = self.data.read().unwrap();
        let mut matching: Vec<Transaction> = data
            .transactions
            .iter()
            .filter(|t| t.user == user_id && t.fraud_result.is_fraud)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Tests ====================

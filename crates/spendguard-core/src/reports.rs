//! Aggregation queries and report structures
//!
//! Every operation here is read-only, scoped to one user id, and
//! reproducible for a fixed data snapshot: rerunning with unchanged data
//! yields identical output.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Category, Expense, Store, Transaction};

// ==================== Report Structures ====================

/// Sum / mean / count over a user's expense amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub total: f64,
    pub average: f64,
    pub count: usize,
}

/// Transaction-level fraud statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudSummary {
    pub total_transactions: usize,
    pub fraud_transactions: usize,
    /// Percentage of flagged transactions, rounded to 2 decimal places;
    /// 0 when there are no transactions at all
    pub fraud_rate: f64,
    pub total_amount: f64,
    pub fraud_amount: f64,
}

/// Per-category expense totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
}

/// One (year, month) bucket of the spending trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub count: usize,
}

/// A merged recent-activity item, tagged with its originating kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActivityEntry {
    Transaction {
        data: Transaction,
        date: DateTime<Utc>,
    },
    Expense {
        data: Expense,
        date: DateTime<Utc>,
    },
}

impl ActivityEntry {
    /// The timestamp this entry sorts on: creation time for transactions,
    /// expense date for expenses
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ActivityEntry::Transaction { date, .. } => *date,
            ActivityEntry::Expense { date, .. } => *date,
        }
    }

    /// Whether this entry is a flagged-fraud transaction
    pub fn is_flagged(&self) -> bool {
        match self {
            ActivityEntry::Transaction { data, .. } => data.fraud_result.is_fraud,
            ActivityEntry::Expense { .. } => false,
        }
    }
}

// ==================== Aggregation Queries ====================

impl Store {
    /// Sum, arithmetic mean, and count of a user's expense amounts.
    /// All zeros when the user has no expenses.
    pub fn expense_totals(&self, user_id: &str) -> ExpenseTotals {
        let data = self.data.read().unwrap();
        let mut total = 0.0;
        let mut count = 0usize;
        for expense in data.expenses.iter().filter(|e| e.user == user_id) {
            total += expense.amount;
            count += 1;
        }
        let average = if count == 0 { 0.0 } else { total / count as f64 };
        ExpenseTotals {
            total,
            average,
            count,
        }
    }

    /// Transaction counts and amounts, split by fraud flag
    pub fn fraud_summary(&self, user_id: &str) -> FraudSummary {
        let data = self.data.read().unwrap();
        let mut total_transactions = 0usize;
        let mut fraud_transactions = 0usize;
        let mut total_amount = 0.0;
        let mut fraud_amount = 0.0;

        for tx in data.transactions.iter().filter(|t| t.user == user_id) {
            total_transactions += 1;
            total_amount += tx.amount;
            if tx.fraud_result.is_fraud {
                fraud_transactions += 1;
                fraud_amount += tx.amount;
            }
        }

        // Rate is undefined at zero transactions; report 0 instead
        let fraud_rate = if total_transactions == 0 {
            0.0
        } else {
            let rate = fraud_transactions as f64 / total_transactions as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        };

        FraudSummary {
            total_transactions,
            fraud_transactions,
            fraud_rate,
            total_amount,
            fraud_amount,
        }
    }

    /// Group a user's expenses by category, ordered by descending total.
    /// Equal totals fall back to label order so the output is deterministic.
    pub fn category_breakdown(&self, user_id: &str) -> Vec<CategoryTotal> {
        let data = self.data.read().unwrap();
        let mut buckets: HashMap<Category, (f64, usize)> = HashMap::new();
        for expense in data.expenses.iter().filter(|e| e.user == user_id) {
            let entry = buckets.entry(expense.category).or_insert((0.0, 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let mut breakdown: Vec<CategoryTotal> = buckets
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal {
                category,
                total,
                count,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.to_string().cmp(&b.category.to_string()))
        });
        breakdown
    }

    /// Group a user's expenses by (year, month) of their date, ordered
    /// most-recent-first and truncated to the 6 newest buckets
    pub fn monthly_trends(&self, user_id: &str) -> Vec<MonthBucket> {
        let data = self.data.read().unwrap();
        let mut buckets: HashMap<(i32, u32), (f64, usize)> = HashMap::new();
        for expense in data.expenses.iter().filter(|e| e.user == user_id) {
            let key = (expense.date.year(), expense.date.month());
            let entry = buckets.entry(key).or_insert((0.0, 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let mut trends: Vec<MonthBucket> = buckets
            .into_iter()
            .map(|((year, month), (total, count))| MonthBucket {
                year,
                month,
                total,
                count,
            })
            .collect();
        trends.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        trends.truncate(6);
        trends
    }

    /// A user's most recently created transactions
    pub fn recent_transactions(&self, user_id: &str, limit: usize) -> Vec<Transaction> {
        let data = self.data.read().unwrap();
        let mut matching: Vec<Transaction> = data
            .transactions
            .iter()
            .filter(|t| t.user == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        matching
    }

    /// A user's most recent expenses, by expense date
    pub fn recent_expenses(&self, user_id: &str, limit: usize) -> Vec<Expense> {
        let data = self.data.read().unwrap();
        let mut matching: Vec<Expense> = data
            .expenses
            .iter()
            .filter(|e| e.user == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        matching.truncate(limit);
        matching
    }

    /// Merge the `limit` most recent transactions (by creation time) and
    /// expenses (by date) into one kind-tagged list, sorted descending by
    /// each item's relevant timestamp and truncated to `limit`
    pub fn recent_activity(&self, user_id: &str, limit: usize) -> Vec<ActivityEntry> {
        let mut entries: Vec<ActivityEntry> = self
            .recent_transactions(user_id, limit)
            .into_iter()
            .map(|t| ActivityEntry::Transaction {
                date: t.created_at,
                data: t,
            })
            .chain(
                self.recent_expenses(user_id, limit)
                    .into_iter()
                    .map(|e| ActivityEntry::Expense {
                        date: e.date,
                        data: e,
                    }),
            )
            .collect();
        entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        entries.truncate(limit);
        entries
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FraudVerdict;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn expense(user: &str, amount: f64, category: Category, at: DateTime<Utc>) -> Expense {
        Expense {
            id: format!("exp-{}-{}", category, at.timestamp()),
            user: user.to_string(),
            amount,
            category,
            description: String::new(),
            date: at,
            created_at: at,
        }
    }

    fn transaction(user: &str, amount: f64, flagged: bool, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: format!("tx-{}", created_at.timestamp()),
            user: user.to_string(),
            amount,
            location: "Delhi".to_string(),
            description: String::new(),
            time: created_at,
            fraud_result: FraudVerdict::new(
                flagged,
                if flagged { 0.9 } else { 0.0 },
                serde_json::json!({}),
                vec![],
            ),
            created_at,
        }
    }

    fn store_with(expenses: Vec<Expense>, transactions: Vec<Transaction>) -> Store {
        let store = Store::new();
        {
            let mut data = store.data.write().unwrap();
            data.expenses = expenses;
            data.transactions = transactions;
        }
        store
    }

    #[test]
    fn test_expense_totals_empty_user() {
        let store = store_with(vec![], vec![]);
        let totals = store.expense_totals("user-a");
        assert_eq!(
            totals,
            ExpenseTotals {
                total: 0.0,
                average: 0.0,
                count: 0
            }
        );
        assert!(!totals.average.is_nan());
    }

    #[test]
    fn test_expense_totals() {
        let store = store_with(
            vec![
                expense("user-a", 100.0, Category::Food, date(2026, 7, 1)),
                expense("user-a", 50.0, Category::Transport, date(2026, 7, 2)),
                expense("user-b", 999.0, Category::Other, date(2026, 7, 3)),
            ],
            vec![],
        );
        let totals = store.expense_totals("user-a");
        assert_eq!(totals.total, 150.0);
        assert_eq!(totals.average, 75.0);
        assert_eq!(totals.count, 2);
    }

    #[test]
    fn test_fraud_rate_zero_transactions() {
        let store = store_with(vec![], vec![]);
        let summary = store.fraud_summary("user-a");
        assert_eq!(summary.fraud_rate, 0.0);
        assert_eq!(summary.total_transactions, 0);
        assert!(!summary.fraud_rate.is_nan());
    }

    #[test]
    fn test_fraud_summary_rounding() {
        let store = store_with(
            vec![],
            vec![
                transaction("user-a", 500.0, true, date(2026, 7, 1)),
                transaction("user-a", 100.0, false, date(2026, 7, 2)),
                transaction("user-a", 200.0, false, date(2026, 7, 3)),
            ],
        );
        let summary = store.fraud_summary("user-a");
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.fraud_transactions, 1);
        assert_eq!(summary.fraud_rate, 33.33);
        assert_eq!(summary.total_amount, 800.0);
        assert_eq!(summary.fraud_amount, 500.0);
    }

    #[test]
    fn test_category_breakdown_descending() {
        let store = store_with(
            vec![
                expense("user-a", 100.0, Category::Food, date(2026, 7, 1)),
                expense("user-a", 50.0, Category::Transport, date(2026, 7, 2)),
            ],
            vec![],
        );
        let breakdown = store.category_breakdown("user-a");
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, Category::Food);
        assert_eq!(breakdown[0].total, 100.0);
        assert_eq!(breakdown[0].count, 1);
        assert_eq!(breakdown[1].category, Category::Transport);
        assert_eq!(breakdown[1].total, 50.0);
        assert_eq!(breakdown[1].count, 1);
    }

    #[test]
    fn test_category_breakdown_sums_match_total() {
        let store = store_with(
            vec![
                expense("user-a", 10.0, Category::Food, date(2026, 5, 1)),
                expense("user-a", 20.0, Category::Food, date(2026, 5, 2)),
                expense("user-a", 30.0, Category::Bills, date(2026, 5, 3)),
                expense("user-a", 40.0, Category::Other, date(2026, 5, 4)),
            ],
            vec![],
        );
        let breakdown_sum: f64 = store.category_breakdown("user-a").iter().map(|c| c.total).sum();
        assert_eq!(breakdown_sum, store.expense_totals("user-a").total);
    }

    #[test]
    fn test_category_breakdown_tie_break_is_deterministic() {
        let store = store_with(
            vec![
                expense("user-a", 25.0, Category::Shopping, date(2026, 5, 1)),
                expense("user-a", 25.0, Category::Bills, date(2026, 5, 2)),
            ],
            vec![],
        );
        let first = store.category_breakdown("user-a");
        let second = store.category_breakdown("user-a");
        assert_eq!(first, second);
        // Equal totals fall back to label order
        assert_eq!(first[0].category, Category::Bills);
        assert_eq!(first[1].category, Category::Shopping);
    }

    #[test]
    fn test_monthly_trends_caps_at_six_newest() {
        let mut expenses = Vec::new();
        for month in 1..=8 {
            expenses.push(expense(
                "user-a",
                month as f64 * 10.0,
                Category::Food,
                date(2026, month, 15),
            ));
        }
        let store = store_with(expenses, vec![]);

        let trends = store.monthly_trends("user-a");
        assert_eq!(trends.len(), 6);
        // Newest first: August down to March
        assert_eq!(trends[0].month, 8);
        assert_eq!(trends[5].month, 3);
        for pair in trends.windows(2) {
            assert!((pair[0].year, pair[0].month) > (pair[1].year, pair[1].month));
        }
    }

    #[test]
    fn test_monthly_trends_buckets_span_years() {
        let store = store_with(
            vec![
                expense("user-a", 10.0, Category::Food, date(2025, 12, 20)),
                expense("user-a", 15.0, Category::Food, date(2026, 1, 5)),
                expense("user-a", 5.0, Category::Food, date(2026, 1, 25)),
            ],
            vec![],
        );
        let trends = store.monthly_trends("user-a");
        assert_eq!(trends.len(), 2);
        assert_eq!((trends[0].year, trends[0].month), (2026, 1));
        assert_eq!(trends[0].total, 20.0);
        assert_eq!(trends[0].count, 2);
        assert_eq!((trends[1].year, trends[1].month), (2025, 12));
    }

    #[test]
    fn test_recent_activity_merge_order() {
        // Two transactions at T1 < T2 and one expense at T3 with T1 < T3 < T2
        let t1 = date(2026, 7, 1);
        let t2 = date(2026, 7, 10);
        let t3 = date(2026, 7, 5);
        let store = store_with(
            vec![expense("user-a", 30.0, Category::Food, t3)],
            vec![
                transaction("user-a", 10.0, false, t1),
                transaction("user-a", 20.0, false, t2),
            ],
        );

        let activity = store.recent_activity("user-a", 2);
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].timestamp(), t2);
        assert!(matches!(activity[0], ActivityEntry::Transaction { .. }));
        assert_eq!(activity[1].timestamp(), t3);
        assert!(matches!(activity[1], ActivityEntry::Expense { .. }));
    }

    #[test]
    fn test_recent_activity_respects_limit_and_order() {
        let mut expenses = Vec::new();
        let mut transactions = Vec::new();
        for day in 1..=8 {
            expenses.push(expense("user-a", 1.0, Category::Food, date(2026, 6, day)));
            transactions.push(transaction("user-a", 1.0, false, date(2026, 6, day + 10)));
        }
        let store = store_with(expenses, transactions);

        let activity = store.recent_activity("user-a", 5);
        assert_eq!(activity.len(), 5);
        for pair in activity.windows(2) {
            assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
        // The five newest items are all transactions (days 14..18)
        assert!(activity.iter().all(|e| matches!(e, ActivityEntry::Transaction { .. })));
    }

    #[test]
    fn test_recent_activity_tags_serialize() {
        let store = store_with(
            vec![expense("user-a", 30.0, Category::Food, date(2026, 7, 5))],
            vec![transaction("user-a", 10.0, true, date(2026, 7, 10))],
        );
        let activity = store.recent_activity("user-a", 5);
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json[0]["type"], "transaction");
        assert_eq!(json[1]["type"], "expense");
        assert!(activity[0].is_flagged());
        assert!(!activity[1].is_flagged());
    }

    #[test]
    fn test_aggregates_are_idempotent() {
        let store = store_with(
            vec![
                expense("user-a", 10.0, Category::Food, date(2026, 5, 1)),
                expense("user-a", 30.0, Category::Bills, date(2026, 6, 3)),
            ],
            vec![transaction("user-a", 500.0, true, date(2026, 6, 4))],
        );
        assert_eq!(store.expense_totals("user-a"), store.expense_totals("user-a"));
        assert_eq!(store.fraud_summary("user-a"), store.fraud_summary("user-a"));
        assert_eq!(store.monthly_trends("user-a"), store.monthly_trends("user-a"));
        assert_eq!(
            store.category_breakdown("user-a"),
            store.category_breakdown("user-a")
        );
    }
}

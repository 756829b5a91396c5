//! Dashboard widget rendering and UI state
//!
//! The renderer receives report data plus an explicit [`UiState`]: the
//! active section and one current-page counter per listing. There are no
//! ambient globals; pagination buttons carry their page number in the
//! request they issue, and section navigation swaps partials into the
//! content container.

use std::collections::HashMap;

use spendguard_core::{
    ActivityEntry, CategoryTotal, Expense, ExpenseTotals, FraudSummary, MonthBucket, Pagination,
    Transaction,
};

/// Most entries the recent-activity widget will show
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Trend chart drawing height in pixels
const TREND_BAR_MAX_PX: f64 = 180.0;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_abbr(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_ABBR[(month - 1) as usize],
        _ => "?",
    }
}

// ==================== UI State ====================

/// Dashboard sections
///
/// The section navigation state machine: transitions happen on user
/// selection, entering a section triggers exactly one fetch + render of
/// its partial, and no section is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Transactions,
    Expenses,
    FraudAlerts,
}

impl Section {
    /// All sections, in sidebar order
    pub const ALL: [Section; 4] = [
        Section::Overview,
        Section::Transactions,
        Section::Expenses,
        Section::FraudAlerts,
    ];

    /// The initial section shown when the dashboard loads
    pub fn initial() -> Self {
        Section::Overview
    }

    /// Sidebar label
    pub fn title(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Transactions => "Transactions",
            Section::Expenses => "Expenses",
            Section::FraudAlerts => "Fraud Alerts",
        }
    }
}

impl std::str::FromStr for Section {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Section::Overview),
            "transactions" => Ok(Section::Transactions),
            "expenses" => Ok(Section::Expenses),
            "fraud-alerts" => Ok(Section::FraudAlerts),
            _ => Err(format!("Invalid section: {}", s)),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Overview => write!(f, "overview"),
            Section::Transactions => write!(f, "transactions"),
            Section::Expenses => write!(f, "expenses"),
            Section::FraudAlerts => write!(f, "fraud-alerts"),
        }
    }
}

/// Transient dashboard UI state passed to the render functions
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// Active section
    pub section: Section,
    /// Current page of the transactions listing
    pub transactions_page: usize,
    /// Current page of the expenses listing (independent of the above)
    pub expenses_page: usize,
}

impl UiState {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            transactions_page: 1,
            expenses_page: 1,
        }
    }

    /// Build from query parameters (`txPage`, `expPage`), defaulting each
    /// listing to its first page
    pub fn from_query(section: Section, params: &HashMap<String, String>) -> Self {
        let page = |key: &str| {
            params
                .get(key)
                .and_then(|s| s.parse().ok())
                .unwrap_or(1)
                .max(1)
        };
        Self {
            section,
            transactions_page: page("txPage"),
            expenses_page: page("expPage"),
        }
    }
}

// ==================== Shell ====================

/// Navigation sidebar; selecting an entry fetches that section's partial
pub fn nav_sidebar(active: Section) -> String {
    let mut nav = String::from(
        "<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Spendguard</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>",
    );

    for section in Section::ALL {
        let active_class = if section == active {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        let icon = match section {
            Section::Overview => "📊",
            Section::Transactions => "💳",
            Section::Expenses => "🧾",
            Section::FraudAlerts => "🚨",
        };
        nav.push_str(&format!(
            r#"<li><a href='#' hx-get='/dashboard/section/{}' hx-target='#dashboard-content' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            section,
            active_class,
            icon,
            section.title()
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Full dashboard layout: sidebar plus the swappable content container
pub fn render_dashboard_shell(ui: &UiState, section_content: &str) -> String {
    format!(
        r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'><div id='dashboard-content'>{}</div></main>
    </div>
</div>"#,
        nav_sidebar(ui.section),
        section_content
    )
}

// ==================== Overview Widgets ====================

/// Stat cards: expense total/average and fraud count/rate
pub fn render_stat_cards(totals: &ExpenseTotals, fraud: &FraudSummary) -> String {
    format!(
        r#"<div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Total Expenses</p><p class='text-2xl font-bold text-blue-700'>₹{:.2}</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Average Expense</p><p class='text-2xl font-bold text-green-700'>₹{:.2}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Fraud Transactions</p><p class='text-2xl font-bold text-red-700'>{}</p><small class='text-red-600'>{}% fraud rate</small></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Total Transactions</p><p class='text-2xl font-bold text-yellow-700'>{}</p></div>
        </div>"#,
        totals.total,
        totals.average,
        fraud.fraud_transactions,
        fraud.fraud_rate,
        fraud.total_transactions
    )
}

/// Category chart: one proportional bar per category.
/// Bar width = total / max(max_total, 1) so an all-zero breakdown renders
/// empty bars instead of dividing by zero.
pub fn render_category_chart(breakdown: &[CategoryTotal]) -> String {
    let max_total = breakdown.iter().map(|c| c.total).fold(1.0_f64, f64::max);

    let mut html = String::from("<div style='width: 100%;'>");
    for entry in breakdown {
        let percentage = entry.total / max_total * 100.0;
        html.push_str(&format!(
            r#"<div class='mb-3'>
                <div class='flex justify-between text-sm'><span>{}</span><span>₹{:.2}</span></div>
                <div class='bg-gray-200 h-5 rounded-full'><div class='bg-indigo-500 h-5 rounded-full' style='width: {:.1}%'></div></div>
            </div>"#,
            entry.category, entry.total, percentage
        ));
    }
    html.push_str("</div>");
    html
}

/// Trend chart: one bar per month, oldest to newest.
/// The engine returns buckets newest-first, so the renderer reverses them
/// before display. Bar heights share the same ≥1 divisor guard as the
/// category chart.
pub fn render_trend_chart(trends: &[MonthBucket]) -> String {
    if trends.is_empty() {
        return "<p class='text-gray-500'>No data available</p>".to_string();
    }

    let max_total = trends.iter().map(|t| t.total).fold(1.0_f64, f64::max);

    let mut html = String::from(
        "<div style='display: flex; align-items: flex-end; height: 200px; gap: 20px;'>",
    );
    for bucket in trends.iter().rev() {
        let height = bucket.total / max_total * TREND_BAR_MAX_PX;
        html.push_str(&format!(
            r#"<div style='flex: 1; text-align: center;'>
                <div class='bg-indigo-500 rounded-t' style='height: {:.0}px;'></div>
                <div class='mt-1 text-sm'>{} {}</div>
                <div class='text-xs text-gray-500'>₹{:.0}</div>
            </div>"#,
            height,
            month_abbr(bucket.month),
            bucket.year,
            bucket.total
        ));
    }
    html.push_str("</div>");
    html
}

/// Recent activity: at most five merged entries, flagged transactions
/// visually distinguished
pub fn render_recent_activity(activity: &[ActivityEntry]) -> String {
    if activity.is_empty() {
        return "<p class='text-gray-500'>No recent activity</p>".to_string();
    }

    let mut html = String::from("<div class='space-y-2'>");
    for entry in activity.iter().take(RECENT_ACTIVITY_LIMIT) {
        match entry {
            ActivityEntry::Transaction { data, date } => {
                let (badge, row_class) = if data.fraud_result.is_fraud {
                    (
                        "<span class='text-red-500 font-medium'>⚠️ Fraud Detected</span>",
                        "border-l-4 border-red-400 bg-red-50",
                    )
                } else {
                    ("<span class='text-green-600'>✓ Safe</span>", "border-l-4 border-gray-200")
                };
                html.push_str(&format!(
                    r#"<div class='flex items-center justify-between p-3 rounded {}'>
                        <div><strong>Transaction</strong><div class='text-sm'>₹{:.2} at {}</div></div>
                        <div>{}</div>
                        <div class='text-sm text-gray-500'>{}</div>
                    </div>"#,
                    row_class,
                    data.amount,
                    data.location,
                    badge,
                    date.format("%Y-%m-%d")
                ));
            }
            ActivityEntry::Expense { data, date } => {
                html.push_str(&format!(
                    r#"<div class='flex items-center justify-between p-3 rounded border-l-4 border-gray-200'>
                        <div><strong>Expense</strong><div class='text-sm'>₹{:.2} · {}</div></div>
                        <div class='text-sm text-gray-500'>{}</div>
                        <div class='text-sm text-gray-500'>{}</div>
                    </div>"#,
                    data.amount,
                    data.category,
                    data.description,
                    date.format("%Y-%m-%d")
                ));
            }
        }
    }
    html.push_str("</div>");
    html
}

/// The overview section: stat cards, both charts, recent activity
pub fn render_overview(
    totals: &ExpenseTotals,
    fraud: &FraudSummary,
    breakdown: &[CategoryTotal],
    trends: &[MonthBucket],
    activity: &[ActivityEntry],
) -> String {
    format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Overview</h2></div>
        {}
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6 mb-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Spending by Category</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Monthly Trend</h3>{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Recent Activity</h3>{}</div>"#,
        render_stat_cards(totals, fraud),
        render_category_chart(breakdown),
        render_trend_chart(trends),
        render_recent_activity(activity)
    )
}

// ==================== Listing Sections ====================

/// Transaction list rows
pub fn render_transactions_list(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "<p class='text-center py-8 text-gray-500'>No transactions found</p>".to_string();
    }

    let mut html = String::from("<div class='space-y-2'>");
    for tx in transactions {
        let (badge, row_class) = if tx.fraud_result.is_fraud {
            (
                "<span class='text-red-500 font-bold'>🚨 FRAUD ALERT</span>",
                "border-l-4 border-red-400 bg-red-50",
            )
        } else {
            ("<span class='text-green-600'>✓ Legitimate</span>", "border-l-4 border-gray-200")
        };
        let confidence = tx.fraud_result.confidence * 100.0;
        html.push_str(&format!(
            r#"<div class='flex items-center justify-between p-3 rounded {}'>
                <div class='flex-1'><strong>₹{:.2}</strong><div class='text-sm'>📍 {}</div></div>
                <div class='flex-1 text-sm'><div>{}</div>{}</div>
                <div class='text-right text-sm text-gray-500'>{:.1}%</div>
            </div>"#,
            row_class,
            tx.amount,
            tx.location,
            tx.time.format("%Y-%m-%d %H:%M"),
            badge,
            confidence
        ));
    }
    html.push_str("</div>");
    html
}

/// The transactions section: list plus its own pagination control
pub fn render_transactions_section(
    transactions: &[Transaction],
    pagination: &Pagination,
) -> String {
    format!(
        r#"<div id='transactions-content'>
            <div class='mb-4'><h2 class='text-2xl font-bold'>Transactions</h2></div>
            {}
            {}
        </div>"#,
        render_transactions_list(transactions),
        render_pagination(Section::Transactions, pagination)
    )
}

/// Expense list rows
pub fn render_expenses_list(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "<p class='text-center py-8 text-gray-500'>No expenses found</p>".to_string();
    }

    let mut html = String::from("<div class='space-y-2'>");
    for expense in expenses {
        let description = if expense.description.is_empty() {
            "No description"
        } else {
            expense.description.as_str()
        };
        html.push_str(&format!(
            r#"<div class='flex items-center justify-between p-3 rounded border-l-4 border-gray-200'>
                <div class='flex-1'><strong>₹{:.2}</strong><div class='text-sm'>{}</div></div>
                <div class='flex-1 text-sm text-gray-600'>{}</div>
                <div class='text-right text-sm text-gray-500'>{}</div>
            </div>"#,
            expense.amount,
            expense.category,
            description,
            expense.date.format("%Y-%m-%d")
        ));
    }
    html.push_str("</div>");
    html
}

/// The expenses section: list plus its own pagination control
pub fn render_expenses_section(expenses: &[Expense], pagination: &Pagination) -> String {
    format!(
        r#"<div id='expenses-content'>
            <div class='mb-4'><h2 class='text-2xl font-bold'>Expenses</h2></div>
            {}
            {}
        </div>"#,
        render_expenses_list(expenses),
        render_pagination(Section::Expenses, pagination)
    )
}

/// The fraud-alerts section: every flagged transaction with its verdict
pub fn render_fraud_alerts(transactions: &[Transaction]) -> String {
    let mut html =
        String::from("<div class='mb-4'><h2 class='text-2xl font-bold'>Fraud Alerts</h2></div>");

    if transactions.is_empty() {
        html.push_str("<p class='text-center py-8 text-gray-500'>No fraud alerts found</p>");
        return html;
    }

    html.push_str("<div class='space-y-2'>");
    for tx in transactions {
        let confidence = tx.fraud_result.confidence * 100.0;
        let reasons = if tx.fraud_result.reasons.is_empty() {
            String::new()
        } else {
            let items: Vec<String> = tx
                .fraud_result
                .reasons
                .iter()
                .map(|r| format!("<li>{}</li>", r))
                .collect();
            format!(
                "<ul class='mt-2 ml-5 list-disc text-sm text-gray-600'>{}</ul>",
                items.join("")
            )
        };
        html.push_str(&format!(
            r#"<div class='p-3 rounded border-l-4 border-red-400 bg-red-50'>
                <div class='flex items-center justify-between'>
                    <div class='flex-1'><strong>⚠️ Fraudulent Transaction</strong><div class='text-sm'>₹{:.2} at {}</div></div>
                    <div class='flex-1 text-sm'><div>Time: {}</div><div>Detected: {}</div></div>
                    <div class='text-right text-sm'>Confidence: {:.1}%</div>
                </div>
                {}
            </div>"#,
            tx.amount,
            tx.location,
            tx.time.format("%Y-%m-%d %H:%M"),
            tx.fraud_result.checked_at.format("%Y-%m-%d %H:%M"),
            confidence,
            reasons
        ));
    }
    html.push_str("</div>");
    html
}

// ==================== Pagination ====================

/// Numbered page buttons for a listing section.
///
/// One button per page from 1 to `pages`; each re-fetches that page for
/// its own listing only, so the two listings keep independent counters.
pub fn render_pagination(section: Section, pagination: &Pagination) -> String {
    let (endpoint, target) = match section {
        Section::Transactions => ("/dashboard/transactions/list", "#transactions-content"),
        Section::Expenses => ("/dashboard/expenses/list", "#expenses-content"),
        // Only the listing sections paginate
        _ => return String::new(),
    };

    let mut html = String::from("<div class='mt-4 flex items-center gap-2'>");
    for page in 1..=pagination.pages {
        let active_class = if page == pagination.page {
            "bg-indigo-600 text-white"
        } else {
            "bg-white hover:bg-gray-100"
        };
        html.push_str(&format!(
            r#"<button hx-get='{}?page={}' hx-target='{}' class='px-3 py-1 border rounded {}'>{}</button>"#,
            endpoint, page, target, active_class, page
        ));
    }
    html.push_str("</div>");
    html
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use spendguard_core::{Category, FraudVerdict};

    fn bucket(year: i32, month: u32, total: f64) -> MonthBucket {
        MonthBucket {
            year,
            month,
            total,
            count: 1,
        }
    }

    fn transaction(amount: f64, flagged: bool) -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            user: "user-a".to_string(),
            amount,
            location: "Delhi".to_string(),
            description: String::new(),
            time: Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap(),
            fraud_result: FraudVerdict::new(flagged, 0.8, serde_json::json!({}), vec![]),
            created_at: Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_section_round_trip_and_rejection() {
        for section in Section::ALL {
            let parsed: Section = section.to_string().parse().unwrap();
            assert_eq!(parsed, section);
        }
        assert!("settings".parse::<Section>().is_err());
        assert_eq!(Section::initial(), Section::Overview);
    }

    #[test]
    fn test_ui_state_from_query() {
        let mut params = HashMap::new();
        params.insert("txPage".to_string(), "3".to_string());
        let ui = UiState::from_query(Section::Transactions, &params);
        assert_eq!(ui.transactions_page, 3);
        assert_eq!(ui.expenses_page, 1);

        params.insert("txPage".to_string(), "0".to_string());
        let ui = UiState::from_query(Section::Transactions, &params);
        assert_eq!(ui.transactions_page, 1);
    }

    #[test]
    fn test_category_chart_zero_totals_guard() {
        let breakdown = vec![
            CategoryTotal {
                category: Category::Food,
                total: 0.0,
                count: 2,
            },
            CategoryTotal {
                category: Category::Bills,
                total: 0.0,
                count: 1,
            },
        ];
        let html = render_category_chart(&breakdown);
        assert!(html.contains("width: 0.0%"));
        assert!(!html.contains("NaN"));
    }

    #[test]
    fn test_category_chart_widths_are_proportional() {
        let breakdown = vec![
            CategoryTotal {
                category: Category::Food,
                total: 100.0,
                count: 1,
            },
            CategoryTotal {
                category: Category::Transport,
                total: 50.0,
                count: 1,
            },
        ];
        let html = render_category_chart(&breakdown);
        assert!(html.contains("width: 100.0%"));
        assert!(html.contains("width: 50.0%"));
    }

    #[test]
    fn test_trend_chart_reverses_to_oldest_first() {
        // Engine order: newest first
        let trends = vec![bucket(2026, 8, 10.0), bucket(2026, 7, 20.0), bucket(2026, 6, 5.0)];
        let html = render_trend_chart(&trends);

        let jun = html.find("Jun 2026").unwrap();
        let jul = html.find("Jul 2026").unwrap();
        let aug = html.find("Aug 2026").unwrap();
        assert!(jun < jul && jul < aug);
    }

    #[test]
    fn test_trend_chart_heights_guard_and_scale() {
        let trends = vec![bucket(2026, 8, 0.0)];
        let html = render_trend_chart(&trends);
        assert!(html.contains("height: 0px"));

        let trends = vec![bucket(2026, 8, 90.0), bucket(2026, 7, 45.0)];
        let html = render_trend_chart(&trends);
        assert!(html.contains("height: 180px"));
        assert!(html.contains("height: 90px"));
    }

    #[test]
    fn test_trend_chart_empty() {
        assert!(render_trend_chart(&[]).contains("No data available"));
    }

    #[test]
    fn test_recent_activity_caps_at_five_and_flags_fraud() {
        let mut entries = Vec::new();
        for i in 0..8 {
            let tx = transaction(10.0 + i as f64, i == 0);
            entries.push(ActivityEntry::Transaction {
                date: tx.created_at,
                data: tx,
            });
        }
        let html = render_recent_activity(&entries);
        assert_eq!(html.matches("<strong>Transaction</strong>").count(), 5);
        assert_eq!(html.matches("Fraud Detected").count(), 1);
    }

    #[test]
    fn test_pagination_renders_numbered_buttons() {
        let html = render_pagination(Section::Transactions, &Pagination::new(2, 10, 23));
        assert_eq!(html.matches("<button").count(), 3);
        assert!(html.contains("/dashboard/transactions/list?page=1"));
        assert!(html.contains("/dashboard/transactions/list?page=3"));
        assert!(html.contains("#transactions-content"));

        // The expenses listing targets its own container
        let html = render_pagination(Section::Expenses, &Pagination::new(1, 10, 5));
        assert!(html.contains("#expenses-content"));
        assert!(html.contains("/dashboard/expenses/list?page=1"));
    }

    #[test]
    fn test_pagination_empty_listing_renders_no_buttons() {
        let html = render_pagination(Section::Transactions, &Pagination::new(1, 10, 0));
        assert_eq!(html.matches("<button").count(), 0);
    }

    #[test]
    fn test_pagination_only_for_listing_sections() {
        assert!(render_pagination(Section::Overview, &Pagination::new(1, 10, 50)).is_empty());
    }

    #[test]
    fn test_sidebar_marks_active_section() {
        let html = nav_sidebar(Section::Expenses);
        assert!(html.contains("/dashboard/section/overview"));
        assert!(html.contains("/dashboard/section/fraud-alerts"));
        // Exactly one active entry
        assert_eq!(html.matches("bg-indigo-50").count(), 1);
    }
}

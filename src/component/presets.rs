//! Fixed sample catalogs for the demo emitters.
//!
//! Three table schemas and four chart scenarios. Values are sample data;
//! what matters is that each catalog stays internally consistent with its
//! declared columns and axes.

use serde_json::{Value, json};

/// The three table schemas, in canonical fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Sales,
    Users,
    Products,
}

impl TableKind {
    /// Canonical order used to fill "give me N tables" requests.
    pub const ALL: [TableKind; 3] = [TableKind::Sales, TableKind::Users, TableKind::Products];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Sales => "sales",
            TableKind::Users => "users",
            TableKind::Products => "products",
        }
    }

    pub fn columns(&self) -> Vec<Value> {
        match self {
            TableKind::Sales => vec![json!("Name"), json!("Sales"), json!("Region")],
            TableKind::Users => vec![
                json!("User"),
                json!("Email"),
                json!("Status"),
                json!("Role"),
            ],
            TableKind::Products => vec![
                json!("Product"),
                json!("Price"),
                json!("Stock"),
                json!("Category"),
            ],
        }
    }

    /// Sample rows matching `columns()`, mixed cell types.
    pub fn sample_rows(&self) -> Vec<Value> {
        match self {
            TableKind::Sales => vec![
                json!(["Alice Johnson", 12500, "North America"]),
                json!(["Bob Smith", 23400, "Europe"]),
                json!(["Carlos Rodriguez", 34500, "Latin America"]),
                json!(["Diana Chen", 18900, "Asia Pacific"]),
                json!(["Ethan Brown", 29200, "North America"]),
            ],
            TableKind::Users => vec![
                json!(["alice_j", "alice@example.com", "Active", "Admin"]),
                json!(["bob_smith", "bob@example.com", "Active", "User"]),
                json!(["carlos_r", "carlos@example.com", "Active", "Manager"]),
                json!(["diana_c", "diana@example.com", "Inactive", "User"]),
                json!(["ethan_b", "ethan@example.com", "Active", "User"]),
            ],
            TableKind::Products => vec![
                json!(["Laptop Pro", 1299.99, 45, "Electronics"]),
                json!(["Desk Chair", 249.99, 120, "Furniture"]),
                json!(["Coffee Maker", 89.99, 78, "Appliances"]),
                json!(["Monitor 27\"", 399.99, 32, "Electronics"]),
                json!(["Standing Desk", 549.99, 15, "Furniture"]),
            ],
        }
    }
}

/// The four chart scenarios, in canonical fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPreset {
    SalesLine,
    RevenueBar,
    GrowthLine,
    PerformanceBar,
}

impl ChartPreset {
    /// Canonical order used to fill "give me N charts" requests.
    pub const ALL: [ChartPreset; 4] = [
        ChartPreset::SalesLine,
        ChartPreset::RevenueBar,
        ChartPreset::GrowthLine,
        ChartPreset::PerformanceBar,
    ];

    pub fn chart_type(&self) -> &'static str {
        match self {
            ChartPreset::SalesLine | ChartPreset::GrowthLine => "line",
            ChartPreset::RevenueBar | ChartPreset::PerformanceBar => "bar",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartPreset::SalesLine => "Sales Over Time",
            ChartPreset::RevenueBar => "Revenue by Region",
            ChartPreset::GrowthLine => "Weekly Growth",
            ChartPreset::PerformanceBar => "Performance Metrics",
        }
    }

    pub fn x_axis(&self) -> Vec<Value> {
        match self {
            ChartPreset::SalesLine => vec![
                json!("Jan"),
                json!("Feb"),
                json!("Mar"),
                json!("Apr"),
                json!("May"),
            ],
            ChartPreset::RevenueBar => vec![
                json!("North America"),
                json!("Europe"),
                json!("Asia Pacific"),
                json!("Latin America"),
                json!("Africa"),
            ],
            ChartPreset::GrowthLine => vec![
                json!("Week 1"),
                json!("Week 2"),
                json!("Week 3"),
                json!("Week 4"),
                json!("Week 5"),
            ],
            ChartPreset::PerformanceBar => vec![
                json!("Latency"),
                json!("Throughput"),
                json!("Uptime"),
                json!("Error Rate"),
                json!("Saturation"),
            ],
        }
    }

    pub fn series_label(&self) -> &'static str {
        match self {
            ChartPreset::SalesLine => "Sales",
            ChartPreset::RevenueBar => "Revenue",
            ChartPreset::GrowthLine => "Growth %",
            ChartPreset::PerformanceBar => "Score",
        }
    }

    /// One value per x-axis label.
    pub fn values(&self) -> Vec<Value> {
        match self {
            ChartPreset::SalesLine => vec![
                json!(1000),
                json!(1200),
                json!(1500),
                json!(1400),
                json!(1800),
            ],
            ChartPreset::RevenueBar => vec![
                json!(45000),
                json!(38000),
                json!(29000),
                json!(17500),
                json!(9800),
            ],
            ChartPreset::GrowthLine => vec![
                json!(2.1),
                json!(3.4),
                json!(2.8),
                json!(4.2),
                json!(5.0),
            ],
            ChartPreset::PerformanceBar => {
                vec![json!(87), json!(92), json!(99), json!(74), json!(81)]
            }
        }
    }
}

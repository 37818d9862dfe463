use crate::models::{CurrentUser, DashboardOverview, RecentOrder, StatCard, TopProduct, Trend};

fn stat(title: &str, value: &str, change: &str, trend: Trend) -> StatCard {
    StatCard {
        title: title.to_string(),
        value: value.to_string(),
        change: change.to_string(),
        trend,
    }
}

fn order(id: &str, customer: &str, amount: &str, status: &str) -> RecentOrder {
    RecentOrder {
        id: id.to_string(),
        customer: customer.to_string(),
        amount: amount.to_string(),
        status: status.to_string(),
    }
}

fn product(name: &str, sales: u32, revenue: &str) -> TopProduct {
    TopProduct {
        name: name.to_string(),
        sales,
        revenue: revenue.to_string(),
    }
}

/// overview
///
/// Sample analytics for the dashboard. Only `user` varies between requests.
pub fn overview(user: CurrentUser) -> DashboardOverview {
    DashboardOverview {
        user,
        stats: vec![
            stat("Total Revenue", "$45,231.89", "+20.1%", Trend::Up),
            stat("Active Users", "2,350", "+15.3%", Trend::Up),
            stat("Total Orders", "1,234", "+12.5%", Trend::Up),
            stat("Conversion Rate", "3.24%", "-2.4%", Trend::Down),
        ],
        recent_orders: vec![
            order("#3210", "John Doe", "$250.00", "Completed"),
            order("#3209", "Jane Smith", "$150.00", "Processing"),
            order("#3208", "Bob Johnson", "$350.00", "Completed"),
            order("#3207", "Alice Brown", "$180.00", "Pending"),
            order("#3206", "Charlie Wilson", "$420.00", "Completed"),
        ],
        top_products: vec![
            product("Premium Widget", 245, "$12,250"),
            product("Deluxe Gadget", 189, "$9,450"),
            product("Standard Tool", 156, "$7,800"),
            product("Basic Kit", 134, "$6,700"),
        ],
    }
}

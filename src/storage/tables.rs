use redb::TableDefinition;

pub const CATEGORIES: TableDefinition<&str, &[u8]> = TableDefinition::new("categories");
pub const CATEGORY_SLUGS: TableDefinition<&str, &str> = TableDefinition::new("category_slugs");
pub const CONTENT: TableDefinition<&str, &[u8]> = TableDefinition::new("content");
pub const CATEGORY_CONTENT: TableDefinition<&str, &[u8]> =
    TableDefinition::new("category_content");
pub const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");
pub const ACCOUNT_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("account_emails");
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");
pub const USER_PROFILES: TableDefinition<&str, &[u8]> = TableDefinition::new("user_profiles");
pub const SUBSCRIPTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("subscriptions");
pub const USER_SUBSCRIPTIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("user_subscriptions");
pub const USER_PURCHASES: TableDefinition<&str, &[u8]> = TableDefinition::new("user_purchases");
pub const USER_PURCHASE_INDEX: TableDefinition<&str, &[u8]> =
    TableDefinition::new("user_purchase_index");

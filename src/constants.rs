// Activity log action names.
pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const USER_LOGGED_IN: &str = "USER_LOGGED_IN";
pub const PROFILE_UPDATED: &str = "PROFILE_UPDATED";

pub const SUBSCRIPTION_UPGRADED: &str = "SUBSCRIPTION_UPGRADED";
pub const SUBSCRIPTION_CANCELED: &str = "SUBSCRIPTION_CANCELED";

pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const GROUP_UPDATED: &str = "GROUP_UPDATED";
pub const GROUP_DELETED: &str = "GROUP_DELETED";
pub const MEMBER_INVITED: &str = "MEMBER_INVITED";
pub const MEMBER_REMOVED: &str = "MEMBER_REMOVED";
pub const MEMBER_LEFT: &str = "MEMBER_LEFT";
pub const MEMBER_PERMISSIONS_UPDATED: &str = "MEMBER_PERMISSIONS_UPDATED";
pub const INVITATION_ACCEPTED: &str = "INVITATION_ACCEPTED";
pub const INVITATION_REJECTED: &str = "INVITATION_REJECTED";

pub const MEMBER_PROFILE_UPDATED: &str = "MEMBER_PROFILE_UPDATED";
pub const MEMBER_FIREWALL_RULE_UPDATED: &str = "MEMBER_FIREWALL_RULE_UPDATED";
pub const MEMBER_VPN_CONFIG_UPDATED: &str = "MEMBER_VPN_CONFIG_UPDATED";

pub const VPN_CONFIG_CREATED: &str = "VPN_CONFIG_CREATED";
pub const VPN_CONFIG_UPDATED: &str = "VPN_CONFIG_UPDATED";
pub const VPN_CONFIG_DELETED: &str = "VPN_CONFIG_DELETED";
pub const VPN_CONFIG_TOGGLED: &str = "VPN_CONFIG_TOGGLED";
pub const VPN_CONFIG_CLONED: &str = "VPN_CONFIG_CLONED";

pub const SECURITY_PROFILE_CREATED: &str = "SECURITY_PROFILE_CREATED";
pub const SECURITY_PROFILE_UPDATED: &str = "SECURITY_PROFILE_UPDATED";
pub const SECURITY_PROFILE_DELETED: &str = "SECURITY_PROFILE_DELETED";
pub const FIREWALL_RULE_CREATED: &str = "FIREWALL_RULE_CREATED";
pub const FIREWALL_RULE_UPDATED: &str = "FIREWALL_RULE_UPDATED";
pub const FIREWALL_RULE_DELETED: &str = "FIREWALL_RULE_DELETED";

// Domain limits.
pub const INVITATION_TTL_DAYS: i64 = 7;
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;
pub const DEFAULT_MAX_MEMBERS: usize = 10;
pub const MAX_GROUP_MEMBERS: usize = 500;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 100;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_PROFILE_NAME_LENGTH: usize = 3;
pub const MAX_PROFILE_NAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_VPN_CONFIG_BYTES: usize = 1024 * 1024;

// Login monitoring.
pub const SUSPICIOUS_LOGIN_FAILURES: usize = 3;
pub const SUSPICIOUS_LOGIN_WINDOW_MINUTES: i64 = 15;
pub const DEFAULT_SECURITY_EVENT_DAYS: i64 = 7;
pub const MAX_SECURITY_EVENT_DAYS: i64 = 90;

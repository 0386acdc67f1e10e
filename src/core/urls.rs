#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    pub const HEALTH: &'static str = "/health";

    // Session - credentials for the project under review
    pub const SESSION: &'static str = "/api/session";

    // Compliance - JSON APIs
    pub const COMPLIANCE_RUN: &'static str = "/api/compliance/run";
    pub const COMPLIANCE_AUDIT: &'static str = "/api/compliance/audit";

    // Remediation assistant - JSON APIs
    pub const REMEDIATION_OPEN: &'static str = "/api/remediation/open";
    pub const REMEDIATION_CHAT: &'static str = "/api/remediation/chat";

    // HTML pages
    pub const DASHBOARD: &'static str = "/";
}

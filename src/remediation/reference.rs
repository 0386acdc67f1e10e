use crate::compliance::types::CheckCategory;

/// Console walkthroughs handed to the assistant as ground truth. These are
/// menu paths only; the assistant is told not to answer with SQL.
pub fn reference_for(category: CheckCategory) -> &'static str {
    match category {
        CheckCategory::Mfa => MFA_REFERENCE,
        CheckCategory::Rls => RLS_REFERENCE,
        CheckCategory::Pitr => PITR_REFERENCE,
    }
}

const MFA_REFERENCE: &str = "\
Multi-factor authentication is enrolled by each user, not by an administrator.
1. Confirm MFA is allowed for the project: open the dashboard, choose Authentication in the left sidebar, then Sign In / Providers, and make sure Multi-Factor Authentication (TOTP) is switched on.
2. Ask the affected user to sign in to your application and open their account or security settings.
3. The user chooses Set up authenticator app, scans the QR code with an authenticator app and enters the six-digit code to verify.
4. Back in the dashboard, open Authentication > Users, select the user and check that a verified factor is listed.
Unverified factors do not count; an enrollment that was started but never confirmed must be completed or removed by the user.";

const RLS_REFERENCE: &str = "\
Row level security is configured per table from the Table Editor.
1. Open the dashboard and choose Table Editor in the left sidebar.
2. Select the table from the list of tables in the schema.
3. If the header shows an RLS disabled badge, click it (or open the table's ... menu and choose Enable RLS), then confirm.
4. Open Authentication > Policies, find the table and click Create policy.
5. Start from a template such as Enable read access for authenticated users only, adjust the target roles and the USING expression in the form, and click Save policy.
6. Add a policy for each operation (SELECT, INSERT, UPDATE, DELETE) that clients need. A table with RLS enabled and no policies denies every request from client keys.";

const PITR_REFERENCE: &str = "\
Point-in-time recovery is a project add-on managed from the billing and database settings.
1. Open the dashboard, choose Project Settings (the gear icon), then Add-ons.
2. In the Point in time recovery section, click Change point in time recovery.
3. Pick a retention period and confirm. The project must be on a paid plan and use a compute size that supports PITR; upgrade the compute add-on first if the option is greyed out.
4. Only organization owners and administrators can change add-ons; ask one of them if the buttons are disabled.
5. Once enabled, Database > Backups shows a Point in time tab with the available recovery window.";

diesel::table! {
    compliance_audit_log (id) {
        id -> Int8,
        category -> Varchar,
        passed -> Bool,
        resource_label -> Nullable<Text>,
        observed_at -> Timestamptz,
        remediation_text -> Nullable<Text>,
        mechanically_fixable -> Nullable<Bool>,
    }
}

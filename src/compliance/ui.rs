use axum::{response::Html, routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub async fn handle_compliance_dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

pub fn configure_compliance_ui_routes() -> Router<Arc<AppState>> {
    Router::new().route(ApiUrls::DASHBOARD, get(handle_compliance_dashboard_page))
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Compliance Dashboard</title>
    <style>
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; padding: 24px; }
        .header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 24px; }
        .header h1 { font-size: 28px; color: #1a1a1a; }
        .btn { padding: 10px 20px; border: none; border-radius: 8px; cursor: pointer; font-size: 14px; font-weight: 500; }
        .btn-primary { background: #0066cc; color: white; }
        .btn-primary:hover { background: #0052a3; }
        .btn-primary:disabled { background: #90b4d8; cursor: wait; }
        .btn-small { padding: 4px 10px; font-size: 12px; background: #eef3fa; color: #0066cc; }
        .stats-row { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; margin-bottom: 24px; }
        .stat-card { background: white; border-radius: 12px; padding: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
        .stat-value { font-size: 32px; font-weight: 600; }
        .stat-value.green { color: #2e7d32; }
        .stat-value.red { color: #c62828; }
        .stat-label { font-size: 13px; color: #666; margin-top: 4px; }
        .section { background: white; border-radius: 12px; padding: 24px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); margin-bottom: 24px; }
        .section-title { font-size: 18px; font-weight: 600; margin-bottom: 16px; }
        .session-form { display: grid; grid-template-columns: 2fr 2fr auto auto; gap: 12px; align-items: center; }
        .session-form input { padding: 10px; border: 1px solid #ddd; border-radius: 8px; font-size: 14px; }
        .session-status { font-size: 13px; color: #666; margin-top: 8px; }
        .finding { display: flex; align-items: center; justify-content: space-between; padding: 10px 0; border-bottom: 1px solid #f0f0f0; }
        .finding:last-child { border-bottom: none; }
        .finding-meta { font-size: 12px; color: #666; }
        .badge { padding: 4px 12px; border-radius: 12px; font-size: 12px; font-weight: 600; margin-right: 8px; }
        .badge-pass { background: #e8f5e9; color: #2e7d32; }
        .badge-fail { background: #ffebee; color: #c62828; }
        .badge-unknown { background: #fff3e0; color: #ef6c00; }
        table { width: 100%; border-collapse: collapse; font-size: 13px; }
        th, td { text-align: left; padding: 8px; border-bottom: 1px solid #f0f0f0; vertical-align: top; }
        th { color: #666; font-weight: 500; }
        .error { background: #ffebee; color: #c62828; padding: 12px; border-radius: 8px; margin-bottom: 16px; display: none; }
        .empty-state { text-align: center; padding: 24px; color: #666; }
        .modal { position: fixed; inset: 0; background: rgba(0,0,0,0.4); display: none; align-items: center; justify-content: center; }
        .modal.open { display: flex; }
        .modal-card { background: white; border-radius: 12px; width: 640px; max-height: 80vh; display: flex; flex-direction: column; }
        .modal-header { display: flex; justify-content: space-between; align-items: center; padding: 16px 20px; border-bottom: 1px solid #eee; }
        .transcript { flex: 1; overflow-y: auto; padding: 16px 20px; }
        .msg { margin-bottom: 12px; white-space: pre-wrap; font-size: 14px; line-height: 1.4; }
        .msg-assistant { background: #f5f7fa; padding: 10px; border-radius: 8px; }
        .msg-user { text-align: right; color: #0052a3; }
        .msg-error { color: #c62828; }
        .composer { display: flex; gap: 8px; padding: 12px 20px; border-top: 1px solid #eee; }
        .composer input { flex: 1; padding: 10px; border: 1px solid #ddd; border-radius: 8px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Compliance Dashboard</h1>
            <button class="btn btn-primary" id="runBtn" onclick="runChecks()">Run Checks</button>
        </div>
        <div class="error" id="errorBox"></div>
        <div class="section">
            <h2 class="section-title">Project</h2>
            <div class="session-form">
                <input id="endpoint" placeholder="https://your-project.supabase.co">
                <input id="serviceKey" type="password" placeholder="Service role key">
                <button class="btn btn-primary" onclick="saveSession()">Connect</button>
                <button class="btn" onclick="clearSession()">Disconnect</button>
            </div>
            <div class="session-status" id="sessionStatus">Not connected</div>
        </div>
        <div class="stats-row">
            <div class="stat-card">
                <div class="stat-value" id="totalChecks">--</div>
                <div class="stat-label">Checks</div>
            </div>
            <div class="stat-card">
                <div class="stat-value green" id="passedChecks">--</div>
                <div class="stat-label">Passing</div>
            </div>
            <div class="stat-card">
                <div class="stat-value red" id="failedChecks">--</div>
                <div class="stat-label">Failing</div>
            </div>
        </div>
        <div class="section">
            <h2 class="section-title">MFA</h2>
            <div id="mfaList"><div class="empty-state">Run the checks to see results</div></div>
        </div>
        <div class="section">
            <h2 class="section-title">Row Level Security</h2>
            <div id="rlsList"><div class="empty-state">Run the checks to see results</div></div>
        </div>
        <div class="section">
            <h2 class="section-title">Point-in-Time Recovery</h2>
            <div id="pitrList"><div class="empty-state">Run the checks to see results</div></div>
        </div>
        <div class="section">
            <h2 class="section-title">Recent Audit Records</h2>
            <table>
                <thead><tr><th>#</th><th>Category</th><th>Resource</th><th>Result</th><th>Observed</th><th>Remediation</th></tr></thead>
                <tbody id="auditRows"><tr><td colspan="6" class="empty-state">No records yet</td></tr></tbody>
            </table>
        </div>
    </div>

    <div class="modal" id="chatModal">
        <div class="modal-card">
            <div class="modal-header">
                <strong id="chatTitle">Remediation</strong>
                <button class="btn btn-small" onclick="closeChat()">Close</button>
            </div>
            <div class="transcript" id="transcript"></div>
            <div class="composer">
                <input id="chatInput" placeholder="Ask how to fix this..." onkeydown="if (event.key === 'Enter') sendChat()">
                <button class="btn btn-primary" id="sendBtn" onclick="sendChat()">Send</button>
            </div>
        </div>
    </div>

    <script>
        let chat = null;
        let fixTargets = [];

        function escapeHtml(value) {
            const div = document.createElement('div');
            div.textContent = value == null ? '' : String(value);
            return div.innerHTML;
        }

        function showError(message) {
            const box = document.getElementById('errorBox');
            box.textContent = message || '';
            box.style.display = message ? 'block' : 'none';
        }

        async function readError(response) {
            try {
                const body = await response.json();
                return body.error || response.statusText;
            } catch (e) {
                return response.statusText;
            }
        }

        function badge(passed, inconclusive) {
            if (inconclusive) return '<span class="badge badge-unknown">UNKNOWN</span>';
            return passed
                ? '<span class="badge badge-pass">PASS</span>'
                : '<span class="badge badge-fail">FAIL</span>';
        }

        // Project-supplied labels stay in fixTargets, out of the markup.
        function fixButton(category, label) {
            const index = fixTargets.push({ category, label }) - 1;
            return `<button class="btn btn-small" data-fix-index="${index}">How to fix</button>`;
        }

        document.addEventListener('click', event => {
            const button = event.target.closest('[data-fix-index]');
            if (!button) return;
            const target = fixTargets[Number(button.dataset.fixIndex)];
            if (target) openChat(target.category, target.label);
        });

        async function loadSession() {
            const response = await fetch('/api/session');
            const status = await response.json();
            document.getElementById('sessionStatus').textContent = status.configured
                ? `Connected to ${status.endpoint}`
                : 'Not connected';
        }

        async function saveSession() {
            showError('');
            const response = await fetch('/api/session', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({
                    endpoint: document.getElementById('endpoint').value,
                    service_key: document.getElementById('serviceKey').value
                })
            });
            if (!response.ok) {
                showError(await readError(response));
            }
            document.getElementById('serviceKey').value = '';
            loadSession();
        }

        async function clearSession() {
            await fetch('/api/session', { method: 'DELETE' });
            loadSession();
        }

        async function runChecks() {
            showError('');
            const button = document.getElementById('runBtn');
            button.disabled = true;
            try {
                const response = await fetch('/api/compliance/run', { method: 'POST' });
                if (!response.ok) {
                    showError(await readError(response));
                    return;
                }
                renderReport(await response.json());
            } catch (e) {
                showError('Failed to run checks');
            } finally {
                button.disabled = false;
            }
        }

        function renderReport(report) {
            fixTargets = [];
            document.getElementById('totalChecks').textContent = report.summary.total;
            document.getElementById('passedChecks').textContent = report.summary.passed;
            document.getElementById('failedChecks').textContent = report.summary.failed;

            document.getElementById('mfaList').innerHTML = report.mfa.length
                ? report.mfa.map(f => {
                    const label = f.subject_label || f.subject_id;
                    return `<div class="finding"><div>${badge(f.enabled, f.inconclusive)}${escapeHtml(label)}</div>
                        ${f.enabled ? '' : fixButton('MFA', label)}</div>`;
                }).join('')
                : '<div class="empty-state">No users</div>';

            document.getElementById('rlsList').innerHTML = report.rls.length
                ? report.rls.map(f => `<div class="finding">
                        <div>${badge(f.passed, f.inconclusive)}${escapeHtml(f.table)}
                        <div class="finding-meta">RLS ${f.enabled ? 'enabled' : 'disabled'}, ${f.policy_count} polic${f.policy_count === 1 ? 'y' : 'ies'}</div></div>
                        ${f.passed ? '' : fixButton('RLS', f.table)}</div>`).join('')
                : '<div class="empty-state">No tables</div>';

            document.getElementById('pitrList').innerHTML = `<div class="finding">
                <div>${badge(report.pitr.enabled, report.pitr.inconclusive)}Project backups</div>
                ${report.pitr.enabled ? '' : fixButton('PITR', null)}</div>`;

            renderAudit(report.recent_audit);
        }

        function renderAudit(records) {
            document.getElementById('auditRows').innerHTML = records.length
                ? records.map(r => `<tr>
                    <td>${r.id}</td>
                    <td>${r.category}</td>
                    <td>${escapeHtml(r.resource_label || '-')}</td>
                    <td>${badge(r.passed, false)}</td>
                    <td>${new Date(r.observed_at).toLocaleString()}</td>
                    <td>${escapeHtml(r.remediation_text || '')}${r.mechanically_fixable ? ' <em>(fixable)</em>' : ''}</td>
                </tr>`).join('')
                : '<tr><td colspan="6" class="empty-state">No records yet</td></tr>';
        }

        async function loadAudit() {
            const response = await fetch('/api/compliance/audit');
            if (response.ok) renderAudit(await response.json());
        }

        function renderTranscript() {
            const pane = document.getElementById('transcript');
            pane.innerHTML = chat.transcript.map(entry =>
                `<div class="msg msg-${entry.speaker}">${escapeHtml(entry.text)}</div>`).join('');
            pane.scrollTop = pane.scrollHeight;
        }

        async function openChat(category, label) {
            const response = await fetch('/api/remediation/open', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ category, resource_label: label })
            });
            if (!response.ok) {
                showError(await readError(response));
                return;
            }
            chat = await response.json();
            document.getElementById('chatTitle').textContent =
                `Fix ${category}${label ? ': ' + label : ''}`;
            document.getElementById('chatModal').classList.add('open');
            renderTranscript();
        }

        function closeChat() {
            chat = null;
            document.getElementById('chatModal').classList.remove('open');
        }

        async function sendChat() {
            const input = document.getElementById('chatInput');
            const text = input.value.trim();
            if (!chat || !text) return;
            input.value = '';
            chat.transcript.push({ speaker: 'user', text, sent_at: new Date().toISOString() });
            renderTranscript();

            const button = document.getElementById('sendBtn');
            button.disabled = true;
            try {
                const response = await fetch('/api/remediation/chat', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify(chat)
                });
                if (response.ok) {
                    const body = await response.json();
                    chat.transcript.push({ speaker: 'assistant', text: body.reply, sent_at: new Date().toISOString() });
                    renderTranscript();
                } else {
                    const pane = document.getElementById('transcript');
                    pane.insertAdjacentHTML('beforeend',
                        `<div class="msg msg-error">${escapeHtml(await readError(response))}</div>`);
                }
            } finally {
                button.disabled = false;
            }
        }

        loadSession();
        loadAudit();
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn script_function<'a>(page: &'a str, name: &str) -> &'a str {
        let start = page
            .find(&format!("function {name}("))
            .expect("function present");
        let end = page[start..].find("\n        }").expect("function end");
        &page[start..start + end]
    }

    #[tokio::test]
    async fn test_fix_button_keeps_labels_out_of_markup() {
        let Html(page) = handle_compliance_dashboard_page().await;
        let fix_button = script_function(page, "fixButton");

        assert!(fix_button.contains("data-fix-index=\"${index}\""));
        assert!(!fix_button.contains("${label}"));
        assert!(!fix_button.contains("${category}"));
        assert!(!fix_button.contains("onclick"));
        assert!(!page.contains("onclick=\"openChat("));
        assert!(page.contains("document.addEventListener('click'"));
    }

    #[tokio::test]
    async fn test_dashboard_calls_the_json_api() {
        let Html(page) = handle_compliance_dashboard_page().await;
        assert!(page.contains(ApiUrls::COMPLIANCE_RUN));
        assert!(page.contains(ApiUrls::COMPLIANCE_AUDIT));
        assert!(page.contains(ApiUrls::REMEDIATION_CHAT));
        assert!(page.contains(ApiUrls::SESSION));
    }
}

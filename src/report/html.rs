// ABOUTME: HTML rendering of deployment reports with minijinja.
// ABOUTME: Template auto-escapes since its name ends in .html.

use minijinja::{Environment, context};

use super::DeploymentReport;

const TEMPLATE_NAME: &str = "report.html";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Deployment report {{ report.timestamp }}</title>
<style>
body { font-family: sans-serif; margin: 2em; }
.status { padding: 1em; border-radius: 4px; color: #fff; }
.ok { background: #2e7d32; }
.failed { background: #c62828; }
.cards { display: flex; gap: 1em; margin: 1em 0; }
.card { border: 1px solid #ccc; border-radius: 4px; padding: 1em; min-width: 8em; }
.card b { display: block; font-size: 1.6em; }
pre { background: #f5f5f5; padding: 1em; }
.line-error { color: #c62828; }
.line-warning { color: #ef6c00; }
.line-success { color: #2e7d32; }
</style>
</head>
<body>
<h1>Deployment of {{ report.target_environment }}</h1>
<div class="status {% if report.success %}ok{% else %}failed{% endif %}">
{% if report.success %}SUCCESS{% else %}FAILED{% endif %} in {{ report.duration_seconds }}s on {{ report.host }}
</div>
<p>
Active: {{ report.active_environment or "none" }} |
Previous: {{ report.previous_environment or "none" }} |
Strategy: {{ report.strategy }}
{% if report.traffic_gap_seconds is not none %}| Main port gap: {{ report.traffic_gap_seconds }}s{% endif %}
</p>
{% if report.error %}
<h2>Error</h2>
<pre class="line-error">{{ report.error }}</pre>
{% endif %}
<div class="cards">
<div class="card"><b>{{ report.metrics.deployments }}</b>deployments</div>
<div class="card"><b>{{ report.metrics.successful }}</b>successful</div>
<div class="card"><b>{{ report.metrics.failed }}</b>failed</div>
<div class="card"><b>{{ report.metrics.rollbacks }}</b>rollbacks</div>
<div class="card"><b>{{ report.metrics.avg_deployment_time_seconds|round(2) }}s</b>average</div>
</div>
<h2>Log</h2>
<pre>
{%- for line in report.log_tail %}
<span class="{% if '[ERROR]' in line %}line-error{% elif '[WARNING]' in line %}line-warning{% elif '[SUCCESS]' in line %}line-success{% endif %}">{{ line }}</span>
{%- endfor %}
</pre>
</body>
</html>
"#;

/// Render the human-readable page for `report`.
pub fn render_html(report: &DeploymentReport) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    env.get_template(TEMPLATE_NAME)?
        .render(context! { report => report })
}

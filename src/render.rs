//! Server-rendered HTML for the risk form.

use std::fmt::Write;

use crate::models::{format_percent, BorrowerRecord, FeatureValue};
use crate::schema::{FeatureKind, FeatureSpec, FormGroup, FEATURES};
use crate::services::{HistoryStatus, PredictionOutcome};

pub const PAGE_TITLE: &str = "Predição de Inadimplência";
pub const SUBMIT_LABEL: &str = "Prever risco de inadimplência";
pub const HISTORY_RECORDED: &str = "Previsão registrada no histórico.";

/// What to show below the form.
#[derive(Debug)]
pub enum PageResult<'a> {
    /// Plain form, nothing submitted yet.
    Empty,
    /// Recoverable warning (e.g. income guard).
    Warning(String),
    /// Request-level error; the form stays usable.
    Error(String),
    Outcome(&'a PredictionOutcome),
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
.columns { display: flex; gap: 2rem; }
.columns fieldset { flex: 1; border: none; padding: 0; margin: 0; }
label { display: block; margin-top: .75rem; font-size: .9rem; }
input, select { width: 100%; padding: .35rem; box-sizing: border-box; }
button { margin-top: 1.25rem; padding: .5rem 1rem; }
table { border-collapse: collapse; font-size: .8rem; overflow-x: auto; display: block; }
th, td { border: 1px solid #ddd; padding: .25rem .5rem; text-align: right; }
progress { width: 100%; height: 1rem; }
.metric { font-size: 2rem; margin: .5rem 0; }
.banner { padding: .75rem 1rem; border-radius: .4rem; margin: .75rem 0; }
.success { background: #dff5e3; color: #1b5e20; }
.warning { background: #fff6d6; color: #7a5b00; }
.error { background: #fde2e2; color: #8b1a1a; }
.info { background: #e3efff; color: #0b3d91; }
"#;

/// Escapes text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn banner(class: &str, text: &str) -> String {
    format!(
        r#"<div class="banner {}" role="status">{}</div>"#,
        class,
        escape_html(text)
    )
}

fn render_control(spec: &FeatureSpec, value: FeatureValue, out: &mut String) {
    let _ = write!(
        out,
        r#"<label for="{name}">{label}</label>"#,
        name = spec.name,
        label = escape_html(spec.label)
    );
    match spec.kind {
        FeatureKind::Categorical => {
            let current = value.as_f64() as i64;
            let _ = write!(out, r#"<select id="{0}" name="{0}">"#, spec.name);
            for code in spec.options() {
                let selected = if code == current { " selected" } else { "" };
                let _ = write!(out, r#"<option value="{0}"{1}>{0}</option>"#, code, selected);
            }
            out.push_str("</select>");
        }
        FeatureKind::Integer | FeatureKind::Float => {
            let _ = write!(
                out,
                r#"<input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}" required>"#,
                name = spec.name,
                min = spec.min,
                max = spec.max,
                step = spec.step(),
                value = value.to_cell()
            );
        }
    }
}

fn render_group(record: &BorrowerRecord, group: FormGroup, out: &mut String) {
    out.push_str("<fieldset>");
    for spec in FEATURES.iter().filter(|f| f.group == group) {
        render_control(spec, record.value(spec.id), out);
    }
    out.push_str("</fieldset>");
}

fn render_record_table(record: &BorrowerRecord, out: &mut String) {
    out.push_str("<h3>Dados informados</h3><table><thead><tr>");
    for spec in FEATURES.iter() {
        let _ = write!(out, "<th>{}</th>", spec.name);
    }
    out.push_str("</tr></thead><tbody><tr>");
    for value in record.values() {
        let _ = write!(out, "<td>{}</td>", value.to_cell());
    }
    out.push_str("</tr></tbody></table>");
}

fn render_outcome(outcome: &PredictionOutcome, out: &mut String) {
    let _ = write!(
        out,
        r#"<section id="result"><h3>Resultado</h3><progress value="{p}" max="1"></progress><div>Probabilidade de inadimplência</div><div class="metric">{pct}</div>"#,
        p = outcome.probability,
        pct = format_percent(outcome.probability)
    );
    out.push_str(&banner(outcome.tier.style(), outcome.tier.label()));
    match &outcome.history {
        HistoryStatus::Recorded => out.push_str(&banner("info", HISTORY_RECORDED)),
        HistoryStatus::Failed(msg) => out.push_str(&banner(
            "error",
            &format!("Falha ao registrar a previsão no histórico: {}", msg),
        )),
    }
    out.push_str("</section>");
}

/// Renders the full page: form, captured record and optional result.
pub fn render_page(record: &BorrowerRecord, result: PageResult<'_>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1><p>Aplicação para estimar a probabilidade de inadimplência de um cliente.</p>",
        PAGE_TITLE
    );

    body.push_str(r#"<form method="post" action="/predict"><div class="columns">"#);
    render_group(record, FormGroup::Primary, &mut body);
    render_group(record, FormGroup::Secondary, &mut body);
    let _ = write!(
        body,
        r#"</div><button type="submit">{}</button></form>"#,
        SUBMIT_LABEL
    );

    render_record_table(record, &mut body);

    match result {
        PageResult::Empty => {}
        PageResult::Warning(msg) => body.push_str(&banner("warning", &msg)),
        PageResult::Error(msg) => body.push_str(&banner("error", &msg)),
        PageResult::Outcome(outcome) => render_outcome(outcome, &mut body),
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = PAGE_TITLE,
        style = STYLE,
        body = body
    )
}

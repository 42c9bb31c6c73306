//! HTML form surface for interactive scoring

use crate::metrics::ScoringMetrics;
use crate::scoring::ScoringContext;
use crate::types::{ChurnAssessment, CustomerRecord, Gender, Geography};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Shared state handed to every request
pub struct AppState {
    pub context: Arc<ScoringContext>,
    pub metrics: Arc<ScoringMetrics>,
}

/// Build the form router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .with_state(Arc::new(state))
}

async fn show_form() -> Html<String> {
    Html(render_page(&CustomerRecord::default(), Panel::Empty))
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CustomerRecord>, FormRejection>,
) -> Response {
    let record = match form {
        Ok(Form(record)) => record,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected unparsable form");
            state.metrics.record_rejected();
            let panel = Panel::Rejected(rejection.body_text());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render_page(&CustomerRecord::default(), panel)),
            )
                .into_response();
        }
    };

    if let Err(e) = record.validate() {
        warn!(field = e.field, reason = %e.reason, "Rejected out-of-domain form value");
        state.metrics.record_rejected();
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render_page(&record, Panel::Rejected(e.to_string()))),
        )
            .into_response();
    }

    let start_time = Instant::now();
    match state.context.assess(&record) {
        Ok(assessment) => {
            let processing_time = start_time.elapsed();
            state.metrics.record_scored(processing_time, &assessment.result);

            info!(
                assessment_id = %assessment.assessment_id,
                probability = assessment.result.probability,
                verdict = ?assessment.result.verdict,
                processing_time_us = processing_time.as_micros(),
                "Churn risk estimated"
            );

            Html(render_page(&record, Panel::Scored(assessment))).into_response()
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Scoring failed");
            state.metrics.record_fault();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(&record, Panel::Fault)),
            )
                .into_response()
        }
    }
}

/// What to show below the form
enum Panel {
    Empty,
    Scored(ChurnAssessment),
    Rejected(String),
    Fault,
}

fn render_page(record: &CustomerRecord, panel: Panel) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Customer Churn Prediction</title>
    <style>
        body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
        label { display: block; margin-top: 0.8rem; }
        small { color: #666; }
        .result { margin-top: 1.5rem; padding: 1rem; border-radius: 0.4rem; }
        .at-risk { background: #fde2e1; }
        .low-risk { background: #e1f5e4; }
        .rejected, .fault { background: #fff4d6; }
    </style>
</head>
<body>
    <h1>Customer churn prediction</h1>
    <p>Estimates the <strong>risk of termination</strong> of a customer from their attributes.</p>
    <h2>Customer information</h2>
    <form method="post" action="/">
"#,
    );

    select(
        &mut html,
        "Geography",
        "Country",
        &Geography::ALL.map(|g| g.as_str()),
        record.geography.as_str(),
        None,
    );
    select(
        &mut html,
        "Gender",
        "Gender",
        &Gender::ALL.map(|g| g.as_str()),
        record.gender.as_str(),
        None,
    );

    let (lo, hi) = CustomerRecord::AGE_RANGE;
    number(&mut html, "Age", "Age", record.age as f64, lo as f64, Some(hi as f64), "1");
    let (lo, hi) = CustomerRecord::TENURE_RANGE;
    number(
        &mut html,
        "Tenure",
        "Tenure (years)",
        record.tenure as f64,
        lo as f64,
        Some(hi as f64),
        "1",
    );
    number(&mut html, "Balance", "Account balance", record.balance, 0.0, None, "0.01");

    let products = CustomerRecord::PRODUCT_CHOICES.map(|n| n.to_string());
    let products: Vec<&str> = products.iter().map(String::as_str).collect();
    select(
        &mut html,
        "NumOfProducts",
        "Number of products",
        &products,
        &record.num_of_products.to_string(),
        None,
    );

    select(
        &mut html,
        "HasCrCard",
        "Credit card",
        &["0", "1"],
        &record.has_cr_card.to_string(),
        Some("0 = the customer has no credit card | 1 = the customer holds a credit card"),
    );
    select(
        &mut html,
        "IsActiveMember",
        "Active customer",
        &["0", "1"],
        &record.is_active_member.to_string(),
        Some("0 = rarely or never active | 1 = active (regular use of the services)"),
    );

    let (lo, hi) = CustomerRecord::CREDIT_SCORE_RANGE;
    number(
        &mut html,
        "CreditScore",
        "Credit score",
        record.credit_score as f64,
        lo as f64,
        Some(hi as f64),
        "1",
    );
    number(
        &mut html,
        "EstimatedSalary",
        "Estimated salary",
        record.estimated_salary,
        0.0,
        None,
        "0.01",
    );

    html.push_str("        <p><button type=\"submit\">Estimate the risk</button></p>\n    </form>\n");

    match panel {
        Panel::Empty => {}
        Panel::Scored(assessment) => {
            let class = if assessment.result.verdict.is_at_risk() {
                "at-risk"
            } else {
                "low-risk"
            };
            let _ = write!(
                html,
                "    <div class=\"result {}\">\n        <h2>Result</h2>\n        <p><strong>Churn probability: {}</strong></p>\n        <p>{}</p>\n        <small>Assessment {} ({})</small>\n    </div>\n",
                class,
                assessment.result.percentage(),
                assessment.result.verdict.label(),
                escape(&assessment.assessment_id),
                assessment.backend,
            );
        }
        Panel::Rejected(reason) => {
            let _ = write!(
                html,
                "    <div class=\"result rejected\"><p>Invalid input: {}</p></div>\n",
                escape(&reason)
            );
        }
        Panel::Fault => {
            html.push_str(
                "    <div class=\"result fault\"><p>The churn risk could not be estimated. Please try again.</p></div>\n",
            );
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn select(
    html: &mut String,
    name: &str,
    label: &str,
    options: &[&str],
    selected: &str,
    help: Option<&str>,
) {
    let _ = writeln!(
        html,
        "        <label for=\"{0}\">{1}</label>\n        <select id=\"{0}\" name=\"{0}\">",
        name, label
    );
    for option in options {
        let marker = if *option == selected { " selected" } else { "" };
        let _ = writeln!(
            html,
            "            <option value=\"{0}\"{1}>{0}</option>",
            option, marker
        );
    }
    html.push_str("        </select>\n");
    if let Some(help) = help {
        let _ = writeln!(html, "        <small>{}</small>", help);
    }
}

fn number(
    html: &mut String,
    name: &str,
    label: &str,
    value: f64,
    min: f64,
    max: Option<f64>,
    step: &str,
) {
    let max = max.map(|m| format!(" max=\"{}\"", m)).unwrap_or_default();
    let _ = writeln!(
        html,
        "        <label for=\"{0}\">{1}</label>\n        <input type=\"number\" id=\"{0}\" name=\"{0}\" value=\"{2}\" min=\"{3}\"{4} step=\"{5}\" required>",
        name, label, value, min, max, step
    );
}

fn escape(text: &str) -> String {
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

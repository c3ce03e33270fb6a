//! Exam result emails over a JSON HTTP API. Optional and best effort:
//! callers log delivery failures and move on, grading never depends on it.

use std::time::Duration;

use serde::Serialize;

use crate::core::config::Settings;
use crate::db::types::SubmissionStatus;

#[derive(Debug, Clone)]
pub(crate) struct EmailNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_name: String,
    from_email: String,
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from_email: &'a str,
    from_name: &'a str,
    to_email: &'a str,
    subject: String,
    html_body: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ExamResultEmail<'a> {
    pub(crate) to_email: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) exam_title: &'a str,
    pub(crate) score: i32,
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) status: SubmissionStatus,
    pub(crate) certificate_url: Option<&'a str>,
}

impl EmailNotifier {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let email = settings.email();
        if !email.is_configured() {
            return Ok(None);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(email.request_timeout_seconds))
            .build()?;

        Ok(Some(Self {
            client,
            api_url: email.api_url.clone(),
            api_key: email.api_key.clone(),
            from_name: email.from_name.clone(),
            from_email: email.from_email.clone(),
        }))
    }

    pub(crate) async fn send_exam_result(&self, email: ExamResultEmail<'_>) -> anyhow::Result<()> {
        let verdict = match email.status {
            SubmissionStatus::Passed => "passed",
            SubmissionStatus::Failed => "did not pass",
            SubmissionStatus::Pending => "is awaiting manual evaluation of",
        };

        let mut html_body = format!(
            "<p>Hello {name},</p>\
             <p>Your attempt at <strong>{title}</strong> {verdict} with a score of \
             {score} / {total} ({percentage:.1}%).</p>",
            name = email.student_name,
            title = email.exam_title,
            verdict = verdict,
            score = email.score,
            total = email.total_points,
            percentage = email.percentage_score,
        );
        if let Some(url) = email.certificate_url {
            html_body.push_str(&format!(
                "<p>Your certificate is available <a href=\"{url}\">here</a>.</p>"
            ));
        }

        let payload = EmailPayload {
            from_email: &self.from_email,
            from_name: &self.from_name,
            to_email: email.to_email,
            subject: format!("Exam result: {}", email.exam_title),
            html_body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("email API returned {}", response.status());
        }

        Ok(())
    }
}

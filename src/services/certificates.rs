//! Certificate issuing for passed exams. Rendering is pure; the upload is
//! best effort and never blocks or rolls back grading.

use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::core::config::Settings;
use crate::services::storage::StorageService;

#[derive(Debug, Clone)]
pub(crate) struct CertificateData<'a> {
    pub(crate) student_name: &'a str,
    pub(crate) exam_title: &'a str,
    pub(crate) score: i32,
    pub(crate) total_points: i32,
    pub(crate) percentage_score: f64,
    pub(crate) issued_at: &'a str,
}

#[derive(Debug, Clone)]
pub(crate) struct IssuedCertificate {
    pub(crate) url: String,
    pub(crate) serial: String,
}

/// Deterministic serial for a given attempt, so re-issuing the same
/// certificate produces the same number.
pub(crate) fn serial_number(user_id: &str, exam_id: &str, submitted_at: &str) -> String {
    let digest = Sha256::digest(format!("{user_id}:{exam_id}:{submitted_at}").as_bytes());
    hex::encode(&digest[..8]).to_uppercase()
}

pub(crate) fn render_html(data: &CertificateData<'_>, serial: &str, issuer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Certificate of Achievement</title>
<style>
body {{ font-family: Georgia, serif; text-align: center; margin: 4em; }}
.frame {{ border: 6px double #2c3e50; padding: 3em; }}
h1 {{ letter-spacing: 0.2em; }}
.serial {{ color: #7f8c8d; font-size: 0.8em; }}
</style>
</head>
<body>
<div class="frame">
<h1>CERTIFICATE OF ACHIEVEMENT</h1>
<p>This certifies that</p>
<h2>{student_name}</h2>
<p>has successfully passed the examination</p>
<h3>{exam_title}</h3>
<p>with a score of {score} / {total_points} ({percentage:.1}%)</p>
<p>Issued on {issued_at} by {issuer}</p>
<p class="serial">Serial: {serial}</p>
</div>
</body>
</html>
"#,
        student_name = data.student_name,
        exam_title = data.exam_title,
        score = data.score,
        total_points = data.total_points,
        percentage = data.percentage_score,
        issued_at = data.issued_at,
        issuer = issuer,
        serial = serial,
    )
}

/// Renders, uploads, and presigns a certificate for a passed attempt.
/// Returns `None` when storage is not configured or the upload fails;
/// failures are logged and never surfaced to the caller.
pub(crate) async fn issue(
    storage: Option<&StorageService>,
    settings: &Settings,
    user_id: &str,
    exam_id: &str,
    data: CertificateData<'_>,
) -> Option<IssuedCertificate> {
    let Some(storage) = storage else {
        tracing::debug!(user_id, exam_id, "Storage not configured; skipping certificate");
        return None;
    };

    let serial = serial_number(user_id, exam_id, data.issued_at);
    let html = render_html(&data, &serial, &settings.certificates().issuer_name);
    let key = format!("certificates/{user_id}/{exam_id}.html");

    if let Err(err) = storage.upload_bytes(&key, "text/html; charset=utf-8", html.into_bytes()).await
    {
        tracing::warn!(error = %err, user_id, exam_id, "Certificate upload failed");
        return None;
    }

    let expires_in = Duration::from_secs(settings.certificates().url_expire_minutes * 60);
    match storage.presign_get(&key, expires_in).await {
        Ok(url) => Some(IssuedCertificate { url, serial }),
        Err(err) => {
            tracing::warn!(error = %err, user_id, exam_id, "Certificate presign failed");
            None
        }
    }
}

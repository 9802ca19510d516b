//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::{info, Instrument};
use uuid::Uuid;

use super::analyzer::{AnalysisRequest, AnalysisResult};
use super::extract::{MIME_DOCX, MIME_MARKDOWN, MIME_PDF, MIME_TEXT};
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const REQUIREMENTS_TEXT_FIELD: &str = "requirementsText";
const REQUIREMENTS_FIELD: &str = "requirements";

/// The decoded multipart upload.
#[derive(Debug, Default)]
struct ResumeUpload {
    file: Option<(Bytes, String)>,
    request: AnalysisRequest,
}

/// POST /api/v1/resumes/analyze
///
/// Multipart upload: `resume` file, optional `requirementsText`, and
/// `requirements` as a JSON array or repeated fields.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("resume_analyze", %request_id);

    async move {
        let upload = read_upload(multipart).await?;
        let Some((file, mime)) = upload.file else {
            return Err(AppError::Input(format!(
                "Please upload a resume file under field name \"{RESUME_FIELD}\""
            )));
        };

        info!("Analyzing resume upload ({} bytes, {mime})", file.len());
        let result = state
            .analyzer
            .analyze_resume(file, &mime, &upload.request)
            .await?;
        Ok(Json(result))
    }
    .instrument(span)
    .await
}

async fn read_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    let mut upload = ResumeUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Input(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            RESUME_FIELD => {
                let mime = resolve_mime(field.content_type(), field.file_name());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Input(format!("Failed to read resume file: {e}")))?;
                upload.file = Some((bytes, mime));
            }
            REQUIREMENTS_TEXT_FIELD => {
                let text = read_text(field).await?;
                if !text.trim().is_empty() {
                    upload.request.requirements_text = Some(text);
                }
            }
            REQUIREMENTS_FIELD => {
                let text = read_text(field).await?;
                upload.request.requirements.extend(parse_requirements(&text)?);
            }
            _ => {}
        }
    }

    Ok(upload)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Input(format!("Invalid multipart field: {e}")))
}

/// A JSON array of strings, or a single requirement.
fn parse_requirements(raw: &str) -> Result<Vec<String>, AppError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let list: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|e| AppError::Input(format!("requirements must be a JSON array of strings: {e}")))?;
        return Ok(list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect());
    }
    Ok(if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    })
}

/// Declared content type, or a guess from the file extension when the
/// client sent none or a generic one.
fn resolve_mime(content_type: Option<&str>, file_name: Option<&str>) -> String {
    match content_type {
        Some(ct) if !ct.trim().is_empty() && ct != "application/octet-stream" => ct.to_string(),
        other => {
            let extension = file_name
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_lowercase());
            match extension.as_deref() {
                Some("pdf") => MIME_PDF.to_string(),
                Some("docx") => MIME_DOCX.to_string(),
                Some("txt") => MIME_TEXT.to_string(),
                Some("md") => MIME_MARKDOWN.to_string(),
                _ => other.unwrap_or("application/octet-stream").to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_accept_array_or_single_value() {
        assert_eq!(
            parse_requirements(r#"["Python", " docker ", ""]"#).unwrap(),
            vec!["Python", "docker"]
        );
        assert_eq!(parse_requirements(" kubernetes ").unwrap(), vec!["kubernetes"]);
        assert!(parse_requirements("   ").unwrap().is_empty());
        assert!(parse_requirements("[1, 2").is_err());
    }

    #[test]
    fn test_mime_falls_back_to_extension() {
        assert_eq!(resolve_mime(Some("application/pdf"), Some("cv.docx")), MIME_PDF);
        assert_eq!(resolve_mime(Some("application/octet-stream"), Some("CV.DOCX")), MIME_DOCX);
        assert_eq!(resolve_mime(None, Some("resume.txt")), MIME_TEXT);
        assert_eq!(resolve_mime(None, None), "application/octet-stream");
    }
}

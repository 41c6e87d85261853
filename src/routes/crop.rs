//! Crop endpoint
//!
//! POST /crop, multipart form:
//! - `file`: source PDF (required)
//! - `page`: 0-based page index, default 0
//! - `x`, `y`, `w`, `h`: crop rectangle in top-left-origin pixels, default 0
//!
//! Returns the cropped single-page PDF as an attachment.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, Result};
use crate::pdf::{self, CropError, CropRect};
use crate::state::AppState;
use crate::upload::TempUpload;

/// Raw form fields, kept as strings until validation.
#[derive(Default)]
struct RawCropParams {
    page: Option<String>,
    x: Option<String>,
    y: Option<String>,
    w: Option<String>,
    h: Option<String>,
}

impl RawCropParams {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "page" => self.page = Some(value),
            "x" => self.x = Some(value),
            "y" => self.y = Some(value),
            "w" => self.w = Some(value),
            "h" => self.h = Some(value),
            _ => {}
        }
    }

    /// Parse all five numeric fields. Absent or empty fields default to
    /// zero; anything non-numeric fails the whole set. NaN and the
    /// infinities parse as f32 but make no sense in a transform matrix,
    /// so they fail too.
    fn parse(&self) -> Option<(i64, CropRect)> {
        let page = parse_or_zero::<i64>(self.page.as_deref())?;
        let rect = CropRect {
            x: parse_or_zero(self.x.as_deref())?,
            y: parse_or_zero(self.y.as_deref())?,
            width: parse_or_zero(self.w.as_deref())?,
            height: parse_or_zero(self.h.as_deref())?,
        };
        if ![rect.x, rect.y, rect.width, rect.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return None;
        }
        Some((page, rect))
    }
}

fn parse_or_zero<T: std::str::FromStr + Default>(raw: Option<&str>) -> Option<T> {
    match raw.map(str::trim) {
        None | Some("") => Some(T::default()),
        Some(value) => value.parse().ok(),
    }
}

/// POST /crop
pub async fn crop_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut upload: Option<TempUpload> = None;
    let mut params = RawCropParams::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let data = field.bytes().await?;
            tracing::debug!("Received upload of {} bytes", data.len());
            upload = Some(TempUpload::write(state.upload_dir(), &data).await?);
        } else {
            let value = field.text().await?;
            params.set(&name, value);
        }
    }

    // The upload guard deletes the temp file on every return path below.
    let upload = upload.ok_or_else(|| AppError::InvalidRequest("No file uploaded".to_string()))?;

    let (page, rect) = params
        .parse()
        .ok_or_else(|| AppError::InvalidRequest("Invalid crop parameters".to_string()))?;

    let data = tokio::fs::read(upload.path()).await?;
    let cropped = tokio::task::spawn_blocking(move || pdf::crop_page(&data, page, rect))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| match e {
            CropError::PageOutOfBounds { .. } => {
                AppError::InvalidRequest("Page index out of bounds".to_string())
            }
            other => AppError::from(other),
        })?;

    tracing::info!(
        page,
        x = rect.x,
        y = rect.y,
        w = rect.width,
        h = rect.height,
        bytes = cropped.len(),
        "Crop complete"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"cropped.pdf\"",
        ),
    ];
    Ok((headers, cropped).into_response())
}

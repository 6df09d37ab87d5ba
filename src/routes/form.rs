use std::{collections::HashMap, io};

use axum::{
    extract::{rejection::JsonRejection, Multipart},
    http::StatusCode,
    Json,
};
use log::{debug, error};

use super::error::ApiError;
use crate::upload::{ImageStore, StoredImage};

/// The only field a file may be uploaded under.
pub const IMAGE_FIELD: &str = "image";

/// A decoded `multipart/form-data` body: its text fields, plus the image if
/// one was uploaded with this request.
#[derive(Debug, Default)]
pub struct Form {
    fields: HashMap<String, String>,
    pub image: Option<StoredImage>,
}

impl Form {
    /// Remove a text field, or an empty string if it wasn't sent.
    pub fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

/// Unwrap a JSON body, treating one that isn't JSON of the right shape as
/// empty, so missing fields are reported by the handler's own validation.
/// Bodies that couldn't be read at all (e.g. over the size limit) still fail.
pub fn json_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::BytesRejection(rejection)) => {
            Err(ApiError::new(rejection.status(), rejection.body_text()))
        }
        Err(rejection) => {
            debug!("Treating unreadable JSON body as empty: {}", rejection.body_text());
            Ok(T::default())
        }
    }
}

/// Read the whole body, storing at most one file (under [`IMAGE_FIELD`]).
pub async fn read(mut multipart: Multipart, images: &ImageStore) -> Result<Form, ApiError> {
    let mut form = Form::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_owned) else {
            let text = field
                .text()
                .await
                .map_err(|err| ApiError::bad_request(err.to_string()))?;
            form.fields.insert(name, text);
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?;

        // Browsers send an empty file part when nothing was picked.
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        if name != IMAGE_FIELD || form.image.is_some() {
            debug!("Rejected file {:?} in field {:?}", file_name, name);
            return Err(ApiError::bad_request("Unexpected file field"));
        }

        let stored = images.store(&file_name, &bytes).await.map_err(|err| {
            let status = match err.kind() {
                io::ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                _ => {
                    error!("Failed to save image {:?}: {}", file_name, err);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            ApiError::new(status, format!("Error saving image: {err}"))
        })?;
        debug!("Stored upload {:?} for field {:?}", stored.file_name, name);
        form.image = Some(stored);
    }

    Ok(form)
}

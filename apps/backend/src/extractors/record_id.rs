use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use serde::Deserialize;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Positive `?id=N` query parameter used by the update and delete routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

#[derive(Deserialize)]
struct IdQuery {
    id: Option<String>,
}

fn parse(req: &HttpRequest) -> Result<RecordId, AppError> {
    let query = web::Query::<IdQuery>::from_query(req.query_string())
        .map_err(|_| AppError::bad_request(ErrorCode::InvalidId, "Malformed query string"))?;
    let raw = query
        .into_inner()
        .id
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidId, "Missing id parameter"))?;
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(RecordId(id)),
        _ => Err(AppError::bad_request(
            ErrorCode::InvalidId,
            format!("Invalid id: {raw}"),
        )),
    }
}

impl FromRequest for RecordId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse(req))
    }
}

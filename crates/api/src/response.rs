use serde::Serialize;

/// Success body of every `/api/v1` route: `{ "data": ... }`.
///
/// The dashboard client unwraps `data` before decoding, so handlers never
/// return bare payloads.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

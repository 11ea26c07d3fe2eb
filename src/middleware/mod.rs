pub mod principal;
pub mod request_id;

pub use principal::{OwnerPrincipal, OWNER_REF_HEADER};
pub use request_id::{RequestId, RequestIdValue, REQUEST_ID_HEADER};

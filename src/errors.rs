use std::fmt;
use std::fmt::Formatter;
use crate::manager_production::ProdError;

#[derive(Debug)]
pub struct UnrecoverableError(pub String);
impl fmt::Display for UnrecoverableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UnrecoverableError: {}", self.0)
    }
}
impl From<ProdError> for UnrecoverableError {
    fn from(e: ProdError) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<serde_json::Error> for UnrecoverableError {
    fn from(e: serde_json::Error) -> Self { UnrecoverableError(e.to_string()) }
}

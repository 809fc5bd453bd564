use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::request::GenerateRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: String,
}

impl GenerateResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<GenerateResponse>> + 'a>>;

/// One round trip to a generative model. Implementations issue exactly one
/// request per call and never retry.
pub trait ModelGateway {
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> ModelGatewayFuture<'a>;
}

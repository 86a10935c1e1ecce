//! Request pipeline shared by the REST routes and the handler form:
//! credential check, validation, then dispatch.

use super::credentials::ApiKeyVerifier;
use super::dispatcher::Dispatcher;
use super::metrics::record_rejection;
use super::validator::{
    require_api_key, validate_job_id, validate_mask, validate_operation, validate_payload,
};
use crate::error::{FacadeError, RequestError};
use crate::models::{GeneratedMask, Operation, ProcessType, VideoJob};
use serde_json::Value;

#[derive(Clone)]
pub struct Processor {
    verifier: ApiKeyVerifier,
    dispatcher: Dispatcher,
}

impl Processor {
    pub fn new(verifier: ApiKeyVerifier, dispatcher: Dispatcher) -> Self {
        Self {
            verifier,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle a payload that names its own `process_type`.
    pub async fn process(&self, payload: &Value) -> Result<Value, FacadeError> {
        let request = self
            .authenticate(payload)
            .and_then(|_| validate_payload(payload))
            .map_err(|e| rejected(declared_process_type(payload), e))?;

        Ok(self.dispatcher.dispatch(&request.operation).await?)
    }

    /// Handle a payload for a route that fixes the process type.
    pub async fn process_as(
        &self,
        process_type: ProcessType,
        payload: &Value,
    ) -> Result<Value, FacadeError> {
        let request = self
            .authenticate(payload)
            .and_then(|_| validate_operation(process_type, payload))
            .map_err(|e| rejected(Some(process_type), e))?;

        Ok(self.dispatcher.dispatch(&request.operation).await?)
    }

    pub async fn create_mask(&self, payload: &Value) -> Result<GeneratedMask, FacadeError> {
        let params = self
            .authenticate(payload)
            .and_then(|_| validate_mask(payload))
            .map_err(|e| rejected(Some(ProcessType::ImageEdit), e))?;

        Ok(self.dispatcher.create_mask(&params).await?)
    }

    /// Start a video generation and return its job handle immediately.
    pub async fn submit_video(&self, payload: &Value) -> Result<VideoJob, FacadeError> {
        let request = self
            .authenticate(payload)
            .and_then(|_| validate_operation(ProcessType::VideoGeneration, payload))
            .map_err(|e| rejected(Some(ProcessType::VideoGeneration), e))?;

        match &request.operation {
            Operation::VideoGeneration(params) => {
                Ok(self.dispatcher.submit_video(params).await?)
            }
            _ => Err(RequestError::UnknownProcessType.into()),
        }
    }

    /// Look up a submitted job. The key travels out of band (a header), so it
    /// is passed separately from the path parameter.
    pub async fn video_status(
        &self,
        api_key: Option<&str>,
        job_id: &str,
    ) -> Result<VideoJob, FacadeError> {
        self.verifier
            .verify(api_key.unwrap_or_default())
            .map_err(|e| rejected(Some(ProcessType::VideoGeneration), e))?;

        let job_id = validate_job_id(job_id)
            .map_err(|e| rejected(Some(ProcessType::VideoGeneration), e))?;

        Ok(self.dispatcher.video_status(job_id).await?)
    }

    fn authenticate(&self, payload: &Value) -> Result<(), RequestError> {
        let key = require_api_key(payload)?;
        self.verifier.verify(key)
    }
}

fn declared_process_type(payload: &Value) -> Option<ProcessType> {
    payload
        .get("process_type")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
}

fn rejected(process_type: Option<ProcessType>, err: RequestError) -> RequestError {
    tracing::info!(
        process_type = process_type.map(ProcessType::as_str).unwrap_or("unknown"),
        reason = err.kind(),
        "Rejected request: {}",
        err
    );
    record_rejection(process_type, err.kind());
    err
}

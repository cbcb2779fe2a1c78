use std::path::PathBuf;

use anyhow::Result;
use fare_core::{CabType, FareEstimator, FareRequest, ServiceType};
use inquire::{Confirm, InquireError, Select, Text, validator::Validation};

use crate::render;

/// Ride details collected from flags; anything missing is prompted for.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub service: Option<ServiceType>,
    pub cab: Option<String>,
}

impl RequestDraft {
    /// The request, if every field was supplied up front.
    pub fn try_complete(&self) -> Option<Result<FareRequest>> {
        let (source, destination, service, cab) = (
            self.source.as_ref()?,
            self.destination.as_ref()?,
            self.service?,
            self.cab.as_ref()?,
        );
        Some(CabType::new(service, cab).map(|cab| FareRequest::new(source, destination, cab)))
    }

    /// Fill the gaps interactively.
    pub fn complete(&self) -> Result<FareRequest> {
        if let Some(request) = self.try_complete() {
            return request;
        }

        println!("Please type the full address including the pin code and state.");
        let source = match &self.source {
            Some(s) => s.clone(),
            None => prompt_address("Enter your source address:")?,
        };
        let destination = match &self.destination {
            Some(d) => d.clone(),
            None => prompt_address("Enter your destination address:")?,
        };
        let service = match self.service {
            Some(s) => s,
            None => Select::new("Choose a service type:", ServiceType::all().to_vec()).prompt()?,
        };
        let cab = match &self.cab {
            Some(name) => CabType::new(service, name)?,
            None => {
                let name = Select::new("Choose a cab type:", service.cab_types().to_vec()).prompt()?;
                CabType::new(service, name)?
            }
        };

        Ok(FareRequest::new(source, destination, cab))
    }
}

fn prompt_address(message: &str) -> Result<String> {
    let address = Text::new(message)
        .with_validator(|input: &str| {
            Ok(if input.trim().is_empty() {
                Validation::Invalid("Please enter an address.".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()?;
    Ok(address.trim().to_string())
}

/// How the interactive loop reacts to a failed attempt at collecting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFailure {
    /// The user backed out with Esc or Ctrl-C.
    Cancelled,
    /// The answers were rejected, e.g. a cab the service does not offer. Ask again.
    Rejected,
    /// The terminal itself failed; prompting again cannot succeed.
    Fatal,
}

fn classify(err: &anyhow::Error) -> InputFailure {
    match err.downcast_ref::<InquireError>() {
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            InputFailure::Cancelled
        }
        Some(_) => InputFailure::Fatal,
        None => InputFailure::Rejected,
    }
}

#[derive(Debug)]
pub enum SessionState {
    AwaitingInput,
    PredictionInFlight(FareRequest),
}

/// Prompt, predict, show, repeat until the user is done.
pub struct Session<'a> {
    estimator: &'a FareEstimator,
    map_path: Option<PathBuf>,
    state: SessionState,
}

impl<'a> Session<'a> {
    pub fn new(estimator: &'a FareEstimator, map_path: Option<PathBuf>) -> Self {
        Self { estimator, map_path, state: SessionState::AwaitingInput }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, SessionState::AwaitingInput) {
                SessionState::AwaitingInput => match RequestDraft::default().complete() {
                    Ok(request) => SessionState::PredictionInFlight(request),
                    Err(err) => match classify(&err) {
                        InputFailure::Cancelled => return Ok(()),
                        InputFailure::Rejected => {
                            eprintln!("{err}");
                            SessionState::AwaitingInput
                        }
                        InputFailure::Fatal => return Err(err),
                    },
                },
                SessionState::PredictionInFlight(request) => {
                    println!("Predicting the fare...");
                    match self.estimator.estimate(&request).await {
                        Ok(quote) => render::quote(&quote, self.map_path.as_deref())?,
                        Err(err) => eprintln!("{err}"),
                    }

                    let again = Confirm::new("Predict another fare?").with_default(true).prompt();
                    match again {
                        Ok(true) => SessionState::AwaitingInput,
                        Ok(false)
                        | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                            return Ok(());
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
            };
        }
    }
}

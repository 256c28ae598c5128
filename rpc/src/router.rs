use std::{collections::HashMap, fmt, marker::PhantomData};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub struct Router<S> {
    pub routes: HashMap<String, Box<dyn Handler<S> + Send + Sync>>,
}

impl<S> Router<S> {
    pub fn new() -> Self {
        Router {
            routes: HashMap::new(),
        }
    }

    pub fn add<Marker: 'static + Send + Sync>(
        &mut self,
        name: &str,
        function: impl HandlerFunction<S, Marker>,
    ) -> &mut Self {
        self.routes.insert(
            name.to_owned(),
            Box::new(FunctionHandler {
                function,
                marker: PhantomData,
            }),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Registered verbs, sorted.
    pub fn verbs(&self) -> Vec<&str> {
        let mut verbs: Vec<&str> =
            self.routes.keys().map(String::as_str).collect();
        verbs.sort_unstable();
        verbs
    }

    /// Dispatch `request` to the handler registered under its verb.
    ///
    /// Never fails: an unknown verb or malformed arguments come back as an
    /// `Error` reply.
    pub fn call(&self, state: &mut S, request: &Request) -> Reply {
        match self.routes.get(&request.verb) {
            Some(handler) => {
                log::debug!("dispatching {}", request.verb);
                handler.call(state, request.data.clone())
            }
            None => {
                log::warn!("no handler registered for {}", request.verb);
                Reply::error(
                    NOT_FOUND,
                    format!("Unknown function: {}", request.verb),
                )
            }
        }
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a reply whose verb has no handler.
pub const NOT_FOUND: &str = "NotFound";
/// Kind of a reply whose arguments could not be deserialized.
pub const BAD_ARGUMENTS: &str = "BadArguments";
/// Kind of a reply whose result could not be serialized.
pub const CATASTROPHIC: &str = "Catastrophic";

const CATASTROPHIC_ERROR: &str = "{\"outcome\": \"Error\", \"data\": {\"error\": \"CATASTROPHIC_ERROR: Failed to serialize response\", \"kind\": \"Catastrophic\"}}";

/// An inbound request: the verb names the handler, `data` carries its
/// arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub verb: String,
    #[serde(default)]
    pub data: Value,
}

impl Request {
    pub fn new(verb: impl Into<String>, data: Value) -> Self {
        Request {
            verb: verb.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ok,
    Error,
}

/// The answer to a [`Request`].
///
/// Failed replies carry `{"error": <message>, "kind": <kind>}` as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub outcome: Outcome,
    #[serde(default)]
    pub data: Value,
}

impl Reply {
    pub fn success(result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(data) => Reply {
                outcome: Outcome::Ok,
                data,
            },
            Err(err) => {
                log::error!("failed to serialize reply: {}", err);
                Reply::error(
                    CATASTROPHIC,
                    "CATASTROPHIC_ERROR: Failed to serialize response",
                )
            }
        }
    }

    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Reply {
            outcome: Outcome::Error,
            data: json!({
                "error": message.into(),
                "kind": kind,
            }),
        }
    }

    pub fn failure<E: HandlerError + ?Sized>(error: &E) -> Self {
        Reply::error(error.kind(), error.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Ok
    }

    pub fn error_message(&self) -> Option<&str> {
        match self.outcome {
            Outcome::Error => self.data.get("error").and_then(Value::as_str),
            Outcome::Ok => None,
        }
    }

    pub fn error_kind(&self) -> Option<&str> {
        match self.outcome {
            Outcome::Error => self.data.get("kind").and_then(Value::as_str),
            Outcome::Ok => None,
        }
    }

    /// Decode the payload of a successful reply.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        match self.outcome {
            Outcome::Ok => serde_json::from_value(self.data.clone()).ok(),
            Outcome::Error => None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or(CATASTROPHIC_ERROR.into())
    }
}

/// Errors a handler may return. `kind` names the failure class on the wire.
pub trait HandlerError: fmt::Display {
    fn kind(&self) -> &'static str;
}

pub trait HandlerFunction<S, Marker>: Send + Sync + 'static {
    fn call(&self, state: &mut S, data: Value) -> Reply;
}

impl<S, F, T, R, E> HandlerFunction<S, fn(T) -> Result<R, E>> for F
where
    F: Fn(&mut S, T) -> Result<R, E> + Send + Sync + 'static,
    T: DeserializeOwned,
    R: Serialize,
    E: HandlerError,
{
    fn call(&self, state: &mut S, data: Value) -> Reply {
        let data = match data {
            Value::Null => Value::Object(Map::new()),
            data => data,
        };
        match serde_json::from_value::<T>(data) {
            Ok(args) => match (self)(state, args) {
                Ok(result) => Reply::success(result),
                Err(error) => Reply::failure(&error),
            },
            Err(err) => Reply::error(
                BAD_ARGUMENTS,
                format!("Failed to deserialize arguments: {}", err),
            ),
        }
    }
}

struct FunctionHandler<F, Marker> {
    function: F,
    marker: PhantomData<Marker>,
}

impl<S, F: HandlerFunction<S, Marker>, Marker> Handler<S>
    for FunctionHandler<F, Marker>
{
    fn call(&self, state: &mut S, data: Value) -> Reply {
        self.function.call(state, data)
    }
}

pub trait Handler<S> {
    fn call(&self, state: &mut S, data: Value) -> Reply;
}

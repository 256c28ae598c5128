//! The four table operations, as dispatched by the [`rpc::Router`].
//!
//! Every handler takes the service state and its typed arguments and
//! returns either a serializable result or a [`TableError`]; the router
//! turns both into a [`rpc::Reply`].

use std::{fmt, str::FromStr};

use rpc::Router;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::{
    service::TableState,
    store::{Entry, EntryId},
    view::Renderer,
    Result, TableError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Insert,
    Delete,
    Get,
    List,
}

impl Verb {
    pub const ALL: [Verb; 4] =
        [Verb::Insert, Verb::Delete, Verb::Get, Verb::List];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Insert => "Insert",
            Verb::Delete => "Delete",
            Verb::Get => "Get",
            Verb::List => "List",
        }
    }

    /// Full operation path, e.g. `Impl/Insert` for prefix `Impl/`.
    pub fn path(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.as_str())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown verb: {}", s))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsertArgs {
    #[serde(default)]
    pub name: String,
}

/// An id as it arrives on the wire. The browser sends the row's DOM id,
/// which is a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdArg {
    Number(Number),
    Text(String),
}

impl IdArg {
    pub fn resolve(&self) -> Option<EntryId> {
        match self {
            IdArg::Number(number) => number.as_u64().map(EntryId),
            IdArg::Text(text) => parse_index(text).map(EntryId),
        }
    }
}

/// Canonical decimal index only: no sign, padding or leading zeros.
fn parse_index(text: &str) -> Option<u64> {
    let digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    if !digits || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for IdArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdArg::Number(number) => write!(f, "{}", number),
            IdArg::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdArgs {
    #[serde(default)]
    pub id: Option<IdArg>,
}

impl IdArgs {
    fn resolve(&self) -> Result<EntryId> {
        match &self.id {
            Some(arg) => arg
                .resolve()
                .ok_or_else(|| TableError::UnknownId(arg.to_string())),
            None => Err(TableError::UnknownId("undefined".to_owned())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inserted {
    pub id: EntryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub all_names: String,
}

pub fn insert<R: Renderer>(
    state: &mut TableState<R>,
    args: InsertArgs,
) -> Result<Inserted> {
    let id = state.store.insert(&args.name)?;
    let name = state.store.get(id)?.to_owned();
    state.view.insert_row(&Entry { id, name });
    Ok(Inserted { id })
}

/// Validity is checked even though the UI only offers ids of rendered rows.
pub fn delete<R: Renderer>(
    state: &mut TableState<R>,
    args: IdArgs,
) -> Result<Named> {
    let id = args.resolve()?;
    let name = state.store.remove(id)?;
    state.view.delete_row(id);
    Ok(Named { name })
}

pub fn get<R: Renderer>(
    state: &mut TableState<R>,
    args: IdArgs,
) -> Result<Named> {
    let id = args.resolve()?;
    let name = state.store.get(id)?.to_owned();
    Ok(Named { name })
}

pub fn list<R: Renderer>(
    state: &mut TableState<R>,
    _: ListArgs,
) -> Result<Listing> {
    let all_names = state.store.describe()?;
    Ok(Listing { all_names })
}

/// Router serving all four verbs under `prefix`.
pub fn router<R: Renderer + 'static>(prefix: &str) -> Router<TableState<R>> {
    rpc::routes! {
        &Verb::Insert.path(prefix) => insert::<R>,
        &Verb::Delete.path(prefix) => delete::<R>,
        &Verb::Get.path(prefix) => get::<R>,
        &Verb::List.path(prefix) => list::<R>,
    }
}

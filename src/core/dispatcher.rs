//! Command dispatcher
//!
//! Parses one line of client input into a `Command` and resolves it to an
//! operation. `HI` and `LIST` are answered directly from the inventory;
//! `BUY` is handed back to the session as a purchase to run.
//!
//! Arity is validated while parsing, so a command that reaches `execute` is
//! always well-formed and nothing runs before an arity mismatch is detected.

use crate::core::traits::InventoryStore;
use crate::types::{ItemId, Reply, ResultCode, StoreError};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handshake, answered with the store name
    Hi,

    /// Full inventory snapshot
    List,

    /// Start a purchase of one unit
    Buy { item_id: ItemId },
}

impl Command {
    /// Protocol verb of the command
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Hi => "HI",
            Command::List => "LIST",
            Command::Buy { .. } => "BUY",
        }
    }
}

impl FromStr for Command {
    type Err = StoreError;

    /// Parse a whitespace-delimited line: the first token is the verb, the
    /// rest are its arguments
    ///
    /// # Errors
    ///
    /// - `StoreError::UnknownCommand` for an unrecognized (or missing) verb
    /// - `StoreError::BadArguments` when a known verb has the wrong arity
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        match (verb, args.as_slice()) {
            ("HI", []) => Ok(Command::Hi),
            ("LIST", []) => Ok(Command::List),
            ("BUY", [item_id]) => Ok(Command::Buy {
                item_id: item_id.to_string(),
            }),
            ("HI" | "LIST", _) => Err(StoreError::bad_arguments(verb, 0, args.len())),
            ("BUY", _) => Err(StoreError::bad_arguments(verb, 1, args.len())),
            _ => Err(StoreError::unknown_command(verb)),
        }
    }
}

/// What the session has to do with a dispatched line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Write this reply and read the next command
    Reply(Reply),

    /// Run a purchase transaction for this item
    Purchase(ItemId),
}

/// Resolves client lines against the inventory
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn InventoryStore>,
    store_name: String,
    owner_id: String,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// # Arguments
    ///
    /// * `store` - inventory answering LIST
    /// * `store_name` - name returned by the HI handshake
    /// * `owner_id` - store owner's identifier appended to LIST payloads
    pub fn new(
        store: Arc<dyn InventoryStore>,
        store_name: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            store_name: store_name.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Parse and execute one line of input
    ///
    /// `connected` is the current number of connected sessions, reported by LIST.
    pub fn dispatch(&self, line: &str, connected: usize) -> Dispatch {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command, connected),
            Err(e) => {
                debug!(error = %e, "Command rejected");
                Dispatch::Reply(Reply::err(e.code()))
            }
        }
    }

    /// Execute an already parsed command
    pub fn execute(&self, command: Command, connected: usize) -> Dispatch {
        debug!(verb = command.verb(), "Command executed");
        match command {
            Command::Hi => Dispatch::Reply(Reply::ok(self.store_name.as_str())),
            Command::List => Dispatch::Reply(self.list(connected)),
            Command::Buy { item_id } => Dispatch::Purchase(item_id),
        }
    }

    fn list(&self, connected: usize) -> Reply {
        match self.list_payload(connected) {
            Ok(payload) => Reply::ok(payload),
            Err(e) => {
                error!(error = %e, "Failed to serialize inventory");
                Reply::err(ResultCode::Unknown)
            }
        }
    }

    /// JSON array of every item row followed by the connected count and the owner ID
    fn list_payload(&self, connected: usize) -> Result<String, serde_json::Error> {
        let items = self.store.list();
        let mut entries = Vec::with_capacity(items.len() + 2);
        for item in &items {
            entries.push(serde_json::to_value(item)?);
        }
        entries.push(Value::from(connected));
        entries.push(Value::from(self.owner_id.as_str()));
        serde_json::to_string(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inventory::MemoryInventory;
    use crate::types::Item;
    use rstest::rstest;
    use rust_decimal::Decimal;

    const OWNER: &str = "4e0d3bbc-fac8-4a28-909a-752f65cf9c6c";

    fn dispatcher() -> (Dispatcher, Arc<MemoryInventory>) {
        let store = Arc::new(MemoryInventory::with_items([
            Item::new("x", "Sake", "jp", 3, Decimal::new(100, 0)),
            Item::new("y", "Beer", "de", 0, Decimal::new(3500, 0)),
        ]));
        (Dispatcher::new(store.clone(), "liquor_store", OWNER), store)
    }

    #[rstest]
    #[case::hi("HI", Command::Hi)]
    #[case::list("LIST", Command::List)]
    #[case::buy("BUY abc-123", Command::Buy { item_id: "abc-123".to_string() })]
    #[case::surrounding_whitespace("  BUY\tabc  \r\n", Command::Buy { item_id: "abc".to_string() })]
    fn test_parse_valid(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(line.parse::<Command>(), Ok(expected));
    }

    #[rstest]
    #[case::unknown_verb("FOO", StoreError::unknown_command("FOO"))]
    #[case::unknown_verb_with_args("FOO a b", StoreError::unknown_command("FOO"))]
    #[case::lower_case("hi", StoreError::unknown_command("hi"))]
    #[case::buy_no_args("BUY", StoreError::bad_arguments("BUY", 1, 0))]
    #[case::buy_two_args("BUY a b", StoreError::bad_arguments("BUY", 1, 2))]
    #[case::hi_with_args("HI there", StoreError::bad_arguments("HI", 0, 1))]
    #[case::list_with_args("LIST all", StoreError::bad_arguments("LIST", 0, 1))]
    fn test_parse_errors(#[case] line: &str, #[case] expected: StoreError) {
        assert_eq!(line.parse::<Command>(), Err(expected));
    }

    #[rstest]
    #[case::unknown("FOO", ResultCode::UnknownCommand)]
    #[case::buy_no_args("BUY", ResultCode::BadArguments)]
    #[case::buy_two_args("BUY x y", ResultCode::BadArguments)]
    fn test_dispatch_errors_have_empty_payload(#[case] line: &str, #[case] code: ResultCode) {
        let (dispatcher, store) = dispatcher();
        let before = store.list();

        let result = dispatcher.dispatch(line, 1);

        assert_eq!(result, Dispatch::Reply(Reply::err(code)));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_dispatch_hi() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            dispatcher.dispatch("HI", 1),
            Dispatch::Reply(Reply::ok("liquor_store"))
        );
    }

    #[test]
    fn test_dispatch_buy_defers_to_purchase() {
        let (dispatcher, store) = dispatcher();

        assert_eq!(
            dispatcher.dispatch("BUY x", 1),
            Dispatch::Purchase("x".to_string())
        );
        assert_eq!(store.get("x").unwrap().stock, 3);
    }

    #[test]
    fn test_list_payload_shape() {
        let (dispatcher, store) = dispatcher();

        let reply = match dispatcher.dispatch("LIST", 2) {
            Dispatch::Reply(reply) => reply,
            other => panic!("Expected a reply, got {:?}", other),
        };
        assert!(reply.is_success());

        let entries: Vec<Value> = serde_json::from_str(reply.payload()).unwrap();
        assert_eq!(entries.len(), store.len() + 2);
        assert_eq!(entries[0], serde_json::json!(["y", "Beer", "de", 0, 3500.0]));
        assert_eq!(entries[1], serde_json::json!(["x", "Sake", "jp", 3, 100.0]));
        assert_eq!(entries[2], serde_json::json!(2));
        assert_eq!(entries[3], serde_json::json!(OWNER));
    }

    #[test]
    fn test_list_empty_store() {
        let dispatcher = Dispatcher::new(Arc::new(MemoryInventory::new()), "s", OWNER);

        let reply = match dispatcher.dispatch("LIST", 1) {
            Dispatch::Reply(reply) => reply,
            other => panic!("Expected a reply, got {:?}", other),
        };

        let entries: Vec<Value> = serde_json::from_str(reply.payload()).unwrap();
        assert_eq!(entries, vec![serde_json::json!(1), serde_json::json!(OWNER)]);
    }
}

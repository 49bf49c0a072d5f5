// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod error;
pub mod frame;
pub mod storage;
pub mod table;
pub mod values;

/// Build an `Args` map, ex. `args! { "user_id" => "user", "epochs" => 5 }`
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut args = $crate::Args::new();
        $(
            args.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        args
    }};
}

use anyhow::Error;
use std::collections::HashMap;

pub use frame::Frame;
pub use storage::{FileStorage, MemoryStorage, ModelStorage};
pub use table::ToTable;
pub use values::{Type, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Options given to a handler, maps an option name to its value
pub type Args = HashMap<String, Value>;

/// A pluggable ML engine, trains on a `Frame` and predicts into a `Frame`.
/// Whatever a handler needs between both calls goes through its storage.
pub trait Handler {
    /// Name the engine is registered with
    fn name(&self) -> &'static str;

    /// Train a model for `target` on `df`
    fn create(&mut self, target: &str, df: &Frame, args: &Args) -> Result<()>;

    /// Predict with the stored model, `df` optionally restricts the input
    fn predict(&self, df: Option<&Frame>, args: &Args) -> Result<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_macro_converts_values() {
        let args = args! {
            "user_id" => "user",
            "epochs" => 5,
            "learning_rate" => 0.1,
        };

        assert_eq!(args.len(), 3);
        assert_eq!(args["user_id"], Value::String("user".into()));
        assert_eq!(args["epochs"], Value::Int64(5));
        assert_eq!(args["learning_rate"], Value::Double(0.1));
        assert!(args!().is_empty());
    }
}

mod choice;
mod class;
mod dialog;
mod param;
mod property;

pub use choice::*;
pub use class::*;
pub use dialog::*;
pub use param::*;
pub use property::*;

use crate::error::ErrorTree;

///
/// ValidateNode
///

pub trait ValidateNode {
    fn validate(&self) -> Result<(), ErrorTree> {
        Ok(())
    }

    /// Route segment this node's errors are filed under.
    fn route_key(&self) -> String;
}

//! Unity Graph Core
//!
//! Core data structures shared by the Unity serialized-asset graph engine:
//! decoded values, raw document records, the class-ID classifier and the
//! error type.

pub mod constants;
pub mod decoded_value;
pub mod error;
pub mod record;

// Re-export main types
pub use constants::{DEFAULT_RENDER_QUEUE, class_ids, class_name, class_names, classify};
pub use decoded_value::{DecodedValue, FileId, Reference};
pub use error::{Result, UnityGraphError};
pub use record::RawRecord;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        let record = RawRecord::new(class_ids::GAME_OBJECT, 123);
        assert_eq!(record.class_id, 1);
        assert_eq!(classify(record.class_id), "GameObject");
    }
}

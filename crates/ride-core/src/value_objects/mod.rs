//! Value objects - immutable types that represent domain concepts

mod invitation_code;
mod snowflake;

pub use invitation_code::{InvitationCode, CODE_ALPHABET, CODE_LENGTH};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
